//! Normalization of context-free grammars for recursive-descent recognition,
//! and the recognizer itself.
//!
//! [`normalize`] runs one of two pipelines depending on whether the grammar
//! is left-recursive. Only the factorized branch removes common prefixes;
//! the recognizer backtracks over whatever ambiguity is left.

use std::fmt;
use grammar::{Grammar, MalformedGrammar, MalformedKind, Map, Symbol};
use log::{debug, info};

pub mod useless;
pub mod vanishing;
pub mod chain;
pub mod left_rec;
pub mod factor;
pub mod first;
pub mod recognize;

pub use recognize::{matches, Recognizer, StepLimitExceeded};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
  /// vanishing, chain and useless symbols removed, then left recursion
  LeftRecursive,
  /// left factorization only
  Factorized,
}

impl fmt::Display for Branch {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Branch::LeftRecursive => write!(f, "left recursion removal"),
      Branch::Factorized => write!(f, "left factorization"),
    }
  }
}

#[derive(Debug, Clone)]
pub struct Normalized {
  pub grammar: Grammar,
  pub branch: Branch,
}

/// Produces an equivalent grammar free of left recursion and useless
/// symbols, ready for [`Recognizer`].
pub fn normalize(grammar: &Grammar) -> Result<Normalized, MalformedGrammar> {
  grammar.validate()?;

  let (rewritten, branch) = if left_rec::has_left_recursion(grammar) {
    (normalize_left_recursive(grammar)?, Branch::LeftRecursive)
  } else {
    (factor::factorize(grammar), Branch::Factorized)
  };

  let normalized = useless::remove_useless(&rewritten)?;

  info!("normalized by {}: {} non-terminals, {} productions -> {} non-terminals, {} productions",
    branch,
    grammar.rules.len(),
    grammar.production_count(),
    normalized.rules.len(),
    normalized.production_count());

  Ok(Normalized {
    grammar: normalized,
    branch,
  })
}

fn normalize_left_recursive(grammar: &Grammar) -> Result<Grammar, MalformedGrammar> {
  let start = grammar.start;
  let start_nullable = vanishing::nullable(grammar).contains(start.index());
  if start_nullable {
    debug!("start symbol <{}> is nullable", grammar.name(start));
  }

  let reduced = chain::remove_chains(&vanishing::remove_vanishing(grammar));

  let cleaned = match useless::remove_useless(&reduced) {
    Ok(cleaned) => cleaned,
    // the empty string is all the grammar generates
    Err(err) if err.kind == MalformedKind::StartEliminated && start_nullable => {
      let mut empty = reduced.with_rules(start, Map::new());
      empty.add_rule(start, vec![]);
      return Ok(empty);
    }
    Err(err) => return Err(err),
  };

  let mut result = left_rec::remove_left_recursion(&cleaned)?;

  if start_nullable {
    let new_start = result.fresh_nonterminal(start);
    result.add_rule(new_start, vec![Symbol::Nonterminal(start)]);
    result.add_rule(new_start, vec![]);
    result.start = new_start;
    debug!("empty string reinstated through <{}>", result.name(new_start));
  }

  Ok(result)
}
