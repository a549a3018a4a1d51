//! Removal of dead and unreachable non-terminals.

use std::collections::VecDeque;
use bit_set::BitSet;
use grammar::{
  Grammar, MalformedGrammar, MalformedKind, Map, NonterminalId, Production, Set, Symbol,
};
use log::debug;

/// Keeps only the non-terminals that are both productive and reachable from
/// the start symbol.
///
/// Dead non-terminals are dropped first, together with every production that
/// mentions one; reachability is then computed once on what is left.
pub fn remove_useless(grammar: &Grammar) -> Result<Grammar, MalformedGrammar> {
  grammar.validate()?;

  let productive = compute_productive(grammar);
  if !productive.contains(grammar.start.index()) {
    return Err(MalformedGrammar::new(
      MalformedKind::StartEliminated,
      format!("start symbol <{}> derives no string of terminals",
        grammar.name(grammar.start))));
  }

  let mut rules = Map::new();
  for (&nt, prods) in &grammar.rules {
    if !productive.contains(nt.index()) {
      continue;
    }

    let kept = prods.iter()
      .filter(|prod| derives_within(&productive, prod))
      .cloned()
      .collect::<Set<_>>();
    rules.insert(nt, kept);
  }

  let reachable = compute_reachable(grammar.start, &rules);
  rules.retain(|nt, _| reachable.contains(nt.index()));

  debug!("useless symbols: {} -> {} non-terminals",
    grammar.rules.len(), rules.len());

  Ok(grammar.with_rules(grammar.start, rules))
}

/// Non-terminals that derive at least one string of terminals.
pub fn compute_productive(grammar: &Grammar) -> BitSet {
  let mut productive = BitSet::new();

  loop {
    let mut changed = false;

    for (nt, prod) in grammar.iter() {
      if productive.contains(nt.index()) {
        continue;
      }

      if derives_within(&productive, prod) {
        productive.insert(nt.index());
        changed = true;
      }
    }

    if !changed {
      break;
    }
  }

  productive
}

pub fn compute_reachable(
  start: NonterminalId,
  rules: &Map<NonterminalId, Set<Production>>,
) -> BitSet {
  let mut reachable = BitSet::new();
  let mut queue = VecDeque::new();

  reachable.insert(start.index());
  queue.push_back(start);

  while let Some(nt) = queue.pop_front() {
    let prods = match rules.get(&nt) {
      Some(prods) => prods,
      None => continue,
    };

    let referenced = prods.iter()
      .flat_map(|prod| prod.iter().filter_map(Symbol::nonterminal));
    for next in referenced {
      if reachable.insert(next.index()) {
        queue.push_back(next);
      }
    }
  }

  reachable
}

/// True if every non-terminal of `prod` is in `set`.
fn derives_within(set: &BitSet, prod: &[Symbol]) -> bool {
  prod.iter().all(|symbol| match symbol {
    Symbol::Terminal(_) => true,
    Symbol::Nonterminal(nt) => set.contains(nt.index()),
  })
}
