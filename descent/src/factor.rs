//! Left factorization.

use std::collections::VecDeque;
use grammar::{Grammar, Map, Production, Set, Symbol};
use log::debug;

/// Rewrites the grammar so that no two alternatives of a non-terminal begin
/// with the same symbol.
///
/// Alternatives sharing a first symbol are replaced by their longest common
/// prefix followed by a new non-terminal deriving the remainders. The new
/// non-terminal is factored in turn. This is a prefix tree rebuilt into
/// productions, with chains of single children collapsed into one prefix.
pub fn factorize(grammar: &Grammar) -> Grammar {
  let mut result = grammar.clone();
  let mut pending = grammar.nonterminals().collect::<VecDeque<_>>();
  let mut introduced = 0;

  while let Some(nt) = pending.pop_front() {
    let prods = result.rules[&nt].clone();
    let groups = group_by_first(&prods);

    if groups.values().all(|group| group.len() == 1) {
      continue;
    }

    let mut factored = Set::new();

    for prod in &prods {
      let group = match prod.first() {
        Some(first) => &groups[first],
        None => {
          factored.insert(prod.clone());
          continue;
        }
      };

      if group.len() == 1 {
        factored.insert(prod.clone());
        continue;
      }

      // the whole group is rewritten where its first member stood
      if group[0] != prod {
        continue;
      }

      let prefix_len = common_prefix_len(group);
      let continuation = result.fresh_nonterminal(nt);
      introduced += 1;

      let remainders = group.iter()
        .map(|member| member[prefix_len..].to_vec())
        .collect::<Set<_>>();
      result.rules.insert(continuation, remainders);
      pending.push_back(continuation);

      let mut head = prod[..prefix_len].to_vec();
      head.push(Symbol::Nonterminal(continuation));
      factored.insert(head);
    }

    result.rules.insert(nt, factored);
  }

  debug!("left factorization: {} non-terminals introduced", introduced);

  result
}

/// Non-empty productions grouped by their first symbol, in order of first
/// appearance.
fn group_by_first(prods: &Set<Production>) -> Map<Symbol, Vec<&Production>> {
  let mut groups = Map::<Symbol, Vec<&Production>>::new();

  for prod in prods {
    if let Some(&first) = prod.first() {
      groups.entry(first).or_default().push(prod);
    }
  }

  groups
}

/// Length of the longest prefix shared by every member. Members are
/// distinct and share at least their first symbol.
fn common_prefix_len(group: &[&Production]) -> usize {
  let reference = group[0];
  let mut len = 1;

  while group.iter().all(|member| member.len() > len && member[len] == reference[len]) {
    len += 1;
  }

  len
}

/// True if no non-terminal has two alternatives with the same first symbol.
pub fn is_factored(grammar: &Grammar) -> bool {
  grammar.rules.values()
    .all(|prods| group_by_first(prods).values().all(|group| group.len() == 1))
}
