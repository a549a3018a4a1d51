//! Detection and elimination of left recursion.

use std::collections::VecDeque;
use bit_set::BitSet;
use grammar::{
  Grammar, MalformedGrammar, MalformedKind, Map, NonterminalId, Production, Set, Symbol,
};
use itertools::Itertools;
use log::debug;
use crate::vanishing;

/// True if some non-terminal can derive a sequence beginning with itself.
///
/// A production can start with any of its symbols that follow a prefix of
/// nullable non-terminals, so `A -> B A` with a nullable `B` counts as well.
pub fn has_left_recursion(grammar: &Grammar) -> bool {
  let nullable = vanishing::nullable(grammar);
  let mut visiting = BitSet::new();
  let mut done = BitSet::new();

  grammar.nonterminals().any(|nt| {
    !done.contains(nt.index())
      && has_cycle(grammar, &nullable, nt, &mut visiting, &mut done)
  })
}

fn has_cycle(
  grammar: &Grammar,
  nullable: &BitSet,
  nt: NonterminalId,
  visiting: &mut BitSet,
  done: &mut BitSet,
) -> bool {
  visiting.insert(nt.index());

  for next in leading_nonterminals(grammar, nullable, nt) {
    if visiting.contains(next.index()) {
      return true;
    }

    if !done.contains(next.index())
      && has_cycle(grammar, nullable, next, visiting, done)
    {
      return true;
    }
  }

  visiting.remove(nt.index());
  done.insert(nt.index());
  false
}

/// Non-terminals a production of `nt` can begin with.
fn leading_nonterminals(
  grammar: &Grammar,
  nullable: &BitSet,
  nt: NonterminalId,
) -> Vec<NonterminalId> {
  let mut leading = vec![];

  if let Some(prods) = grammar.rules.get(&nt) {
    for prod in prods {
      for symbol in prod {
        match symbol {
          Symbol::Terminal(_) => break,
          Symbol::Nonterminal(next) => {
            leading.push(*next);
            if !nullable.contains(next.index()) {
              break;
            }
          }
        }
      }
    }
  }

  leading
}

/// Orders the non-terminals by their shortest distance from the start
/// symbol, ties broken by id. Non-terminals the start symbol cannot reach
/// come last.
pub fn order_by_distance(
  grammar: &Grammar,
) -> Result<Vec<NonterminalId>, MalformedGrammar> {
  if grammar.rules.is_empty() {
    return Err(MalformedGrammar::new(
      MalformedKind::NoNonterminals,
      "there are no non-terminals to order"));
  }

  let mut distance = Map::<NonterminalId, usize>::new();
  let mut queue = VecDeque::new();
  distance.insert(grammar.start, 0);
  queue.push_back(grammar.start);

  while let Some(nt) = queue.pop_front() {
    let next_distance = distance[&nt] + 1;
    let prods = match grammar.rules.get(&nt) {
      Some(prods) => prods,
      None => continue,
    };

    for next in prods.iter().flat_map(|prod| prod.iter().filter_map(Symbol::nonterminal)) {
      if !distance.contains_key(&next) {
        distance.insert(next, next_distance);
        queue.push_back(next);
      }
    }
  }

  Ok(grammar.nonterminals()
    .sorted_by_key(|nt| (distance.get(nt).copied().unwrap_or(usize::MAX), *nt))
    .collect())
}

/// Paull's algorithm.
///
/// Expects a grammar without empty productions and without cycles of unit
/// productions; run vanishing and chain elimination first.
pub fn remove_left_recursion(grammar: &Grammar) -> Result<Grammar, MalformedGrammar> {
  let order = order_by_distance(grammar)?;
  grammar.validate()?;

  let mut result = grammar.clone();

  for (i, &a_i) in order.iter().enumerate() {
    for &a_j in &order[..i] {
      substitute_leading(&mut result, a_i, a_j);
    }
    remove_direct(&mut result, a_i);
  }

  Ok(result)
}

/// Replaces each `a_i -> a_j γ` by `a_i -> δ γ` for every `a_j -> δ`.
fn substitute_leading(grammar: &mut Grammar, a_i: NonterminalId, a_j: NonterminalId) {
  let leading = Symbol::Nonterminal(a_j);
  let prods = &grammar.rules[&a_i];
  if !prods.iter().any(|prod| prod.first() == Some(&leading)) {
    return;
  }

  let expansions = &grammar.rules[&a_j];
  let mut substituted = Set::new();

  for prod in prods {
    match prod.split_first() {
      Some((first, rest)) if *first == leading => {
        for expansion in expansions {
          let mut new_prod = expansion.clone();
          new_prod.extend_from_slice(rest);
          substituted.insert(new_prod);
        }
      }
      _ => {
        substituted.insert(prod.clone());
      }
    }
  }

  grammar.rules.insert(a_i, substituted);
}

/// `A -> A α | β` becomes `A -> β | β A'`, `A' -> α | α A'`.
fn remove_direct(grammar: &mut Grammar, nt: NonterminalId) {
  let leading = Symbol::Nonterminal(nt);
  let (recursive, others): (Vec<Production>, Vec<Production>) = grammar.rules[&nt]
    .iter()
    .cloned()
    .partition(|prod| prod.first() == Some(&leading));

  if recursive.is_empty() {
    return;
  }

  // `A -> A` adds nothing to the language
  let alphas = recursive.into_iter()
    .filter(|prod| prod.len() > 1)
    .map(|prod| prod[1..].to_vec())
    .collect::<Vec<_>>();

  if alphas.is_empty() {
    grammar.rules.insert(nt, others.into_iter().collect());
    return;
  }

  let tail = grammar.fresh_nonterminal(nt);
  debug!("direct left recursion on <{}>: introduced <{}>",
    grammar.name(nt), grammar.name(tail));

  grammar.rules.insert(nt, with_tail(others, tail));
  grammar.rules.insert(tail, with_tail(alphas, tail));
}

/// `{ x }` becomes `{ x } ∪ { x tail }`, plain alternatives first.
fn with_tail(prods: Vec<Production>, tail: NonterminalId) -> Set<Production> {
  let mut result = prods.iter().cloned().collect::<Set<_>>();

  for mut prod in prods {
    prod.push(Symbol::Nonterminal(tail));
    result.insert(prod);
  }

  result
}
