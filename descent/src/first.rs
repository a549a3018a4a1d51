//! FIRST sets and the prediction table used by the recognizer.

use std::collections::BTreeSet;
use bit_set::BitSet;
use bitvec::prelude::*;
use fnv::FnvHashMap;
use grammar::{Grammar, Map, NonterminalId, Set, Symbol};
use crate::vanishing;

#[derive(Debug, Clone)]
pub struct FirstMap {
  /// every terminal of the grammar; FIRST sets hold indices into it
  terminals: Set<char>,
  first: Map<NonterminalId, BitSet>,
  nullable: BitSet,
  /// per non-terminal, one bit per production: can it derive ε
  nullable_prods: Map<NonterminalId, BitVec>,
  /// production indices worth trying for `(nt, next char)`, in declaration order
  predict: FnvHashMap<(NonterminalId, char), Vec<usize>>,
  /// production indices worth trying at the end of the input
  vanishing: Map<NonterminalId, Vec<usize>>,
}

pub fn compute(grammar: &Grammar) -> FirstMap {
  let terminals = grammar.terminals().into_iter().collect::<Set<_>>();
  let nullable = vanishing::nullable(grammar);
  let first = compute_first(grammar, &terminals, &nullable);

  let mut nullable_prods = Map::new();
  let mut predict = FnvHashMap::<_, Vec<usize>>::default();
  let mut vanishing = Map::new();

  for (&nt, prods) in &grammar.rules {
    let mut bits = bitvec![0; prods.len()];
    for (i, prod) in prods.iter().enumerate() {
      bits.set(i, sequence_nullable(&nullable, prod));
    }

    // an ε-deriving production can be followed by anything
    let empty = bits.iter_ones().collect::<Vec<_>>();

    let mut nt_predict = Map::<char, Vec<usize>>::new();
    for (i, prod) in prods.iter().enumerate() {
      for t in &sequence_first(&first, &terminals, &nullable, prod) {
        nt_predict.entry(terminals[t]).or_default().push(i);
      }
    }

    for (c, mut candidates) in nt_predict {
      candidates.extend(&empty);
      candidates.sort_unstable();
      candidates.dedup();
      predict.insert((nt, c), candidates);
    }

    vanishing.insert(nt, empty);
    nullable_prods.insert(nt, bits);
  }

  FirstMap {
    terminals,
    first,
    nullable,
    nullable_prods,
    predict,
    vanishing,
  }
}

fn compute_first(
  grammar: &Grammar,
  terminals: &Set<char>,
  nullable: &BitSet,
) -> Map<NonterminalId, BitSet> {
  let mut first = grammar.nonterminals()
    .map(|nt| (nt, BitSet::new()))
    .collect::<Map<_, _>>();

  loop {
    let mut changed = false;

    for (nt, prod) in grammar.iter() {
      let prod_first = sequence_first(&first, terminals, nullable, prod);
      let nt_first = first.entry(nt).or_default();
      let before = nt_first.len();
      nt_first.union_with(&prod_first);
      if nt_first.len() != before {
        changed = true;
      }
    }

    if !changed {
      break;
    }
  }

  first
}

/// Terminals that can begin a derivation of `symbols`, given the FIRST sets
/// known so far.
fn sequence_first(
  first: &Map<NonterminalId, BitSet>,
  terminals: &Set<char>,
  nullable: &BitSet,
  symbols: &[Symbol],
) -> BitSet {
  let mut result = BitSet::new();

  for symbol in symbols {
    match symbol {
      Symbol::Terminal(c) => {
        if let Some(t) = terminals.get_index_of(c) {
          result.insert(t);
        }
        break;
      }
      Symbol::Nonterminal(nt) => {
        if let Some(nt_first) = first.get(nt) {
          result.union_with(nt_first);
        }
        if !nullable.contains(nt.index()) {
          break;
        }
      }
    }
  }

  result
}

fn sequence_nullable(nullable: &BitSet, symbols: &[Symbol]) -> bool {
  symbols.iter().all(|symbol| match symbol {
    Symbol::Terminal(_) => false,
    Symbol::Nonterminal(nt) => nullable.contains(nt.index()),
  })
}

impl FirstMap {
  /// Indices into the production set of `nt` that can succeed when the
  /// remaining input starts with `next`, or is exhausted when `next` is
  /// `None`.
  pub fn candidates(&self, nt: NonterminalId, next: Option<char>) -> &[usize] {
    let vanishing = self.vanishing.get(&nt).map_or(&[][..], Vec::as_slice);

    match next {
      Some(c) => self.predict.get(&(nt, c)).map_or(vanishing, Vec::as_slice),
      None => vanishing,
    }
  }

  pub fn first_of(&self, nt: NonterminalId) -> BTreeSet<char> {
    self.first.get(&nt)
      .into_iter()
      .flat_map(|set| set.iter())
      .filter_map(|t| self.terminals.get_index(t).copied())
      .collect()
  }

  pub fn is_nullable(&self, nt: NonterminalId) -> bool {
    self.nullable.contains(nt.index())
  }

  /// True if the production at `index` in the set of `nt` can derive ε.
  pub fn production_nullable(&self, nt: NonterminalId, index: usize) -> bool {
    self.nullable_prods.get(&nt)
      .and_then(|bits| bits.get(index).map(|bit| *bit))
      .unwrap_or(false)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  fn chars(s: &str) -> BTreeSet<char> {
    s.chars().collect()
  }

  fn nt(grammar: &Grammar, name: &str) -> NonterminalId {
    *grammar.names.get_by_right(&name.to_string()).unwrap()
  }

  #[test]
  fn ll_expr() {
    let grammar = grammar::build(r"
<E>::=<T><E'>
<E'>::=+<T><E'>|
<T>::=<F><T'>
<T'>::=*<F><T'>|
<F>::=(<E>)|1
    ").unwrap();

    let first = compute(&grammar);

    assert_eq!(first.first_of(nt(&grammar, "E")), chars("(1"));
    assert_eq!(first.first_of(nt(&grammar, "E'")), chars("+"));
    assert_eq!(first.first_of(nt(&grammar, "T'")), chars("*"));
    assert!(first.is_nullable(nt(&grammar, "T'")));
    assert!(!first.is_nullable(nt(&grammar, "F")));

    let f = nt(&grammar, "F");
    assert_eq!(first.candidates(f, Some('(')), &[0]);
    assert_eq!(first.candidates(f, Some('1')), &[1]);
    assert_eq!(first.candidates(f, Some('+')), &[] as &[usize]);
    assert_eq!(first.candidates(f, None), &[] as &[usize]);
  }

  #[test]
  fn nullable_leading_symbol() {
    let grammar = grammar::build(r"
<S>::=<A>b|c
<A>::=|a
    ").unwrap();

    let first = compute(&grammar);
    let s = nt(&grammar, "S");
    let a = nt(&grammar, "A");

    assert_eq!(first.first_of(s), chars("abc"));
    assert_eq!(first.candidates(s, Some('a')), &[0]);
    assert_eq!(first.candidates(s, Some('b')), &[0]);
    assert_eq!(first.candidates(s, Some('c')), &[1]);
    assert!(first.production_nullable(a, 0));
    assert!(!first.production_nullable(a, 1));
  }

  #[test]
  fn vanishing_productions_are_always_candidates() {
    let grammar = grammar::build(r"
<S>::=<A>b
<A>::=a<A>|<B>|
<B>::=c|
    ").unwrap();

    let first = compute(&grammar);
    let a = nt(&grammar, "A");

    assert_eq!(first.candidates(a, Some('a')), &[0, 1, 2]);
    assert_eq!(first.candidates(a, Some('c')), &[1, 2]);
    assert_eq!(first.candidates(a, Some('b')), &[1, 2]);
    assert_eq!(first.candidates(a, None), &[1, 2]);
  }

  #[test]
  fn mutual_dependencies() {
    let grammar = grammar::build(r"
<S>::=<A>x
<A>::=<B>|a
<B>::=<A>y|b
    ").unwrap();

    let first = compute(&grammar);

    assert_eq!(first.first_of(nt(&grammar, "S")), chars("ab"));
    assert_eq!(first.first_of(nt(&grammar, "B")), chars("ab"));
  }
}
