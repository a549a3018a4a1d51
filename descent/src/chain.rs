//! Elimination of chain (unit) productions `A -> B`.

use bit_set::BitSet;
use grammar::{Grammar, Map, NonterminalId, Set, Symbol};
use log::debug;

/// Replaces unit productions by the non-unit productions of every
/// non-terminal reachable through chains of them.
///
/// The closure is computed by reachability, so cycles such as `A -> B`,
/// `B -> A` need no special handling. Non-terminals that were only reached
/// through chains may become unreachable.
pub fn remove_chains(grammar: &Grammar) -> Grammar {
  let mut rules = Map::new();

  for &nt in grammar.rules.keys() {
    let mut prods = Set::new();

    for target in chain_closure(grammar, nt) {
      if let Some(target_prods) = grammar.rules.get(&target) {
        let non_unit = target_prods.iter()
          .filter(|prod| unit_target(prod).is_none())
          .cloned();
        prods.extend(non_unit);
      }
    }

    rules.insert(nt, prods);
  }

  debug!("chain productions: {} -> {} productions",
    grammar.production_count(),
    rules.values().map(|prods| prods.len()).sum::<usize>());

  grammar.with_rules(grammar.start, rules)
}

pub(crate) fn unit_target(prod: &[Symbol]) -> Option<NonterminalId> {
  match prod {
    [Symbol::Nonterminal(nt)] => Some(*nt),
    _ => None,
  }
}

/// `nt` followed by every non-terminal it reaches through unit productions,
/// nearest first.
fn chain_closure(grammar: &Grammar, nt: NonterminalId) -> Vec<NonterminalId> {
  let mut seen = BitSet::new();
  let mut closure = vec![nt];
  seen.insert(nt.index());

  let mut i = 0;
  while i < closure.len() {
    let current = closure[i];
    i += 1;

    let prods = match grammar.rules.get(&current) {
      Some(prods) => prods,
      None => continue,
    };

    for target in prods.iter().filter_map(|prod| unit_target(prod)) {
      if seen.insert(target.index()) {
        closure.push(target);
      }
    }
  }

  closure
}

#[cfg(test)]
mod tests {
  use super::*;
  use insta::assert_snapshot;

  #[test]
  fn direct_chain() {
    let grammar = grammar::build(r"
<S>::=<A>|a<B>
<A>::=a|b
<B>::=e|
    ").unwrap();

    let reduced = remove_chains(&grammar);

    assert_snapshot!(reduced.to_string(), @r###"
    <S>::=a<B>|a|b
    <A>::=a|b
    <B>::=e|
    "###);
  }

  #[test]
  fn cyclic_chains() {
    let grammar = grammar::build(r"
<S>::=<A>|s
<A>::=<B>|a
<B>::=<A>|<S>|b
    ").unwrap();

    let reduced = remove_chains(&grammar);

    assert_snapshot!(reduced.to_string(), @r###"
    <S>::=s|a|b
    <A>::=a|b|s
    <B>::=b|a|s
    "###);
  }

  #[test]
  fn self_loop_is_dropped() {
    let grammar = grammar::build("<S>::=<S>|a|b").unwrap();

    let reduced = remove_chains(&grammar);

    assert_snapshot!(reduced.to_string(), @"<S>::=a|b");
  }
}
