//! Nullable non-terminals and elimination of empty productions.

use bit_set::BitSet;
use grammar::{Grammar, Map, Production, Set, Symbol};
use log::debug;

/// Non-terminals that can derive the empty string.
pub fn nullable(grammar: &Grammar) -> BitSet {
  let mut nullable = BitSet::new();

  loop {
    let mut changed = false;

    for (nt, prod) in grammar.iter() {
      if nullable.contains(nt.index()) {
        continue;
      }

      let vanishes = prod.iter().all(|symbol| match symbol {
        Symbol::Terminal(_) => false,
        Symbol::Nonterminal(sym_nt) => nullable.contains(sym_nt.index()),
      });

      if vanishes {
        nullable.insert(nt.index());
        changed = true;
      }
    }

    if !changed {
      break;
    }
  }

  nullable
}

/// Expands every nullable occurrence out of the productions, then deletes
/// the empty productions.
///
/// The resulting grammar generates the same language minus the empty string;
/// whether the start symbol was nullable has to be tracked by the caller.
pub fn remove_vanishing(grammar: &Grammar) -> Grammar {
  let nullable = nullable(grammar);
  let mut rules = Map::new();

  for (&nt, prods) in &grammar.rules {
    let mut expanded = Set::new();

    for prod in prods {
      for variant in expand_occurrences(prod, &nullable) {
        if !variant.is_empty() {
          expanded.insert(variant);
        }
      }
    }

    rules.insert(nt, expanded);
  }

  debug!("vanishing symbols: {} nullable, {} -> {} productions",
    nullable.len(),
    grammar.production_count(),
    rules.values().map(|prods| prods.len()).sum::<usize>());

  grammar.with_rules(grammar.start, rules)
}

/// Every way of keeping or omitting each nullable occurrence in `prod`. The
/// production itself comes first and the all-omitted variant last.
fn expand_occurrences(prod: &[Symbol], nullable: &BitSet) -> Vec<Production> {
  let mut variants = vec![Production::new()];

  for symbol in prod {
    let omittable = match symbol {
      Symbol::Nonterminal(nt) => nullable.contains(nt.index()),
      Symbol::Terminal(_) => false,
    };

    let omitted = if omittable {
      variants.clone()
    } else {
      vec![]
    };

    for variant in &mut variants {
      variant.push(*symbol);
    }
    variants.extend(omitted);
  }

  variants
}
