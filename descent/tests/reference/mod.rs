use std::collections::{BTreeSet, HashSet};
use grammar::{Grammar, NonterminalId, Symbol};

/// Membership by span saturation: `(nt, i, j)` is recorded once `nt` is
/// known to derive `word[i..j]`. Works for any grammar, left-recursive or
/// not, and is only meant for short words.
pub fn derives(grammar: &Grammar, word: &str) -> bool {
  let word = word.chars().collect::<Vec<_>>();
  let mut spans = HashSet::<(NonterminalId, usize, usize)>::new();

  loop {
    let mut changed = false;

    for (nt, prod) in grammar.iter() {
      for i in 0..=word.len() {
        for j in ends(&spans, &word, prod, i) {
          if spans.insert((nt, i, j)) {
            changed = true;
          }
        }
      }
    }

    if !changed {
      break;
    }
  }

  spans.contains(&(grammar.start, 0, word.len()))
}

fn ends(
  spans: &HashSet<(NonterminalId, usize, usize)>,
  word: &[char],
  prod: &[Symbol],
  start: usize,
) -> BTreeSet<usize> {
  let mut positions = BTreeSet::new();
  positions.insert(start);

  for symbol in prod {
    positions = positions.iter()
      .flat_map(|&p| match symbol {
        Symbol::Terminal(c) => {
          if word.get(p) == Some(c) { vec![p + 1] } else { vec![] }
        }
        Symbol::Nonterminal(nt) => {
          (p..=word.len()).filter(|&q| spans.contains(&(*nt, p, q))).collect()
        }
      })
      .collect();
  }

  positions
}

/// Every word over `alphabet` of length at most `max_len`, shortest first.
pub fn words(alphabet: &BTreeSet<char>, max_len: usize) -> Vec<String> {
  let mut words = vec![String::new()];
  let mut frontier = vec![String::new()];

  for _ in 0..max_len {
    frontier = frontier.iter()
      .flat_map(|word| alphabet.iter().map(move |c| format!("{}{}", word, c)))
      .collect();
    words.extend(frontier.iter().cloned());
  }

  words
}
