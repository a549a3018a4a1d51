//! Predictive recognizer with ordered backtracking.
//!
//! The derivation in progress is a stack of goals, the symbols still to be
//! matched. Goals live in an arena as a linked list so that every choice
//! point can keep the tail it started from; backtracking truncates the arena
//! back to where the choice point was taken. Nothing recurses natively, so
//! long inputs cannot overflow the call stack.

use std::fmt;
use grammar::{Grammar, NonterminalId, Symbol};
use log::trace;
use crate::first::{self, FirstMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepLimitExceeded {
  pub steps: usize,
}

impl fmt::Display for StepLimitExceeded {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "recognition gave up after {} steps", self.steps)
  }
}

impl std::error::Error for StepLimitExceeded {}

#[derive(Debug, Clone, Copy)]
struct Goal {
  symbol: Symbol,
  next: Option<usize>,
}

#[derive(Debug)]
struct Choice<'a> {
  nt: NonterminalId,
  pos: usize,
  /// goals after `nt`
  rest: Option<usize>,
  arena_len: usize,
  candidates: &'a [usize],
  next: usize,
}

#[derive(Debug)]
pub struct Recognizer<'g> {
  grammar: &'g Grammar,
  first: FirstMap,
  step_limit: Option<usize>,
}

impl<'g> Recognizer<'g> {
  /// `grammar` must be free of left recursion, otherwise recognition may
  /// not terminate without a step limit.
  pub fn new(grammar: &'g Grammar) -> Self {
    Recognizer {
      grammar,
      first: first::compute(grammar),
      step_limit: None,
    }
  }

  pub fn with_step_limit(mut self, steps: usize) -> Self {
    self.step_limit = Some(steps);
    self
  }

  pub fn first(&self) -> &FirstMap {
    &self.first
  }

  /// Membership test. Running out of steps counts as rejection.
  pub fn matches(&self, word: &str) -> bool {
    self.check(word).unwrap_or(false)
  }

  pub fn check(&self, word: &str) -> Result<bool, StepLimitExceeded> {
    let input = word.chars().collect::<Vec<_>>();
    let mut arena = vec![Goal {
      symbol: Symbol::Nonterminal(self.grammar.start),
      next: None,
    }];
    let mut choices = Vec::<Choice<'_>>::new();
    let mut goals = Some(0);
    let mut pos = 0;
    let mut steps = 0;

    let accepted = loop {
      steps += 1;
      if let Some(limit) = self.step_limit {
        if steps > limit {
          trace!("{:?}: step limit of {} reached", word, limit);
          return Err(StepLimitExceeded { steps: limit });
        }
      }

      let proceed = match goals {
        None if pos == input.len() => break true,
        None => false,
        Some(goal) => {
          let Goal { symbol, next } = arena[goal];
          match symbol {
            Symbol::Terminal(c) if input.get(pos) == Some(&c) => {
              pos += 1;
              goals = next;
              true
            }
            Symbol::Terminal(_) => false,
            Symbol::Nonterminal(nt) => {
              choices.push(Choice {
                nt,
                pos,
                rest: next,
                arena_len: arena.len(),
                candidates: self.first.candidates(nt, input.get(pos).copied()),
                next: 0,
              });
              false
            }
          }
        }
      };

      if !proceed && !self.resume(&mut choices, &mut arena, &mut goals, &mut pos) {
        break false;
      }
    };

    trace!("{:?}: {} after {} steps",
      word, if accepted { "accepted" } else { "rejected" }, steps);

    Ok(accepted)
  }

  /// Expands the next untried candidate of the innermost choice point that
  /// has one, discarding exhausted choice points. Returns `false` when the
  /// search space is exhausted.
  fn resume(
    &self,
    choices: &mut Vec<Choice<'_>>,
    arena: &mut Vec<Goal>,
    goals: &mut Option<usize>,
    pos: &mut usize,
  ) -> bool {
    while let Some(choice) = choices.last_mut() {
      let prod = choice.candidates.get(choice.next)
        .and_then(|&i| self.grammar.rules.get(&choice.nt)?.get_index(i));

      let prod = match prod {
        Some(prod) => prod,
        None => {
          choices.pop();
          continue;
        }
      };
      choice.next += 1;

      arena.truncate(choice.arena_len);
      *pos = choice.pos;

      let mut head = choice.rest;
      for &symbol in prod.iter().rev() {
        arena.push(Goal { symbol, next: head });
        head = Some(arena.len() - 1);
      }
      *goals = head;

      return true;
    }

    false
  }
}

/// Decides whether `grammar` derives `word`.
pub fn matches(grammar: &Grammar, word: &str) -> bool {
  Recognizer::new(grammar).matches(word)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn predictive_grammar() {
    let grammar = grammar::build(r"
<E>::=<T><E'>
<E'>::=+<T><E'>|
<T>::=<F><T'>
<T'>::=*<F><T'>|
<F>::=(<E>)|1
    ").unwrap();
    let recognizer = Recognizer::new(&grammar);

    for word in &["1", "1+1", "1*(1+1)", "((1))*1+1"] {
      assert!(recognizer.matches(word), "{}", word);
    }
    for word in &["", "+", "1+", "(1", "1)", "11"] {
      assert!(!recognizer.matches(word), "{}", word);
    }
  }

  #[test]
  fn backtracks_across_completed_nonterminals() {
    // `A -> a` succeeds first but leaves `b` unmatched
    let grammar = grammar::build(r"
<S>::=<A>b
<A>::=a|ab
    ").unwrap();

    assert!(matches(&grammar, "ab"));
    assert!(matches(&grammar, "abb"));
    assert!(!matches(&grammar, "a"));
  }

  #[test]
  fn backtracks_when_goals_run_out_early() {
    let grammar = grammar::build("<S>::=a|aa").unwrap();

    assert!(matches(&grammar, "aa"));
    assert!(!matches(&grammar, "aaa"));
  }

  #[test]
  fn empty_word() {
    let grammar = grammar::build(r"
<S>::=<A><A>
<A>::=a|
    ").unwrap();

    assert!(matches(&grammar, ""));
    assert!(matches(&grammar, "a"));
    assert!(matches(&grammar, "aa"));
    assert!(!matches(&grammar, "aaa"));
  }

  #[test]
  fn ambiguous_grammar() {
    let grammar = grammar::build("<S>::=a<S>a|a<S>b|c|").unwrap();

    assert!(matches(&grammar, "aacba"));
    assert!(matches(&grammar, "ab"));
    assert!(!matches(&grammar, "aacb"));
  }

  #[test]
  fn step_limit() {
    let grammar = grammar::build(r"
<S>::=<A><S>|<A>
<A>::=a|aa
    ").unwrap();
    let word = "a".repeat(20) + "b";

    let limited = Recognizer::new(&grammar).with_step_limit(100);
    assert_eq!(limited.check(&word), Err(StepLimitExceeded { steps: 100 }));
    assert!(!limited.matches(&word));

    let unlimited = Recognizer::new(&grammar).with_step_limit(usize::MAX);
    assert_eq!(unlimited.check("aaa"), Ok(true));
  }
}
