//! Checks word lists against a context-free grammar: the grammar is
//! normalized for recursive descent, then every word is recognized and
//! compared with its expectation.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use descent::{Normalized, Recognizer, StepLimitExceeded};
use grammar::{Grammar, GrammarError, MalformedGrammar};
use log::debug;
use words::{Case, WordsError};

pub mod words;
pub mod report;

#[derive(Debug, Clone, Default)]
pub struct Options {
  /// recognizer steps allowed per word
  pub step_limit: Option<usize>,
  /// leave the grammars out of the report
  pub quiet: bool,
}

#[derive(Debug)]
pub enum Error {
  Io(io::Error),
  Grammar(GrammarError),
  Words(WordsError),
  Malformed(MalformedGrammar),
}

impl fmt::Display for Error {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Error::Io(err) => write!(f, "{}", err),
      Error::Grammar(err) => write!(f, "invalid grammar: {}", err),
      Error::Words(err) => write!(f, "invalid word list: {}", err),
      Error::Malformed(err) => write!(f, "{}", err),
    }
  }
}

impl std::error::Error for Error {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      Error::Io(err) => Some(err),
      Error::Grammar(err) => Some(err),
      Error::Words(err) => Some(err),
      Error::Malformed(err) => Some(err),
    }
  }
}

impl From<io::Error> for Error {
  fn from(err: io::Error) -> Self {
    Error::Io(err)
  }
}

impl From<GrammarError> for Error {
  fn from(err: GrammarError) -> Self {
    Error::Grammar(err)
  }
}

impl From<WordsError> for Error {
  fn from(err: WordsError) -> Self {
    Error::Words(err)
  }
}

impl From<MalformedGrammar> for Error {
  fn from(err: MalformedGrammar) -> Self {
    Error::Malformed(err)
  }
}

#[derive(Debug, Clone)]
pub struct Outcome {
  pub case: Case,
  pub result: Result<bool, StepLimitExceeded>,
}

impl Outcome {
  /// A word that ran out of steps counts as rejected.
  pub fn accepted(&self) -> bool {
    self.result.unwrap_or(false)
  }

  pub fn passed(&self) -> bool {
    self.accepted() == self.case.expected
  }
}

#[derive(Debug, Clone)]
pub struct Run {
  pub initial: Grammar,
  pub normalized: Normalized,
  pub outcomes: Vec<Outcome>,
}

impl Run {
  pub fn failures(&self) -> usize {
    self.outcomes.iter().filter(|outcome| !outcome.passed()).count()
  }

  pub fn passed(&self) -> bool {
    self.failures() == 0
  }
}

/// Checks the word list at `words_path` against the grammar at
/// `grammar_path`.
pub fn run(
  grammar_path: impl AsRef<Path>,
  words_path: impl AsRef<Path>,
  options: &Options,
) -> Result<Run, Error> {
  let grammar = fs::read_to_string(grammar_path)?;
  let words = fs::read_to_string(words_path)?;
  check(&grammar, &words, options)
}

pub fn check(grammar: &str, words: &str, options: &Options) -> Result<Run, Error> {
  let initial = grammar::build(grammar)?;
  let cases = words::parse(words)?;
  debug!("{} cases loaded", cases.len());

  let normalized = descent::normalize(&initial)?;

  let outcomes = {
    let mut recognizer = Recognizer::new(&normalized.grammar);
    if let Some(steps) = options.step_limit {
      recognizer = recognizer.with_step_limit(steps);
    }

    cases.into_iter()
      .map(|case| {
        let result = recognizer.check(&case.word);
        Outcome { case, result }
      })
      .collect()
  };

  Ok(Run {
    initial,
    normalized,
    outcomes,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  #[test]
  fn outcomes_follow_word_order() {
    let run = check("<S>::=a<S>b|", "[true]\n\nab\n[false]\nba\naab\n", &Options::default())
      .unwrap();

    let results = run.outcomes.iter()
      .map(|outcome| (outcome.case.word.as_str(), outcome.result))
      .collect::<Vec<_>>();

    assert_eq!(results, vec![
      ("", Ok(true)),
      ("ab", Ok(true)),
      ("ba", Ok(false)),
      ("aab", Ok(false)),
    ]);
    assert!(run.passed());
  }

  #[test]
  fn step_limit_counts_as_rejection() {
    let options = Options {
      step_limit: Some(3),
      quiet: false,
    };
    let run = check("<S>::=a<S>|b", "[true]\naaab\n[false]\naaaa\n", &options).unwrap();

    assert!(run.outcomes.iter().all(|outcome| outcome.result.is_err()));
    assert_eq!(run.failures(), 1);
  }

  #[test]
  fn errors_are_wrapped() {
    let options = Options::default();

    assert!(matches!(check("<S>", "", &options), Err(Error::Grammar(_))));
    assert!(matches!(check("<S>::=a", "a", &options), Err(Error::Words(_))));
    assert!(matches!(check("<S>::=a<S>", "", &options), Err(Error::Malformed(_))));
  }
}
