//! Word lists: the strings to check and whether each one should be accepted.
//!
//! ```text
//! [true]
//! ab
//!
//! [false]
//! ba
//! ```
//!
//! Every line after a header is one word, so the empty line above is the
//! empty word, expected to be accepted.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Case {
  pub word: String,
  pub expected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WordsError {
  /// a word appears before any `[true]` or `[false]` header
  MissingHeader { line: usize },
}

impl fmt::Display for WordsError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      WordsError::MissingHeader { line } => {
        write!(f, "line {}: expected `[true]` or `[false]` before the first word", line)
      }
    }
  }
}

impl std::error::Error for WordsError {}

pub fn parse(input: &str) -> Result<Vec<Case>, WordsError> {
  let mut cases = vec![];
  let mut expected = None;

  for (i, line) in input.lines().enumerate() {
    match line.trim() {
      "[true]" => expected = Some(true),
      "[false]" => expected = Some(false),
      _ => match expected {
        Some(expected) => cases.push(Case {
          word: line.to_owned(),
          expected,
        }),
        None => return Err(WordsError::MissingHeader { line: i + 1 }),
      },
    }
  }

  Ok(cases)
}
