use std::fmt;
use crate::{
  Grammar, NonterminalId, NonterminalIdGen, Production, Symbol, Map, Set, BiMap,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarError {
  pub kind: GrammarErrorKind,
  pub message: String,
  /// 1-based, 0 when the error concerns the whole input.
  pub line: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrammarErrorKind {
  MissingDefinition,
  InvalidHead,
  EmptyName,
  UnclosedNonterminal,
  UnexpectedBracket,
  InvalidEscape,
  EmptyGrammar,
}

impl fmt::Display for GrammarError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.line == 0 {
      write!(f, "{}", self.message)
    } else {
      write!(f, "line {}: {}", self.line, self.message)
    }
  }
}

impl std::error::Error for GrammarError {}

fn error(
  kind: GrammarErrorKind,
  message: impl Into<String>,
  line: usize,
) -> GrammarError {
  GrammarError {
    kind,
    message: message.into(),
    line,
  }
}

enum Atom {
  Terminal(char),
  Nonterminal(String),
}

#[derive(Default)]
struct Loader {
  ids: NonterminalIdGen,
  names: BiMap<NonterminalId, String>,
  rules: Map<NonterminalId, Set<Production>>,
}

pub(crate) fn parse(input: &str) -> Result<Grammar, GrammarError> {
  let mut loader = Loader::default();

  for (i, line) in input.lines().enumerate() {
    if line.trim().is_empty() {
      continue;
    }
    loader.load_line(line, i + 1)?;
  }

  loader.finish()
}

impl Loader {
  fn intern(&mut self, name: String) -> NonterminalId {
    if let Some(&nt) = self.names.get_by_right(&name) {
      return nt;
    }

    let nt = self.ids.gen();
    self.names.insert(nt, name);
    self.rules.insert(nt, Set::new());
    nt
  }

  fn load_line(&mut self, line: &str, line_no: usize) -> Result<(), GrammarError> {
    let (head, body) = match line.find("::=") {
      Some(i) => (&line[..i], &line[i + 3..]),
      None => {
        return Err(error(GrammarErrorKind::MissingDefinition,
          "expected `::=` after the non-terminal", line_no));
      }
    };

    let head = head.trim();
    if head.len() < 2 || !head.starts_with('<') || !head.ends_with('>') {
      return Err(error(GrammarErrorKind::InvalidHead,
        format!("`{}` is not of the form <name>", head), line_no));
    }

    let name = &head[1..head.len() - 1];
    if name.is_empty() {
      return Err(error(GrammarErrorKind::EmptyName,
        "non-terminal name is empty", line_no));
    }
    if name.contains(|c: char| c == '<' || c == '>') {
      return Err(error(GrammarErrorKind::InvalidHead,
        format!("`{}` is not of the form <name>", head), line_no));
    }

    let nt = self.intern(name.to_owned());

    for alt in split_alternatives(body, line_no)? {
      let prod = alt.into_iter().map(|atom| match atom {
        Atom::Terminal(c) => Symbol::Terminal(c),
        Atom::Nonterminal(name) => Symbol::Nonterminal(self.intern(name)),
      }).collect::<Production>();

      self.rules[&nt].insert(prod);
    }

    Ok(())
  }

  fn finish(self) -> Result<Grammar, GrammarError> {
    let start = match self.rules.keys().next() {
      Some(&nt) => nt,
      None => {
        return Err(error(GrammarErrorKind::EmptyGrammar,
          "the grammar has no productions", 0));
      }
    };

    Ok(Grammar {
      start,
      rules: self.rules,
      names: self.names,
    })
  }
}

fn split_alternatives(
  body: &str,
  line_no: usize,
) -> Result<Vec<Vec<Atom>>, GrammarError> {
  let mut alts = vec![];
  let mut current = vec![];
  let mut chars = body.chars();

  while let Some(c) = chars.next() {
    match c {
      '|' => {
        alts.push(std::mem::take(&mut current));
      }
      '\\' => {
        match chars.next() {
          Some(c @ '<') | Some(c @ '>') | Some(c @ '|') | Some(c @ '\\') => {
            current.push(Atom::Terminal(c));
          }
          Some(c) => {
            return Err(error(GrammarErrorKind::InvalidEscape,
              format!("`\\{}` is not a valid escape", c), line_no));
          }
          None => {
            return Err(error(GrammarErrorKind::InvalidEscape,
              "dangling `\\` at the end of the line", line_no));
          }
        }
      }
      '<' => {
        let mut name = String::new();
        loop {
          match chars.next() {
            Some('>') => break,
            Some('<') => {
              return Err(error(GrammarErrorKind::UnexpectedBracket,
                "`<` inside a non-terminal name", line_no));
            }
            Some('\\') => {
              return Err(error(GrammarErrorKind::InvalidEscape,
                "escapes are not allowed inside a non-terminal name", line_no));
            }
            Some(c) => name.push(c),
            None => {
              return Err(error(GrammarErrorKind::UnclosedNonterminal,
                format!("unclosed non-terminal `<{}`", name), line_no));
            }
          }
        }

        if name.is_empty() {
          return Err(error(GrammarErrorKind::EmptyName,
            "non-terminal name is empty", line_no));
        }
        current.push(Atom::Nonterminal(name));
      }
      '>' => {
        return Err(error(GrammarErrorKind::UnexpectedBracket,
          "unmatched `>`", line_no));
      }
      c => {
        current.push(Atom::Terminal(c));
      }
    }
  }

  alts.push(current);
  Ok(alts)
}

#[cfg(test)]
mod tests {
  use super::*;
  use insta::assert_snapshot;
  use pretty_assertions::assert_eq;

  #[test]
  fn ids_follow_first_appearance() {
    let grammar = crate::build(r"
<S>::=<A>ab|<B><C>
<A>::=a|b
<C>::=c
    ").unwrap();

    let ids = ["S", "A", "B", "C"].iter()
      .map(|name| grammar.names.get_by_right(&name.to_string()).unwrap().id())
      .collect::<Vec<_>>();

    assert_eq!(ids, vec![0, 1, 2, 3]);
    assert_eq!(grammar.start, NonterminalId::new(0));
    assert!(grammar.productions(NonterminalId::new(2)).unwrap().is_empty());
    assert_eq!(grammar.validate(), Ok(()));
  }

  #[test]
  fn empty_alternatives_and_escapes() {
    let grammar = crate::build(r"
<list>::=|\<<item>\>|\\
<item>::=x\|y| z
    ").unwrap();

    let list = grammar.productions(grammar.start).unwrap();
    assert_eq!(list.len(), 3);
    assert!(list.contains(&Production::new()));

    assert_snapshot!(grammar.to_string(), @r###"
    <list>::=|\<<item>\>|\\
    <item>::=x\|y| z
    "###);
  }

  #[test]
  fn duplicate_alternatives_are_merged() {
    let grammar = crate::build("<S>::=a|b|a\n<S>::=b|c").unwrap();

    assert_snapshot!(grammar.to_string(), @"<S>::=a|b|c");
  }

  #[test]
  fn errors() {
    let cases = vec![
      ("<S> a", GrammarErrorKind::MissingDefinition),
      ("S::=a", GrammarErrorKind::InvalidHead),
      ("<>::=a", GrammarErrorKind::EmptyName),
      ("<S>::=a<B", GrammarErrorKind::UnclosedNonterminal),
      ("<S>::=a<<B>>", GrammarErrorKind::UnexpectedBracket),
      ("<S>::=a>", GrammarErrorKind::UnexpectedBracket),
      ("<S>::=\\n", GrammarErrorKind::InvalidEscape),
      ("<S>::=a\\", GrammarErrorKind::InvalidEscape),
      ("\n  \n", GrammarErrorKind::EmptyGrammar),
    ];

    for (input, kind) in cases {
      assert_eq!(crate::build(input).unwrap_err().kind, kind, "{:?}", input);
    }
  }

  #[test]
  fn error_carries_line_number() {
    let err = crate::build("<S>::=a\n\n<A>::=<\n").unwrap_err();

    assert_eq!(err.line, 3);
    assert_eq!(err.to_string(), "line 3: unclosed non-terminal `<`");
  }
}
