use std::collections::BTreeSet;
use std::fmt;
use itertools::Itertools;
use crate::{Map, Set, BiMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NonterminalId(u32);

impl NonterminalId {
  pub fn new(id: u32) -> Self {
    NonterminalId(id)
  }

  pub fn id(&self) -> u32 {
    self.0
  }

  pub fn index(&self) -> usize {
    self.0 as usize
  }
}

#[derive(Debug, Default)]
pub struct NonterminalIdGen(u32);

impl NonterminalIdGen {
  /// Resumes allocation right after `max_id`.
  pub fn from(max_id: u32) -> Self {
    NonterminalIdGen(max_id + 1)
  }

  pub fn gen(&mut self) -> NonterminalId {
    let i = self.0;
    self.0 += 1;
    NonterminalId(i)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
  Nonterminal(NonterminalId),
  Terminal(char),
}

impl Symbol {
  pub fn nonterminal(&self) -> Option<NonterminalId> {
    match self {
      Symbol::Nonterminal(nt) => Some(*nt),
      Symbol::Terminal(_) => None,
    }
  }
}

/// An empty production is the empty derivation.
pub type Production = Vec<Symbol>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedGrammar {
  pub kind: MalformedKind,
  pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedKind {
  UndeclaredNonterminal,
  StartEliminated,
  NoNonterminals,
}

impl MalformedGrammar {
  pub fn new(kind: MalformedKind, message: impl Into<String>) -> Self {
    MalformedGrammar {
      kind,
      message: message.into(),
    }
  }
}

impl fmt::Display for MalformedGrammar {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let kind = match self.kind {
      MalformedKind::UndeclaredNonterminal => "undeclared non-terminal",
      MalformedKind::StartEliminated => "start symbol eliminated",
      MalformedKind::NoNonterminals => "no non-terminals",
    };
    write!(f, "malformed grammar ({}): {}", kind, self.message)
  }
}

impl std::error::Error for MalformedGrammar {}

/// A context-free grammar over single-character terminals.
///
/// Non-terminals are plain ids; a production refers to another non-terminal
/// by looking its id up in `rules`. A non-terminal that is declared but has
/// no productions is a key with an empty set.
#[derive(Debug, Clone)]
pub struct Grammar {
  pub start: NonterminalId,
  pub rules: Map<NonterminalId, Set<Production>>,
  /// Display names. Non-terminals without a name are shown by id.
  pub names: BiMap<NonterminalId, String>,
}

impl Grammar {
  pub fn new(start: NonterminalId) -> Self {
    let mut rules = Map::new();
    rules.insert(start, Set::new());
    Grammar {
      start,
      rules,
      names: BiMap::new(),
    }
  }

  /// Builds a grammar sharing the names of `self`.
  pub fn with_rules(
    &self,
    start: NonterminalId,
    rules: Map<NonterminalId, Set<Production>>,
  ) -> Grammar {
    Grammar {
      start,
      rules,
      names: self.names.clone(),
    }
  }

  pub fn declare(&mut self, nt: NonterminalId) -> &mut Set<Production> {
    self.rules.entry(nt).or_default()
  }

  /// Returns `false` if the production was already present.
  pub fn add_rule(&mut self, nt: NonterminalId, prod: Production) -> bool {
    self.declare(nt).insert(prod)
  }

  pub fn productions(&self, nt: NonterminalId) -> Option<&Set<Production>> {
    self.rules.get(&nt)
  }

  pub fn nonterminals(&self) -> impl Iterator<Item = NonterminalId> + '_ {
    self.rules.keys().copied()
  }

  pub fn iter(&self) -> impl Iterator<Item = (NonterminalId, &Production)> + '_ {
    self.rules.iter()
      .flat_map(|(&nt, prods)| prods.iter().map(move |prod| (nt, prod)))
  }

  pub fn production_count(&self) -> usize {
    self.rules.values().map(|prods| prods.len()).sum()
  }

  pub fn terminals(&self) -> BTreeSet<char> {
    self.iter()
      .flat_map(|(_, prod)| prod.iter())
      .filter_map(|symbol| match symbol {
        Symbol::Terminal(c) => Some(*c),
        Symbol::Nonterminal(_) => None,
      })
      .collect()
  }

  /// Checks the closure invariant: the start symbol and every non-terminal
  /// referenced by a production must be declared.
  pub fn validate(&self) -> Result<(), MalformedGrammar> {
    if self.rules.is_empty() {
      return Err(MalformedGrammar::new(
        MalformedKind::NoNonterminals,
        "the grammar declares no non-terminals"));
    }

    if !self.rules.contains_key(&self.start) {
      return Err(MalformedGrammar::new(
        MalformedKind::UndeclaredNonterminal,
        format!("start symbol <{}> is not declared", self.name(self.start))));
    }

    for (nt, prod) in self.iter() {
      for referenced in prod.iter().filter_map(Symbol::nonterminal) {
        if !self.rules.contains_key(&referenced) {
          return Err(MalformedGrammar::new(
            MalformedKind::UndeclaredNonterminal,
            format!("<{}> is referenced by <{}> but never declared",
              self.name(referenced), self.name(nt))));
        }
      }
    }

    Ok(())
  }

  /// The largest id in use, counting references and names of non-terminals
  /// that have since been removed.
  pub fn max_nonterminal(&self) -> NonterminalId {
    let referenced = self.iter()
      .flat_map(|(_, prod)| prod.iter().filter_map(Symbol::nonterminal));

    std::iter::once(self.start)
      .chain(self.rules.keys().copied())
      .chain(self.names.left_values().copied())
      .chain(referenced)
      .max()
      .unwrap_or(self.start)
  }

  /// Declares a new non-terminal named after `origin`, e.g. `S'` for `S`.
  pub fn fresh_nonterminal(&mut self, origin: NonterminalId) -> NonterminalId {
    let nt = NonterminalIdGen::from(self.max_nonterminal().id()).gen();

    let mut name = format!("{}'", self.name(origin));
    while self.names.contains_right(&name) {
      name.push('\'');
    }

    self.names.insert(nt, name);
    self.rules.insert(nt, Set::new());
    nt
  }

  pub fn name(&self, nt: NonterminalId) -> String {
    match self.names.get_by_left(&nt) {
      Some(name) => name.clone(),
      None => nt.id().to_string(),
    }
  }

  /// Renders a production in the loader's syntax.
  pub fn production_to_string(&self, prod: &[Symbol]) -> String {
    let mut buf = String::new();

    for symbol in prod {
      match symbol {
        Symbol::Nonterminal(nt) => {
          buf.push('<');
          buf.push_str(&self.name(*nt));
          buf.push('>');
        }
        Symbol::Terminal(c) => {
          if let '<' | '>' | '|' | '\\' = *c {
            buf.push('\\');
          }
          buf.push(*c);
        }
      }
    }

    buf
  }
}

/// Equality ignores names and ordering.
impl PartialEq for Grammar {
  fn eq(&self, other: &Grammar) -> bool {
    self.start == other.start && self.rules == other.rules
  }
}

impl Eq for Grammar {}

/// Renders the grammar in the loader's syntax, start symbol first.
/// Non-terminals without productions have no line.
impl fmt::Display for Grammar {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let others = self.rules.keys().copied().filter(|&nt| nt != self.start);

    for nt in std::iter::once(self.start).chain(others) {
      let prods = match self.rules.get(&nt) {
        Some(prods) if !prods.is_empty() => prods,
        _ => continue,
      };

      writeln!(f, "<{}>::={}",
        self.name(nt),
        prods.iter().map(|prod| self.production_to_string(prod)).join("|"))?;
    }

    Ok(())
  }
}
