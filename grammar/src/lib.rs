mod grammar_parser;

pub mod grammar;

pub use self::grammar::*;
pub use grammar_parser::{GrammarError, GrammarErrorKind};

/// Insertion order of productions decides the order in which a recognizer
/// tries them, so the ordered maps are used in every build.
pub type Map<K, V> = indexmap::IndexMap<K, V>;

pub type Set<K> = indexmap::IndexSet<K>;

pub type BiMap<L, R> = bimap::BiHashMap<L, R>;

/// Loads a grammar from its textual form.
///
/// Every line has the form `<name>::=alt|alt|...`. Non-terminals get their
/// ids in order of first appearance, and the head of the first line is the
/// start symbol.
pub fn build(input: &str) -> Result<Grammar, GrammarError> {
  grammar_parser::parse(input)
}
