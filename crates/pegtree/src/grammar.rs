//! Named rule tables and the parser facade.

use indexmap::IndexMap;
use pegtree_core::{Fragment, Tree};

use crate::Result;
use crate::expr::Expr;

/// An insertion-ordered mapping from rule names to expression bodies.
///
/// Bodies reference each other through [`Expr::Rule`] names, resolved here
/// at match time; nothing is resolved at construction, so rules may be
/// defined in any order and recurse freely.
#[derive(Debug, Clone, Default)]
pub struct Grammar {
    rules: IndexMap<String, Expr>,
}

impl Grammar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define (or overwrite) a rule and return a reference to it.
    pub fn define(&mut self, name: impl Into<String>, body: Expr) -> Expr {
        let name = name.into();
        let reference = Expr::Rule(name.clone());
        self.rules.insert(name, body);
        reference
    }

    /// The body of a rule, if defined.
    pub fn get(&self, name: &str) -> Option<&Expr> {
        self.rules.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// Rules in definition order.
    pub fn rules(&self) -> impl Iterator<Item = (&str, &Expr)> {
        self.rules.iter().map(|(name, body)| (name.as_str(), body))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Package this grammar with a start rule.
    pub fn into_parser(self, start: impl Into<String>) -> Parser {
        Parser {
            grammar: self,
            start: start.into(),
        }
    }
}

/// A grammar bound to its start rule.
///
/// A `Parser` is read-only: independent callers may run
/// [`parse`](Self::parse) concurrently over independent inputs.
#[derive(Debug, Clone)]
pub struct Parser {
    grammar: Grammar,
    start: String,
}

impl Parser {
    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    /// Run the start rule against `input`.
    ///
    /// Success yields the finalized tree and the unconsumed suffix; failure
    /// yields `(None, input)`. Consuming the whole input is the grammar's
    /// business (idiomatically `… !.`). The `Err` side carries only
    /// category-3 faults, never parse failure.
    pub fn parse<'a>(&self, input: &'a str) -> Result<(Option<Tree>, &'a str)> {
        let start = Expr::Rule(self.start.clone());
        match start.apply(&self.grammar, input, &Fragment::Empty)? {
            Some((fragment, rest)) => Ok((Some(fragment.finalize()?), rest)),
            None => Ok((None, input)),
        }
    }
}
