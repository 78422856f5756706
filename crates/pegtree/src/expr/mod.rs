//! Parsing expressions.
//!
//! An [`Expr`] is a pure value; graphs are built with the constructors and
//! postfix builders below, or with the `*` (sequence), `|` (ordered choice)
//! and `!` (not-predicate) operators. Rule references are names resolved
//! through a [`Grammar`](crate::grammar::Grammar) at match time, so forward,
//! self- and mutual references need no construction-order care.

use std::collections::BTreeSet;

use pegtree_core::{Fragment, Tree};

use crate::Result;
use crate::grammar::Grammar;

mod analysis;
mod matcher;

#[cfg(test)]
mod expr_tests;

/// A parsing expression.
///
/// Matching an expression consumes input and transforms the incoming tree
/// fragment; on failure both appear untouched to the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Match nothing, always succeed.
    Epsilon,
    /// Always fail.
    Nothing,
    /// Any single character.
    Any,
    /// An exact string.
    Literal(String),
    /// One character in an inclusive range.
    CharRange(char, char),
    /// One character out of a set.
    CharSet(BTreeSet<char>),
    /// Assert the tag of the node being built; consumes nothing and
    /// replaces the incoming fragment.
    Tag(String),

    /// `a` then `b`.
    Sequence(Box<Expr>, Box<Expr>),
    /// `a`, or `b` only if `a` fails. Never reconsiders `a`.
    Choice(Box<Expr>, Box<Expr>),
    /// Greedy zero-or-more.
    Repeat(Box<Expr>),
    /// Greedy one-or-more.
    Repeat1(Box<Expr>),
    /// Match if possible, succeed regardless.
    Optional(Box<Expr>),
    /// Positive lookahead: match without consuming.
    And(Box<Expr>),
    /// Negative lookahead.
    Not(Box<Expr>),

    /// Match the inner expression but discard what it built.
    Ignore(Box<Expr>),
    /// Splice the inner result after the outer fragment's content.
    Extend(Box<Expr>),
    /// Splice the outer fragment's content after the inner result.
    Rextend(Box<Expr>),
    /// Finalize the inner result and append it under a label.
    Append(Box<Expr>, String),
    /// Finalize the *outer* fragment under a label inside the inner result;
    /// the inner result becomes the new outer. This is what folds
    /// `X (op X)*` into left-associated operator nodes.
    Rappend(Box<Expr>, String),

    /// A lazy reference into the grammar's rule table.
    Rule(String),
}

impl Expr {
    /// An exact-string expression.
    pub fn lit(text: impl Into<String>) -> Expr {
        Expr::Literal(text.into())
    }

    /// One character in `lo..=hi`.
    pub fn range(lo: char, hi: char) -> Expr {
        Expr::CharRange(lo, hi)
    }

    /// One character out of `chars`.
    pub fn one_of(chars: &str) -> Expr {
        Expr::CharSet(chars.chars().collect())
    }

    /// The tag assertion `@name`.
    pub fn tag(name: impl Into<String>) -> Expr {
        Expr::Tag(name.into())
    }

    /// A lazy reference to a named rule.
    pub fn rule(name: impl Into<String>) -> Expr {
        Expr::Rule(name.into())
    }

    /// Sequence: `self` then `other`.
    pub fn then(self, other: Expr) -> Expr {
        Expr::Sequence(Box::new(self), Box::new(other))
    }

    /// Ordered choice: `self`, or `other` only if `self` fails.
    pub fn or(self, other: Expr) -> Expr {
        Expr::Choice(Box::new(self), Box::new(other))
    }

    /// Zero-or-more.
    pub fn rep(self) -> Expr {
        Expr::Repeat(Box::new(self))
    }

    /// One-or-more.
    pub fn rep1(self) -> Expr {
        Expr::Repeat1(Box::new(self))
    }

    /// Optional.
    pub fn opt(self) -> Expr {
        Expr::Optional(Box::new(self))
    }

    /// Positive lookahead.
    pub fn ahead(self) -> Expr {
        Expr::And(Box::new(self))
    }

    /// Discard whatever this expression builds.
    pub fn ign(self) -> Expr {
        Expr::Ignore(Box::new(self))
    }

    /// Left-to-right splice (`>>`).
    pub fn ext(self) -> Expr {
        Expr::Extend(Box::new(self))
    }

    /// Right-to-left splice (`<<`).
    pub fn rext(self) -> Expr {
        Expr::Rextend(Box::new(self))
    }

    /// Append under `label` (`:label`).
    pub fn app(self, label: impl Into<String>) -> Expr {
        Expr::Append(Box::new(self), label.into())
    }

    /// Reverse append under `label` (`<:label`).
    pub fn rapp(self, label: impl Into<String>) -> Expr {
        Expr::Rappend(Box::new(self), label.into())
    }

    /// Match this expression on its own, against an empty fragment.
    ///
    /// Returns the finalized tree and the unconsumed input suffix, or
    /// `(None, input)` on failure. Rule references fail as
    /// [`UndefinedRule`](crate::Error::UndefinedRule) — use a
    /// [`Parser`](crate::grammar::Parser) for grammars.
    pub fn parse<'a>(&self, input: &'a str) -> Result<(Option<Tree>, &'a str)> {
        let grammar = Grammar::new();
        match self.apply(&grammar, input, &Fragment::Empty)? {
            Some((fragment, rest)) => Ok((Some(fragment.finalize()?), rest)),
            None => Ok((None, input)),
        }
    }
}

impl std::ops::Mul for Expr {
    type Output = Expr;

    fn mul(self, rhs: Expr) -> Expr {
        self.then(rhs)
    }
}

impl std::ops::BitOr for Expr {
    type Output = Expr;

    fn bitor(self, rhs: Expr) -> Expr {
        self.or(rhs)
    }
}

impl std::ops::Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        Expr::Not(Box::new(self))
    }
}
