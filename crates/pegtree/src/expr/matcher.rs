//! The match engine.
//!
//! One recursive function over `(expression, input, incoming fragment)`.
//! The fragment is borrowed: a failing arm simply never produces a new one,
//! which is exactly the "failure leaves cursor and fragment untouched"
//! contract.

use pegtree_core::Fragment;

use crate::grammar::Grammar;
use crate::{Error, Result};

use super::Expr;

/// A successful step: the new fragment and the unconsumed suffix.
pub(crate) type Step<'a> = Option<(Fragment, &'a str)>;

impl Expr {
    pub(crate) fn apply<'a>(
        &self,
        grammar: &Grammar,
        input: &'a str,
        frag: &Fragment,
    ) -> Result<Step<'a>> {
        match self {
            Expr::Epsilon => Ok(Some((frag.clone(), input))),
            Expr::Nothing => Ok(None),

            Expr::Any => match input.chars().next() {
                Some(c) => consume(frag, c, input),
                None => Ok(None),
            },

            Expr::Literal(lit) => match input.strip_prefix(lit.as_str()) {
                Some(rest) => {
                    let frag = frag.extend(&Fragment::String(lit.clone()))?;
                    Ok(Some((frag, rest)))
                }
                None => Ok(None),
            },

            Expr::CharRange(lo, hi) => match input.chars().next() {
                Some(c) if *lo <= c && c <= *hi => consume(frag, c, input),
                _ => Ok(None),
            },

            Expr::CharSet(chars) => match input.chars().next() {
                Some(c) if chars.contains(&c) => consume(frag, c, input),
                _ => Ok(None),
            },

            Expr::Tag(name) => Ok(Some((Fragment::Named(name.clone()), input))),

            Expr::Sequence(first, second) => {
                let Some((frag, rest)) = first.apply(grammar, input, frag)? else {
                    return Ok(None);
                };
                second.apply(grammar, rest, &frag)
            }

            Expr::Choice(first, second) => match first.apply(grammar, input, frag)? {
                Some(step) => Ok(Some(step)),
                None => second.apply(grammar, input, frag),
            },

            Expr::Repeat(inner) => {
                let mut frag = frag.clone();
                let mut rest = input;
                while let Some((next, tail)) = inner.apply(grammar, rest, &frag)? {
                    frag = next;
                    rest = tail;
                }
                Ok(Some((frag, rest)))
            }

            Expr::Repeat1(inner) => {
                let Some((mut frag, mut rest)) = inner.apply(grammar, input, frag)? else {
                    return Ok(None);
                };
                while let Some((next, tail)) = inner.apply(grammar, rest, &frag)? {
                    frag = next;
                    rest = tail;
                }
                Ok(Some((frag, rest)))
            }

            Expr::Optional(inner) => match inner.apply(grammar, input, frag)? {
                Some(step) => Ok(Some(step)),
                None => Ok(Some((frag.clone(), input))),
            },

            Expr::And(inner) => match inner.apply(grammar, input, &Fragment::Empty)? {
                Some(_) => Ok(Some((frag.clone(), input))),
                None => Ok(None),
            },

            Expr::Not(inner) => match inner.apply(grammar, input, &Fragment::Empty)? {
                Some(_) => Ok(None),
                None => Ok(Some((frag.clone(), input))),
            },

            Expr::Ignore(inner) => match inner.apply(grammar, input, &Fragment::Empty)? {
                Some((_, rest)) => Ok(Some((frag.clone(), rest))),
                None => Ok(None),
            },

            Expr::Extend(inner) => match inner.apply(grammar, input, &Fragment::Empty)? {
                Some((built, rest)) => Ok(Some((frag.extend(&built)?, rest))),
                None => Ok(None),
            },

            Expr::Rextend(inner) => match inner.apply(grammar, input, &Fragment::Empty)? {
                Some((built, rest)) => Ok(Some((built.rextend(frag)?, rest))),
                None => Ok(None),
            },

            Expr::Append(inner, label) => match inner.apply(grammar, input, &Fragment::Empty)? {
                Some((built, rest)) => Ok(Some((frag.append(label, &built)?, rest))),
                None => Ok(None),
            },

            Expr::Rappend(inner, label) => match inner.apply(grammar, input, &Fragment::Empty)? {
                Some((built, rest)) => Ok(Some((built.rappend(label, frag)?, rest))),
                None => Ok(None),
            },

            Expr::Rule(name) => match grammar.get(name) {
                Some(body) => body.apply(grammar, input, frag),
                None => Err(Error::UndefinedRule(name.clone())),
            },
        }
    }
}

/// Extend `frag` with one character and step past it.
fn consume<'a>(frag: &Fragment, c: char, input: &'a str) -> Result<Step<'a>> {
    let frag = frag.extend(&Fragment::String(c.to_string()))?;
    Ok(Some((frag, &input[c.len_utf8()..])))
}
