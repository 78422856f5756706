//! Compiling grammar ASTs into type operators.
//!
//! A [`TypeOp`] is the static twin of a parsing expression: where the
//! expression transforms fragments, its op transforms types. The registry
//! drives [`TypeOp`]s; this module only builds them.

use pegtree_core::Tree;

use crate::{Error, Result};

/// One step of the type transition a grammar position performs.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TypeOp {
    /// Pass the input type through (lookaheads, ignored content, epsilon).
    NoOp,
    /// Produce no type at all (`Nothing` never matches).
    Fail,
    /// Extend the input with untagged text (all terminals).
    Text,
    /// Replace the input with a bare tag.
    Tag(String),
    /// Append the inner result's cut under a label.
    Append(Box<TypeOp>, String),
    /// Append the *input's* cut under a label inside the inner result.
    Rappend(Box<TypeOp>, String),
    /// Splice the inner result after the input.
    Extend(Box<TypeOp>),
    /// Splice the input after the inner result.
    Rextend(Box<TypeOp>),
    /// Fold the input through each op; a failing op fails the whole.
    Sequence(Vec<TypeOp>),
    /// Union the surviving arms.
    Choice(Vec<TypeOp>),
    /// Accumulate applications until no new alternative appears.
    Repeat(Box<TypeOp>),
    /// A rule reference: a cut on empty input, a substitution otherwise.
    Lazy(String),
}

fn inner(node: &Tree) -> Result<TypeOp> {
    let expr = node.get("expr").ok_or_else(|| {
        Error::MalformedTree(format!("`{}` node is missing its `expr` child", node.name()))
    })?;
    compile(expr)
}

fn label(node: &Tree) -> Result<String> {
    node.get("name")
        .and_then(Tree::value)
        .map(str::to_owned)
        .ok_or_else(|| {
            Error::MalformedTree(format!("`{}` node is missing its label", node.name()))
        })
}

pub(crate) fn compile(node: &Tree) -> Result<TypeOp> {
    Ok(match node.name() {
        "Sequence" => TypeOp::Sequence(
            node.values("item")
                .into_iter()
                .map(compile)
                .collect::<Result<_>>()?,
        ),
        "Choice" => TypeOp::Choice(
            node.values("alt")
                .into_iter()
                .map(compile)
                .collect::<Result<_>>()?,
        ),
        "Identifier" => TypeOp::Lazy(
            node.value()
                .ok_or_else(|| Error::MalformedTree("`Identifier` node carries no text".into()))?
                .to_owned(),
        ),
        "Tag" => TypeOp::Tag(
            node.value()
                .ok_or_else(|| Error::MalformedTree("`Tag` node carries no text".into()))?
                .to_owned(),
        ),
        "Repeat" => TypeOp::Repeat(Box::new(inner(node)?)),
        "Repeat1" => {
            let op = inner(node)?;
            TypeOp::Sequence(vec![op.clone(), TypeOp::Repeat(Box::new(op))])
        }
        "Optional" => TypeOp::Choice(vec![inner(node)?, TypeOp::NoOp]),
        "Append" => TypeOp::Append(Box::new(inner(node)?), label(node)?),
        "Rappend" => TypeOp::Rappend(Box::new(inner(node)?), label(node)?),
        "Extend" => TypeOp::Extend(Box::new(inner(node)?)),
        "Rextend" => TypeOp::Rextend(Box::new(inner(node)?)),
        "Literal" | "Class" | "Range" | "Char" | "Any" => TypeOp::Text,
        // Lookaheads and ignored content leave no trace in the tree;
        // neither does an empty alternative.
        "Ignore" | "Not" | "And" | "Epsilon" => TypeOp::NoOp,
        "Nothing" => TypeOp::Fail,
        other => {
            return Err(Error::MalformedTree(format!(
                "unexpected `{other}` node in a rule body"
            )));
        }
    })
}
