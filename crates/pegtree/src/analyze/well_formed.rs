//! Nullability and well-formedness as boolean equation systems.
//!
//! One equation per rule and property, built over the grammar AST and fed
//! to [`solve`]. A rule is well-formed when it provably cannot recurse
//! without consuming input and never repeats a nullable body; anything the
//! fixpoint cannot prove is reported.

use pegtree_core::Tree;

use crate::{Error, Result};

use super::boolean::{Bool, FALSE, Prop, TRUE, Var, solve};
use super::refs::bad_references;

fn malformed(node: &Tree, place: &str) -> Error {
    Error::MalformedTree(format!("unexpected `{}` node {place}", node.name()))
}

fn expr<'t>(node: &'t Tree) -> Result<&'t Tree> {
    node.get("expr").ok_or_else(|| {
        Error::MalformedTree(format!("`{}` node is missing its `expr` child", node.name()))
    })
}

/// Can this expression match the empty string?
fn nullable(node: &Tree) -> Result<Bool> {
    Ok(match node.name() {
        "Choice" => Bool::Or(
            node.values("alt")
                .into_iter()
                .map(nullable)
                .collect::<Result<_>>()?,
        ),
        "Sequence" => Bool::And(
            node.values("item")
                .into_iter()
                .map(nullable)
                .collect::<Result<_>>()?,
        ),
        "Epsilon" | "Optional" | "Repeat" | "Tag" => TRUE,
        // The empty literal is the one terminal that matches nothing.
        "Literal" => Bool::Const(node.values("char").is_empty()),
        "Class" | "Nothing" | "Range" | "Char" | "Any" => FALSE,
        "Not" => Bool::not(nullable(expr(node)?)?),
        "And" | "Repeat1" | "Append" | "Rappend" | "Extend" | "Rextend" | "Ignore" => {
            nullable(expr(node)?)?
        }
        "Identifier" => {
            let name = node
                .value()
                .ok_or_else(|| Error::MalformedTree("`Identifier` node carries no text".into()))?;
            Bool::Var(Var::new(name, Prop::Nullable))
        }
        _ => return Err(malformed(node, "in a rule body")),
    })
}

/// Is this expression provably free of non-consuming recursion and
/// nullable repetition?
fn well_formed_expr(node: &Tree) -> Result<Bool> {
    Ok(match node.name() {
        "Choice" => Bool::And(
            node.values("alt")
                .into_iter()
                .map(well_formed_expr)
                .collect::<Result<_>>()?,
        ),
        "Sequence" => {
            // A later item is off the hook as soon as some earlier item
            // cannot match empty.
            let items = node.values("item");
            let mut terms = Vec::with_capacity(items.len());
            let mut prefix_nullable = Vec::new();
            for (index, item) in items.iter().copied().enumerate() {
                if index == 0 {
                    terms.push(well_formed_expr(item)?);
                } else {
                    prefix_nullable.push(nullable(items[index - 1])?);
                    terms.push(Bool::Or(vec![
                        Bool::not(Bool::And(prefix_nullable.clone())),
                        well_formed_expr(item)?,
                    ]));
                }
            }
            Bool::And(terms)
        }
        "Epsilon" | "Tag" | "Literal" | "Class" | "Nothing" | "Range" | "Char" | "Any" => TRUE,
        "Repeat" => Bool::And(vec![
            well_formed_expr(expr(node)?)?,
            Bool::not(nullable(expr(node)?)?),
        ]),
        "And" | "Not" | "Optional" | "Repeat1" | "Append" | "Rappend" | "Extend" | "Rextend"
        | "Ignore" => well_formed_expr(expr(node)?)?,
        "Identifier" => {
            let name = node
                .value()
                .ok_or_else(|| Error::MalformedTree("`Identifier` node carries no text".into()))?;
            Bool::Var(Var::new(name, Prop::WellFormed))
        }
        _ => return Err(malformed(node, "in a rule body")),
    })
}

/// Both equation systems for a grammar: every rule's nullability equation
/// followed by its well-formedness equation.
fn equations(grammar: &Tree) -> Result<Vec<(Var, Bool)>> {
    let mut out = Vec::new();
    for prop in [Prop::Nullable, Prop::WellFormed] {
        for rule in grammar.values("rule") {
            let name = rule
                .get("name")
                .and_then(Tree::value)
                .ok_or_else(|| Error::MalformedTree("`Rule` node is missing its name".into()))?;
            let body = rule
                .get("body")
                .ok_or_else(|| Error::MalformedTree("`Rule` node is missing its body".into()))?;
            let equation = match prop {
                Prop::Nullable => nullable(body)?,
                Prop::WellFormed => well_formed_expr(body)?,
            };
            out.push((Var::new(name, prop), equation));
        }
    }
    Ok(out)
}

/// Every rule not proven well-formed, in definition order.
pub fn well_formed(grammar: &Tree) -> Result<Vec<String>> {
    let verdicts = solve(equations(grammar)?)?;
    Ok(verdicts
        .into_iter()
        .filter(|(var, verdict)| var.prop == Prop::WellFormed && *verdict != Some(true))
        .map(|(var, _)| var.name)
        .collect())
}

/// Check a grammar AST for design errors.
///
/// Reports, in order and each as its own [`Error`] variant: rules defined
/// twice, rules referenced but never defined, and rules not proven
/// well-formed. Names are sorted in every report.
pub fn validate(grammar: &Tree) -> Result<()> {
    if grammar.name() != "Grammar" {
        return Err(Error::MalformedTree(format!(
            "expected a Grammar node, found `{}`",
            grammar.name()
        )));
    }
    let (mut redefined, mut undefined) = bad_references(grammar);
    if !redefined.is_empty() {
        redefined.sort();
        return Err(Error::Redefined(redefined));
    }
    if !undefined.is_empty() {
        undefined.sort();
        return Err(Error::Undefined(undefined));
    }
    let mut bad = well_formed(grammar)?;
    if !bad.is_empty() {
        bad.sort();
        return Err(Error::NotWellFormed(bad));
    }
    Ok(())
}
