//! Grammar AST → expression graph.

use pegtree_core::Tree;

use crate::expr::Expr;
use crate::grammar::{Grammar, Parser};
use crate::{Error, Result};

/// Rebuild a runnable parser from a grammar AST.
///
/// The start rule is the first rule defined. The tree is expected to be
/// metagrammar-shaped; anything else is a [`Error::MalformedTree`] fault.
pub fn reconstruct(tree: &Tree) -> Result<Parser> {
    if tree.name() != "Grammar" {
        return Err(malformed(format!(
            "expected a Grammar node, found `{}`",
            tree.name()
        )));
    }
    let rules = tree.values("rule");
    let mut grammar = Grammar::new();
    let mut start = None;
    for rule in rules {
        let name = text(child(rule, "name")?)?;
        let body = build(child(rule, "body")?)?;
        grammar.define(name, body);
        start.get_or_insert(name);
    }
    let Some(start) = start else {
        return Err(malformed("grammar defines no rules".into()));
    };
    Ok(grammar.into_parser(start))
}

fn malformed(detail: String) -> Error {
    Error::MalformedTree(detail)
}

fn child<'t>(node: &'t Tree, label: &str) -> Result<&'t Tree> {
    node.get(label).ok_or_else(|| {
        malformed(format!(
            "`{}` node is missing its `{label}` child",
            node.name()
        ))
    })
}

fn text(node: &Tree) -> Result<&str> {
    node.value()
        .ok_or_else(|| malformed(format!("`{}` node carries no text", node.name())))
}

fn build(node: &Tree) -> Result<Expr> {
    match node.name() {
        "Choice" => fold_right(node.values("alt"), Expr::or),
        "Sequence" => fold_right(node.values("item"), Expr::then),
        "Epsilon" => Ok(Expr::Epsilon),
        "Nothing" => Ok(Expr::Nothing),
        "Any" => Ok(Expr::Any),
        "And" => Ok(build(child(node, "expr")?)?.ahead()),
        "Not" => Ok(!build(child(node, "expr")?)?),
        "Optional" => Ok(build(child(node, "expr")?)?.opt()),
        "Repeat" => Ok(build(child(node, "expr")?)?.rep()),
        "Repeat1" => Ok(build(child(node, "expr")?)?.rep1()),
        "Ignore" => Ok(build(child(node, "expr")?)?.ign()),
        "Extend" => Ok(build(child(node, "expr")?)?.ext()),
        "Rextend" => Ok(build(child(node, "expr")?)?.rext()),
        "Append" => Ok(build(child(node, "expr")?)?.app(text(child(node, "name")?)?)),
        "Rappend" => Ok(build(child(node, "expr")?)?.rapp(text(child(node, "name")?)?)),
        "Identifier" => Ok(Expr::rule(text(node)?)),
        "Tag" => Ok(Expr::tag(text(node)?)),
        "Literal" => {
            let mut value = String::new();
            for c in node.values("char") {
                value.push(decode(c)?);
            }
            Ok(Expr::Literal(value))
        }
        "Class" => fold_right(node.values("item"), Expr::or),
        "Range" => Ok(Expr::CharRange(
            decode(child(node, "start")?)?,
            decode(child(node, "end")?)?,
        )),
        "Char" => Ok(Expr::Literal(decode(child(node, "char")?)?.to_string())),
        other => Err(malformed(format!("unexpected `{other}` node in a rule body"))),
    }
}

/// Fold `parts` into right-nested binary applications of `join`.
fn fold_right(parts: Vec<&Tree>, join: impl Fn(Expr, Expr) -> Expr) -> Result<Expr> {
    let mut parts = parts.into_iter().rev();
    let Some(last) = parts.next() else {
        return Err(malformed("choice or sequence node with no parts".into()));
    };
    let mut expr = build(last)?;
    for part in parts {
        expr = join(build(part)?, expr);
    }
    Ok(expr)
}

/// Decode one `escape`/`octal`/`char` term into the character it denotes.
pub(super) fn decode(node: &Tree) -> Result<char> {
    let value = text(node)?;
    match node.name() {
        "escape" => match value {
            "n" => Ok('\n'),
            "r" => Ok('\r'),
            "t" => Ok('\t'),
            "'" => Ok('\''),
            "\"" => Ok('"'),
            "[" => Ok('['),
            "]" => Ok(']'),
            "\\" => Ok('\\'),
            other => Err(malformed(format!("unknown escape `\\{other}`"))),
        },
        "octal" => {
            let code = u32::from_str_radix(value, 8)
                .map_err(|_| malformed(format!("bad octal escape `\\{value}`")))?;
            char::from_u32(code).ok_or_else(|| malformed(format!("bad octal escape `\\{value}`")))
        }
        "char" => value
            .chars()
            .next()
            .ok_or_else(|| malformed("empty char term".into())),
        other => Err(malformed(format!("unexpected `{other}` node in a character position"))),
    }
}
