//! Grammar AST → surface-syntax text.
//!
//! The printer is precedence-aware: a child whose construct binds looser
//! than its context gets parenthesised, so the rendered text reparses into
//! a grammar with the same behaviour. Characters are re-escaped from their
//! decoded values; a literal `-` inside a class is emitted as an octal
//! escape so a reparse cannot mistake its neighbours for a range.

use std::fmt::Write;

use pegtree_core::Tree;

use crate::{Error, Result};

use super::reconstruct::decode;

/// Binding strength of surface constructs, loosest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Prec {
    Choice,
    Sequence,
    Prefix,
    Suffix,
    AstOp,
    Primary,
}

/// Render a grammar AST back to surface syntax, one rule per line.
pub fn render_grammar(tree: &Tree) -> Result<String> {
    if tree.name() != "Grammar" {
        return Err(Error::MalformedTree(format!(
            "expected a Grammar node, found `{}`",
            tree.name()
        )));
    }
    let mut out = String::new();
    for rule in tree.values("rule") {
        let name = rule
            .get("name")
            .and_then(Tree::value)
            .ok_or_else(|| Error::MalformedTree("`Rule` node is missing its name".into()))?;
        let body = rule
            .get("body")
            .ok_or_else(|| Error::MalformedTree("`Rule` node is missing its body".into()))?;
        let _ = writeln!(out, "{name} <- {}", render(body, Prec::Choice)?);
    }
    Ok(out)
}

fn render(node: &Tree, min: Prec) -> Result<String> {
    let (text, level) = match node.name() {
        "Choice" => {
            let alts = node
                .values("alt")
                .into_iter()
                .map(|alt| render(alt, Prec::Sequence))
                .collect::<Result<Vec<_>>>()?;
            (alts.join(" / "), Prec::Choice)
        }
        "Sequence" => {
            let items = node
                .values("item")
                .into_iter()
                .map(|item| render(item, Prec::Prefix))
                .collect::<Result<Vec<_>>>()?;
            (items.join(" "), Prec::Sequence)
        }
        // An empty alternative: renders as no text at all.
        "Epsilon" => (String::new(), Prec::Sequence),

        "And" => (format!("&{}", render(expr(node)?, Prec::Suffix)?), Prec::Prefix),
        "Not" => (format!("!{}", render(expr(node)?, Prec::Suffix)?), Prec::Prefix),

        "Optional" => (format!("{}?", render(expr(node)?, Prec::AstOp)?), Prec::Suffix),
        "Repeat" => (format!("{}*", render(expr(node)?, Prec::AstOp)?), Prec::Suffix),
        "Repeat1" => (format!("{}+", render(expr(node)?, Prec::AstOp)?), Prec::Suffix),

        "Append" => (
            format!("{}:{}", render(expr(node)?, Prec::Primary)?, label(node)?),
            Prec::AstOp,
        ),
        "Rappend" => (
            format!("{}<:{}", render(expr(node)?, Prec::Primary)?, label(node)?),
            Prec::AstOp,
        ),
        "Extend" => (format!("{}>>", render(expr(node)?, Prec::Primary)?), Prec::AstOp),
        "Rextend" => (format!("{}<<", render(expr(node)?, Prec::Primary)?), Prec::AstOp),
        "Ignore" => (format!("{}~", render(expr(node)?, Prec::Primary)?), Prec::AstOp),

        "Identifier" => (required_text(node)?.to_owned(), Prec::Primary),
        "Tag" => (format!("@{}", required_text(node)?), Prec::Primary),
        "Any" => (".".into(), Prec::Primary),
        "Nothing" => ("[]".into(), Prec::Primary),

        "Literal" => {
            let mut text = String::from("'");
            for c in node.values("char") {
                text.push_str(&escape_literal(decode(c)?));
            }
            text.push('\'');
            (text, Prec::Primary)
        }

        "Class" => {
            let mut text = String::from("[");
            for item in node.values("item") {
                text.push_str(&class_item(item)?);
            }
            text.push(']');
            (text, Prec::Primary)
        }
        // Single-item classes parse to a bare Range or Char node.
        "Range" | "Char" => (format!("[{}]", class_item(node)?), Prec::Primary),

        other => {
            return Err(Error::MalformedTree(format!(
                "unexpected `{other}` node in a rule body"
            )));
        }
    };
    if level < min {
        Ok(format!("({text})"))
    } else {
        Ok(text)
    }
}

fn expr<'t>(node: &'t Tree) -> Result<&'t Tree> {
    node.get("expr").ok_or_else(|| {
        Error::MalformedTree(format!("`{}` node is missing its `expr` child", node.name()))
    })
}

fn label(node: &Tree) -> Result<&str> {
    node.get("name").and_then(Tree::value).ok_or_else(|| {
        Error::MalformedTree(format!("`{}` node is missing its label", node.name()))
    })
}

fn required_text(node: &Tree) -> Result<&str> {
    node.value()
        .ok_or_else(|| Error::MalformedTree(format!("`{}` node carries no text", node.name())))
}

fn class_item(node: &Tree) -> Result<String> {
    match node.name() {
        "Range" => {
            let start = decode(node.get("start").ok_or_else(|| {
                Error::MalformedTree("`Range` node is missing its `start` child".into())
            })?)?;
            let end = decode(node.get("end").ok_or_else(|| {
                Error::MalformedTree("`Range` node is missing its `end` child".into())
            })?)?;
            Ok(format!("{}-{}", escape_class(start), escape_class(end)))
        }
        "Char" => {
            let c = decode(node.get("char").ok_or_else(|| {
                Error::MalformedTree("`Char` node is missing its `char` child".into())
            })?)?;
            Ok(escape_class(c))
        }
        other => Err(Error::MalformedTree(format!(
            "unexpected `{other}` node in a character class"
        ))),
    }
}

fn escape_literal(c: char) -> String {
    match c {
        '\\' => "\\\\".into(),
        '\'' => "\\'".into(),
        '\n' => "\\n".into(),
        '\r' => "\\r".into(),
        '\t' => "\\t".into(),
        other => other.to_string(),
    }
}

fn escape_class(c: char) -> String {
    match c {
        '\\' => "\\\\".into(),
        '[' => "\\[".into(),
        ']' => "\\]".into(),
        '\n' => "\\n".into(),
        '\r' => "\\r".into(),
        '\t' => "\\t".into(),
        '\'' => "\\'".into(),
        '"' => "\\\"".into(),
        // A raw `-` would read as a range separator.
        '-' => "\\055".into(),
        other => other.to_string(),
    }
}
