//! The self-describing surface syntax.
//!
//! [`META_GRAMMAR`] is the surface syntax written in itself. A hand-wired
//! bootstrap graph parses it once into an AST, [`validate`] checks it, and
//! [`reconstruct`] turns the AST back into a runnable parser — the same
//! path every user grammar takes through [`parse_grammar`].

use std::sync::LazyLock;

use pegtree_core::Tree;

use crate::analyze::validate;
use crate::grammar::Parser;
use crate::{Error, Result};

mod bootstrap;
mod reconstruct;
mod render;

#[cfg(test)]
mod meta_tests;

pub use reconstruct::reconstruct;
pub use render::render_grammar;

/// The surface syntax, written in the surface syntax.
///
/// Ford-style PEG plus the tree-shaping operators: `:`/`<:` append a child
/// under a label, `>>`/`<<` splice content left-to-right/right-to-left,
/// `~` discards, `@Name` asserts a node tag.
pub const META_GRAMMAR: &str = r##"
# Ford-style PEG surface syntax, extended with tree-shaping operators.

# Hierarchical syntax
Grammar    <- @Grammar Spacing Definition:rule+ EndOfFile
Definition <- Identifier LEFTARROW @Rule<:name Expression:body

Expression <- Sequence (SLASH @Choice<:alt Sequence:alt (SLASH Sequence:alt)*)?
Sequence   <- Prefix (@Sequence<:item Prefix:item Prefix:item*)? / @Epsilon
Prefix     <- (AND @And / NOT @Not) Suffix:expr / Suffix
Suffix     <- AstOp (QUESTION @Optional /
                     STAR @Repeat /
                     PLUS @Repeat1)<:expr?
AstOp      <- Primary ((LAPPEND @Append /
                        RAPPEND @Rappend)<:expr TreeIdent:name /
                       (LEXTEND @Extend /
                        REXTEND @Rextend /
                        IGNORE @Ignore)<:expr)?
Primary    <- Identifier !LEFTARROW
            / OPEN Expression CLOSE
            / Literal / Class / Any
            / Tag

# Lexical syntax
Identifier  <- IdentStart IdentCont* @Identifier<< Spacing
TreeIdent   <- IdentStart IdentCont* @TreeIdent<< Spacing
Tag         <- "@"~ IdentStart IdentCont* @Tag<< Spacing
IdentStart  <- [a-zA-Z_]
IdentCont   <- IdentStart / [0-9]

Literal     <- [']~ @Literal (!['] Char:char)* [']~ Spacing
             / ["]~ @Literal (!["] Char:char)* ["]~ Spacing
Class       <- '['~ (!']' Range
                     (!']' @Class<:item Range:item (!']' Range:item)*)? /
                     @Nothing) ']'~ Spacing
Range       <- Char '-'~ @Range<:start Char:end / Char @Char<:char
Char        <- '\\'~ [nrt'"\[\]\\] @escape<<
             / '\\'~ [0-2][0-7][0-7] @octal<<
             / '\\'~ [0-7][0-7]? @octal<<
             / !'\\' . @char<<
Any         <- DOT @Any

LEFTARROW   <- '<-'~ Spacing
SLASH       <- '/'~ Spacing
AND         <- '&'~ Spacing
NOT         <- '!'~ Spacing
QUESTION    <- '?'~ Spacing
STAR        <- '*'~ Spacing
PLUS        <- '+'~ Spacing
OPEN        <- '('~ Spacing
CLOSE       <- ')'~ Spacing
DOT         <- '.'~ Spacing
LEXTEND     <- '>>'~ Spacing
REXTEND     <- '<<'~ Spacing
LAPPEND     <- ':'~ Spacing
RAPPEND     <- '<:'~ Spacing
IGNORE      <- '~'~ Spacing

Spacing     <- (Space / Comment)*
Comment     <- '#'~ (!EndOfLine .~)* EndOfLine
Space       <- ' '~ / '\t'~ / EndOfLine
EndOfLine   <- '\r\n'~ / '\n'~ / '\r'~
EndOfFile   <- !.
"##;

static META: LazyLock<Parser> = LazyLock::new(|| {
    let boot = bootstrap::bootstrap();
    let (tree, rest) = boot
        .parse(META_GRAMMAR)
        .expect("bootstrap graph and metagrammar text agree on shapes");
    let tree = tree.expect("bootstrap graph accepts the metagrammar text");
    assert!(
        rest.is_empty(),
        "bootstrap parse of the metagrammar stopped before {rest:?}"
    );
    validate(&tree).expect("the metagrammar validates");
    reconstruct(&tree).expect("the metagrammar AST reconstructs")
});

/// The parser for the surface syntax itself, built on first use.
pub fn metagrammar() -> &'static Parser {
    &META
}

/// Parse grammar text into its AST.
///
/// Fails with [`Error::Syntax`] unless the metagrammar consumes the whole
/// input. The tree is not yet validated.
pub fn parse_grammar_tree(source: &str) -> Result<Tree> {
    let (tree, rest) = metagrammar().parse(source)?;
    match tree {
        Some(tree) if rest.is_empty() => Ok(tree),
        _ => Err(Error::Syntax),
    }
}

/// Parse, validate, and reconstruct grammar text into a runnable parser for
/// its first rule.
pub fn parse_grammar(source: &str) -> Result<Parser> {
    let tree = parse_grammar_tree(source)?;
    validate(&tree)?;
    reconstruct(&tree)
}
