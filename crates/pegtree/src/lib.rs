#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! pegtree: a PEG toolkit whose grammars shape the trees they parse.
//!
//! Grammar syntax carries per-position tree annotations (`@Tag`, `:label`,
//! `<:label`, `>>`, `<<`, `~`), so a successful parse yields a finalized
//! AST of the shape the grammar dictates — no separate tree-building pass.
//! The pipeline:
//! - `expr` - parsing expressions and the match engine
//! - `grammar` - named rule tables with lazy recursive references
//! - `meta` - the self-describing surface syntax (bootstrap, reconstruction,
//!   rendering)
//! - `analyze` - reference checks and the nullability/well-formedness solver
//! - `typing` - per-tag AST shape inference
//!
//! # Example
//!
//! ```
//! use pegtree::parse_grammar;
//!
//! let parser = parse_grammar(r#"
//!     Start <- @Num [0-9]+ @Num<< !.
//! "#).expect("valid grammar");
//!
//! let (tree, rest) = parser.parse("42").expect("no shape faults");
//! assert_eq!(tree.unwrap().to_string(), r#"Num("42")"#);
//! assert_eq!(rest, "");
//! ```

pub mod analyze;
pub mod expr;
pub mod grammar;
pub mod meta;
pub mod typing;

pub use pegtree_core::{Fragment, ShapeError, Tree, Visitor, walk};

pub use analyze::{bad_references, tag_names, validate};
pub use expr::Expr;
pub use grammar::{Grammar, Parser};
pub use meta::{META_GRAMMAR, metagrammar, parse_grammar, parse_grammar_tree, render_grammar};
pub use typing::{Ty, infer_types};

/// Errors raised by grammar validation, reconstruction, and the engine.
///
/// Parse *failure* is not an error — it is the `(None, input)` half of a
/// parse result. Everything here is either a grammar design error
/// (`Redefined`/`Undefined`/`NotWellFormed`/`Syntax`) or a category of bug:
/// inconsistent tree annotations (`Shape`), a rule name that resolves to
/// nothing at match time (`UndefinedRule`), a non-grammar tree fed to a
/// grammar consumer (`MalformedTree`), or a runaway fixpoint
/// (`FuelExhausted`).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Rule names defined more than once.
    #[error("rules {} redefined", .0.join(", "))]
    Redefined(Vec<String>),

    /// Rule names referenced but never defined.
    #[error("rules {} undefined", .0.join(", "))]
    Undefined(Vec<String>),

    /// Rules that may recurse without consuming input or repeat a nullable
    /// body.
    #[error("rules {} not well-formed", .0.join(", "))]
    NotWellFormed(Vec<String>),

    /// The metagrammar could not consume the grammar text.
    #[error("grammar text does not match the PEG surface syntax")]
    Syntax,

    /// A tree-shaping operation hit a fragment variant it has no meaning on.
    #[error(transparent)]
    Shape(#[from] ShapeError),

    /// A rule reference missed the grammar's rule table at match time.
    #[error("rule `{0}` is not defined")]
    UndefinedRule(String),

    /// A tree that is not a metagrammar-shaped grammar AST was handed to
    /// reconstruction, analysis, or inference.
    #[error("malformed grammar tree: {0}")]
    MalformedTree(String),

    /// A fixpoint failed to converge within its pass cap.
    #[error("{0} did not converge within its iteration cap")]
    FuelExhausted(&'static str),
}

/// Result type for toolkit operations.
pub type Result<T> = std::result::Result<T, Error>;
