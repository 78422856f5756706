//! Engine-local nullability and well-formedness.
//!
//! A three-valued fixpoint straight over [`Expr`] bodies, for standalone
//! engine use when no grammar AST is around to feed the boolean solver in
//! [`analyze`](crate::analyze). The solver stays authoritative; the two
//! must (and are tested to) agree on every grammar's verdicts.

use indexmap::IndexMap;

use super::Expr;
use crate::grammar::Grammar;

/// Pass cap for the local fixpoint. Each pass pins at least one rule or
/// stalls, so realistic grammars finish in a handful of passes.
const MAX_PASSES: usize = 100;

type Env = IndexMap<String, Option<bool>>;

fn and3(a: Option<bool>, b: Option<bool>) -> Option<bool> {
    match (a, b) {
        (Some(false), _) | (_, Some(false)) => Some(false),
        (Some(true), Some(true)) => Some(true),
        _ => None,
    }
}

fn or3(a: Option<bool>, b: Option<bool>) -> Option<bool> {
    match (a, b) {
        (Some(true), _) | (_, Some(true)) => Some(true),
        (Some(false), Some(false)) => Some(false),
        _ => None,
    }
}

fn not3(a: Option<bool>) -> Option<bool> {
    a.map(|v| !v)
}

/// Can `expr` match the empty string? `None` while rule references are
/// still unresolved.
fn nullable_of(expr: &Expr, env: &Env) -> Option<bool> {
    match expr {
        Expr::Epsilon | Expr::Optional(_) | Expr::Repeat(_) | Expr::Tag(_) => Some(true),
        Expr::Nothing | Expr::Any | Expr::CharRange(..) | Expr::CharSet(_) => Some(false),
        Expr::Literal(text) => Some(text.is_empty()),
        Expr::Sequence(a, b) => and3(nullable_of(a, env), nullable_of(b, env)),
        Expr::Choice(a, b) => or3(nullable_of(a, env), nullable_of(b, env)),
        Expr::Not(inner) => not3(nullable_of(inner, env)),
        Expr::Repeat1(inner)
        | Expr::And(inner)
        | Expr::Ignore(inner)
        | Expr::Extend(inner)
        | Expr::Rextend(inner)
        | Expr::Append(inner, _)
        | Expr::Rappend(inner, _) => nullable_of(inner, env),
        Expr::Rule(name) => env.get(name).copied().flatten(),
    }
}

/// Is `expr` free of unguarded recursion and nullable repetition?
fn well_formed_of(expr: &Expr, nulls: &Env, env: &Env) -> Option<bool> {
    match expr {
        Expr::Epsilon
        | Expr::Nothing
        | Expr::Any
        | Expr::Literal(_)
        | Expr::CharRange(..)
        | Expr::CharSet(_)
        | Expr::Tag(_) => Some(true),
        // The second item is off the hook when the first cannot be empty.
        Expr::Sequence(a, b) => and3(
            well_formed_of(a, nulls, env),
            or3(well_formed_of(b, nulls, env), not3(nullable_of(a, nulls))),
        ),
        Expr::Choice(a, b) => and3(
            well_formed_of(a, nulls, env),
            well_formed_of(b, nulls, env),
        ),
        Expr::Repeat(inner) => and3(
            well_formed_of(inner, nulls, env),
            not3(nullable_of(inner, nulls)),
        ),
        Expr::Repeat1(inner)
        | Expr::Optional(inner)
        | Expr::And(inner)
        | Expr::Not(inner)
        | Expr::Ignore(inner)
        | Expr::Extend(inner)
        | Expr::Rextend(inner)
        | Expr::Append(inner, _)
        | Expr::Rappend(inner, _) => well_formed_of(inner, nulls, env),
        Expr::Rule(name) => env.get(name).copied().flatten(),
    }
}

/// Iterate `step` over every rule until nothing new is pinned.
fn saturate(grammar: &Grammar, mut env: Env, step: impl Fn(&Expr, &Env) -> Option<bool>) -> Env {
    for _ in 0..MAX_PASSES {
        let mut updates = Vec::new();
        for (name, body) in grammar.rules() {
            if env[name].is_none()
                && let Some(value) = step(body, &env)
            {
                updates.push((name.to_owned(), value));
            }
        }
        if updates.is_empty() {
            break;
        }
        for (name, value) in updates {
            env.insert(name, Some(value));
        }
    }
    env
}

fn blank_env(grammar: &Grammar) -> Env {
    grammar.rules().map(|(name, _)| (name.to_owned(), None)).collect()
}

impl Grammar {
    fn nullable_env(&self) -> Env {
        saturate(self, blank_env(self), nullable_of)
    }

    fn well_formed_env(&self) -> Env {
        let nulls = self.nullable_env();
        saturate(self, blank_env(self), move |body, env| {
            well_formed_of(body, &nulls, env)
        })
    }

    /// Whether `rule` can match the empty string; `None` when the fixpoint
    /// cannot pin it (a recursion cycle).
    pub fn is_nullable(&self, rule: &str) -> Option<bool> {
        self.nullable_env().get(rule).copied().flatten()
    }

    /// Whether `rule` is provably well-formed; `None` when unproven, which
    /// callers should treat as a verdict of ill-formed.
    pub fn is_well_formed(&self, rule: &str) -> Option<bool> {
        self.well_formed_env().get(rule).copied().flatten()
    }

    /// Every rule not proven well-formed, in definition order.
    pub fn ill_formed_rules(&self) -> Vec<String> {
        self.well_formed_env()
            .into_iter()
            .filter(|(_, verdict)| *verdict != Some(true))
            .map(|(name, _)| name)
            .collect()
    }
}
