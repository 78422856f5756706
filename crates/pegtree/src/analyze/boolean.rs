//! Boolean equation systems over rule properties.
//!
//! Equations mention free variables (`rule × property`); [`solve`] pins them
//! by iterated substitution: every pass re-evaluates each unresolved
//! equation against the environment, and a pass that pins nothing ends the
//! fixpoint. Variables still free at that point stay unresolved — callers
//! treat them as not proven.

use std::collections::VecDeque;

use indexmap::IndexMap;

use crate::{Error, Result};

/// Pass cap for [`solve`]. Each productive pass pins at least one variable,
/// so this is far above anything a realistic grammar needs.
const MAX_PASSES: usize = 500;

/// The property a variable ranges over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Prop {
    Nullable,
    WellFormed,
}

/// A free variable: one property of one rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Var {
    pub name: String,
    pub prop: Prop,
}

impl Var {
    pub fn new(name: impl Into<String>, prop: Prop) -> Self {
        Self {
            name: name.into(),
            prop,
        }
    }
}

/// A boolean expression over [`Var`]s.
#[derive(Debug, Clone, PartialEq)]
pub enum Bool {
    Const(bool),
    Var(Var),
    And(Vec<Bool>),
    Or(Vec<Bool>),
    Not(Box<Bool>),
}

pub const TRUE: Bool = Bool::Const(true);
pub const FALSE: Bool = Bool::Const(false);

impl Bool {
    pub fn not(inner: Bool) -> Bool {
        Bool::Not(Box::new(inner))
    }

    pub fn as_const(&self) -> Option<bool> {
        match self {
            Bool::Const(value) => Some(*value),
            _ => None,
        }
    }

    /// Substitute resolved variables and simplify.
    ///
    /// Conjunctions drop `true` members and collapse on `false` (dually for
    /// disjunctions); empty connectives collapse to their identity and
    /// singletons unwrap.
    pub fn evaluate(&self, env: &IndexMap<Var, bool>) -> Bool {
        match self {
            Bool::Const(_) => self.clone(),
            Bool::Var(var) => match env.get(var) {
                Some(value) => Bool::Const(*value),
                None => self.clone(),
            },
            Bool::And(items) => {
                let mut rest = Vec::new();
                for item in items {
                    match item.evaluate(env) {
                        Bool::Const(true) => continue,
                        Bool::Const(false) => return FALSE,
                        other => rest.push(other),
                    }
                }
                match rest.len() {
                    0 => TRUE,
                    1 => rest.remove(0),
                    _ => Bool::And(rest),
                }
            }
            Bool::Or(items) => {
                let mut rest = Vec::new();
                for item in items {
                    match item.evaluate(env) {
                        Bool::Const(false) => continue,
                        Bool::Const(true) => return TRUE,
                        other => rest.push(other),
                    }
                }
                match rest.len() {
                    0 => FALSE,
                    1 => rest.remove(0),
                    _ => Bool::Or(rest),
                }
            }
            Bool::Not(inner) => match inner.evaluate(env) {
                Bool::Const(value) => Bool::Const(!value),
                other => Bool::not(other),
            },
        }
    }
}

/// Solve an equation system to fixpoint.
///
/// Returns every variable's verdict: `Some` when the fixpoint pinned it,
/// `None` when the equations could not decide it (a dependency cycle with
/// no base case).
pub fn solve(equations: Vec<(Var, Bool)>) -> Result<IndexMap<Var, Option<bool>>> {
    let order: Vec<Var> = equations.iter().map(|(var, _)| var.clone()).collect();
    let mut env: IndexMap<Var, bool> = IndexMap::new();
    let mut pending: VecDeque<(Var, Bool)> = equations.into();

    for _ in 0..MAX_PASSES {
        let mut progressed = false;
        let mut unfinished = VecDeque::new();
        while let Some((var, expr)) = pending.pop_front() {
            let expr = expr.evaluate(&env);
            match expr.as_const() {
                Some(value) => {
                    env.insert(var, value);
                    progressed = true;
                }
                None => unfinished.push_back((var, expr)),
            }
        }
        pending = unfinished;
        if pending.is_empty() || !progressed {
            let mut verdicts = IndexMap::new();
            for var in order {
                let verdict = env.get(&var).copied();
                verdicts.insert(var, verdict);
            }
            return Ok(verdicts);
        }
    }
    Err(Error::FuelExhausted("boolean equation solving"))
}
