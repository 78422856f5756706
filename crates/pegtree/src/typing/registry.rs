//! The inference registry and driver.
//!
//! Holds every rule's compiled op, a memo of rule applications by input
//! type, the per-rule flat return unions, the work queue, and the running
//! union of every type observed per cut. The registry is threaded mutably
//! through op application because resolving a [`Ty::RuleRef`] can require
//! processing another rule mid-operation.

use std::collections::{BTreeSet, VecDeque};

use indexmap::{IndexMap, IndexSet};
use pegtree_core::Tree;

use crate::{Error, Result};

use super::ops::{TypeOp, compile};
use super::ty::{Labels, Ty};

/// Cap on memo stabilisation rounds for one rule application.
const STABILIZE_FUEL: usize = 100;

/// Cap on repeat-accumulation rounds.
const REPEAT_FUEL: usize = 500;

/// Cap on rule-reference chains chased while concretising a type.
const FORCE_FUEL: usize = 256;

pub(crate) struct Registry {
    ops: IndexMap<String, TypeOp>,
    memo: IndexMap<(String, Ty), Option<Ty>>,
    rets: IndexMap<String, Option<Ty>>,
    seen: IndexMap<Ty, Ty>,
    seen_rules: IndexSet<String>,
    queue: VecDeque<String>,
}

impl Registry {
    /// Compile every rule body and seed the queue with the start rule.
    pub(crate) fn compile(grammar: &Tree) -> Result<Self> {
        if grammar.name() != "Grammar" {
            return Err(Error::MalformedTree(format!(
                "expected a Grammar node, found `{}`",
                grammar.name()
            )));
        }
        let mut ops = IndexMap::new();
        let mut start = None;
        for rule in grammar.values("rule") {
            let name = rule
                .get("name")
                .and_then(Tree::value)
                .ok_or_else(|| Error::MalformedTree("`Rule` node is missing its name".into()))?;
            let body = rule
                .get("body")
                .ok_or_else(|| Error::MalformedTree("`Rule` node is missing its body".into()))?;
            ops.insert(name.to_owned(), compile(body)?);
            start.get_or_insert_with(|| name.to_owned());
        }
        let Some(start) = start else {
            return Err(Error::MalformedTree("grammar defines no rules".into()));
        };
        let mut seen_rules = IndexSet::new();
        seen_rules.insert(start.clone());
        Ok(Self {
            ops,
            memo: IndexMap::new(),
            rets: IndexMap::new(),
            seen: IndexMap::new(),
            seen_rules,
            queue: VecDeque::from([start]),
        })
    }

    pub(crate) fn next_rule(&mut self) -> Option<String> {
        self.queue.pop_front()
    }

    pub(crate) fn set_return(&mut self, name: String, flat: Option<Ty>) {
        self.rets.insert(name, flat);
    }

    /// Run one op against one input type. `None` is ⊥: this position can
    /// never produce a fragment.
    pub(crate) fn apply_op(&mut self, op: &TypeOp, input: &Ty) -> Result<Option<Ty>> {
        match op {
            TypeOp::NoOp => Ok(Some(input.clone())),
            TypeOp::Fail => Ok(None),
            TypeOp::Text => self.extend_ty(input, &Ty::Str),
            TypeOp::Tag(name) => Ok(Some(Ty::Named(name.clone()))),

            TypeOp::Append(inner, label) => {
                let Some(result) = self.apply_op(inner, &Ty::Empty)? else {
                    return Ok(None);
                };
                self.observe(&result)?;
                let child = result.flat()?;
                self.append_ty(input, label, &child)
            }
            TypeOp::Rappend(inner, label) => {
                let Some(result) = self.apply_op(inner, &Ty::Empty)? else {
                    return Ok(None);
                };
                self.observe(input)?;
                let child = input.flat()?;
                self.append_ty(&result, label, &child)
            }

            TypeOp::Extend(inner) => {
                let Some(result) = self.apply_op(inner, &Ty::Empty)? else {
                    return Ok(None);
                };
                self.extend_ty(input, &result)
            }
            TypeOp::Rextend(inner) => {
                let Some(result) = self.apply_op(inner, &Ty::Empty)? else {
                    return Ok(None);
                };
                self.extend_ty(&result, input)
            }

            TypeOp::Sequence(ops) => {
                let mut current = input.clone();
                for op in ops {
                    let Some(next) = self.apply_op(op, &current)? else {
                        return Ok(None);
                    };
                    current = next;
                }
                Ok(Some(current))
            }

            TypeOp::Choice(ops) => {
                let mut members = BTreeSet::new();
                for op in ops {
                    if let Some(result) = self.apply_op(op, input)? {
                        members.extend(result.members().into_iter().cloned());
                    }
                }
                Ok(Ty::from_members(members))
            }

            TypeOp::Repeat(inner) => {
                let mut accumulated: BTreeSet<Ty> = BTreeSet::new();
                let mut current = Some(input.clone());
                for _ in 0..REPEAT_FUEL {
                    let Some(ty) = current.take() else { break };
                    if ty.members().iter().all(|m| accumulated.contains(*m)) {
                        current = Some(ty);
                        break;
                    }
                    accumulated.extend(ty.members().into_iter().cloned());
                    current = self.apply_op(inner, &ty)?;
                }
                if current
                    .as_ref()
                    .is_some_and(|ty| ty.members().iter().any(|m| !accumulated.contains(*m)))
                {
                    return Err(Error::FuelExhausted("repeat type accumulation"));
                }
                Ok(Ty::from_members(accumulated))
            }

            TypeOp::Lazy(name) => {
                let forced = match input {
                    Ty::RuleRef(other) => {
                        let other = other.clone();
                        self.process_rule(&other, &Ty::Empty)?
                    }
                    _ => Some(input.clone()),
                };
                match forced {
                    // A cut: the rule's shape is deferred and the rule
                    // queued for its own inference.
                    Some(Ty::Empty) => Ok(Some(Ty::RuleRef(name.clone()))),
                    _ => self.process_rule(name, input),
                }
            }
        }
    }

    /// Apply a rule's op, memoised by input type.
    ///
    /// The memo is seeded with ⊥ before computing, so recursive re-entries
    /// read as failure instead of diverging; afterwards the result is
    /// recomputed until it stops changing, which settles one-step feedback
    /// through the memo.
    pub(crate) fn process_rule(&mut self, name: &str, input: &Ty) -> Result<Option<Ty>> {
        let key = (name.to_owned(), input.clone());
        if let Some(cached) = self.memo.get(&key) {
            return Ok(cached.clone());
        }
        let Some(op) = self.ops.get(name).cloned() else {
            return Err(Error::UndefinedRule(name.to_owned()));
        };
        self.memo.insert(key.clone(), None);
        let mut result = self.apply_op(&op, input)?;
        self.memo.insert(key.clone(), result.clone());
        if result.is_none() {
            return Ok(None);
        }
        for _ in 0..STABILIZE_FUEL {
            let next = self.apply_op(&op, input)?;
            if next == result {
                return Ok(result);
            }
            result = next;
            self.memo.insert(key.clone(), result.clone());
        }
        Err(Error::FuelExhausted("rule type stabilisation"))
    }

    /// Record every member of `ty` in the seen map (unioned per cut) and
    /// queue rules referenced for the first time.
    pub(crate) fn observe(&mut self, ty: &Ty) -> Result<()> {
        let members: Vec<Ty> = ty.members().into_iter().cloned().collect();
        for member in members {
            if let Ty::RuleRef(name) = &member
                && self.seen_rules.insert(name.clone())
            {
                self.queue.push_back(name.clone());
            }
            let key = member.flat()?;
            let merged = match self.seen.get(&key) {
                Some(previous) => previous.merge(&member),
                None => member,
            };
            self.seen.insert(key, merged);
        }
        Ok(())
    }

    /// Flatten `ty` to its concrete members, chasing rule references
    /// through the memoised rules. ⊥ references contribute nothing.
    fn concrete_members(&mut self, ty: &Ty, out: &mut Vec<Ty>, fuel: &mut usize) -> Result<()> {
        let members: Vec<Ty> = ty.members().into_iter().cloned().collect();
        for member in members {
            if let Ty::RuleRef(name) = &member {
                if *fuel == 0 {
                    return Err(Error::FuelExhausted("rule reference chasing"));
                }
                *fuel -= 1;
                if let Some(forced) = self.process_rule(name, &Ty::Empty)? {
                    self.concrete_members(&forced, out, fuel)?;
                }
            } else {
                out.push(member);
            }
        }
        Ok(())
    }

    /// The static `extend`: splice `other`'s content after `input`'s,
    /// memberwise over both sides.
    pub(crate) fn extend_ty(&mut self, input: &Ty, other: &Ty) -> Result<Option<Ty>> {
        let mut fuel = FORCE_FUEL;
        let mut receivers = Vec::new();
        self.concrete_members(input, &mut receivers, &mut fuel)?;
        let mut args = Vec::new();
        self.concrete_members(other, &mut args, &mut fuel)?;

        let mut members = BTreeSet::new();
        for receiver in &receivers {
            for arg in &args {
                members.insert(extend_pair(receiver, arg)?);
            }
        }
        Ok(Ty::from_members(members))
    }

    /// The static `append`: record `child` (a cut) under `label`,
    /// memberwise over the receiver.
    pub(crate) fn append_ty(&mut self, input: &Ty, label: &str, child: &Ty) -> Result<Option<Ty>> {
        let mut fuel = FORCE_FUEL;
        let mut receivers = Vec::new();
        self.concrete_members(input, &mut receivers, &mut fuel)?;

        let mut members = BTreeSet::new();
        for receiver in &receivers {
            members.insert(append_pair(receiver, label, child)?);
        }
        Ok(Ty::from_members(members))
    }

    /// The union of concrete cuts reachable from a rule's return type
    /// through chains of rule references.
    fn closure(&self, name: &str) -> Option<Ty> {
        let mut visited: IndexSet<String> = IndexSet::new();
        let mut stack = vec![name.to_owned()];
        let mut refs = BTreeSet::new();
        while let Some(rule) = stack.pop() {
            if !visited.insert(rule.clone()) {
                continue;
            }
            let Some(Some(ret)) = self.rets.get(&rule) else {
                continue;
            };
            for member in ret.members() {
                match member {
                    Ty::RuleRef(next) => stack.push(next.clone()),
                    other => {
                        refs.insert(other.clone());
                    }
                }
            }
        }
        Ty::from_members(refs)
    }

    /// Replace every rule reference in `ty` with its closure. `None` means
    /// the type referenced only rules that never produce a fragment.
    fn resolve(&self, ty: &Ty) -> Result<Option<Ty>> {
        match ty {
            Ty::RuleRef(name) => Ok(self.closure(name)),
            Ty::Or(ty_members) => {
                let mut members = BTreeSet::new();
                for member in ty_members {
                    if let Some(resolved) = self.resolve(member)? {
                        members.extend(resolved.members().into_iter().cloned());
                    }
                }
                Ok(Ty::from_members(members))
            }
            Ty::Node {
                name,
                fields,
                arrays,
            } => Ok(Some(Ty::Node {
                name: name.clone(),
                fields: self.resolve_fields(fields)?,
                arrays: arrays.clone(),
            })),
            Ty::Container { fields, arrays } => Ok(Some(Ty::Container {
                fields: self.resolve_fields(fields)?,
                arrays: arrays.clone(),
            })),
            other => Ok(Some(other.clone())),
        }
    }

    fn resolve_fields(&self, fields: &super::ty::Fields) -> Result<super::ty::Fields> {
        let mut out = super::ty::Fields::new();
        for (label, ty) in fields {
            if let Some(resolved) = self.resolve(ty)? {
                out.insert(label.clone(), resolved);
            }
        }
        Ok(out)
    }

    /// Resolve and collapse everything observed into the final per-tag map.
    pub(crate) fn finish(self) -> Result<IndexMap<String, Ty>> {
        let mut out = IndexMap::new();
        for (key, merged) in &self.seen {
            let Ty::Ref(name) = key else { continue };
            let Some(resolved) = self.resolve(merged)? else {
                continue;
            };
            out.insert(name.clone(), resolved.common()?);
        }
        Ok(out)
    }
}

/// One receiver, one concrete argument: the fragment `extend` table, lifted.
fn extend_pair(receiver: &Ty, arg: &Ty) -> Result<Ty> {
    use Ty::*;
    Ok(match (receiver, arg) {
        (Empty, _) => arg.unnamed_one(),

        (Str, Empty | Str | Term(_)) => Str,
        (Term(name), Empty | Str | Term(_)) => Term(name.clone()),

        (Named(name), Empty | Named(_)) => Named(name.clone()),
        (Named(name), Str | Term(_)) => Term(name.clone()),
        (Named(name), Container { fields, arrays } | Node { fields, arrays, .. }) => Node {
            name: name.clone(),
            fields: fields.clone(),
            arrays: arrays.clone(),
        },

        (Container { .. } | Node { .. }, Empty) => receiver.clone(),
        (
            Container { fields, arrays },
            Container {
                fields: other_fields,
                arrays: other_arrays,
            }
            | Node {
                fields: other_fields,
                arrays: other_arrays,
                ..
            },
        ) => {
            let (fields, arrays) = spliced_fields(fields, arrays, other_fields, other_arrays);
            Container { fields, arrays }
        }
        (
            Node {
                name,
                fields,
                arrays,
            },
            Container {
                fields: other_fields,
                arrays: other_arrays,
            }
            | Node {
                fields: other_fields,
                arrays: other_arrays,
                ..
            },
        ) => {
            let (fields, arrays) = spliced_fields(fields, arrays, other_fields, other_arrays);
            Node {
                name: name.clone(),
                fields,
                arrays,
            }
        }

        _ => return Err(receiver.shape_fault("extend")),
    })
}

/// Field maps of two spliced child lists: a label present on both sides
/// repeats, so it promotes into the array set with its types unioned.
fn spliced_fields(
    fields: &super::ty::Fields,
    arrays: &Labels,
    other_fields: &super::ty::Fields,
    other_arrays: &Labels,
) -> (super::ty::Fields, Labels) {
    let mut fields = fields.clone();
    let mut arrays: Labels = arrays.union(other_arrays).cloned().collect();
    for (label, ty) in other_fields {
        match fields.get_mut(label) {
            Some(existing) => {
                *existing = existing.merge(ty);
                arrays.insert(label.clone());
            }
            None => {
                fields.insert(label.clone(), ty.clone());
            }
        }
    }
    (fields, arrays)
}

/// One receiver, one cut child: the fragment `append` table, lifted.
fn append_pair(receiver: &Ty, label: &str, child: &Ty) -> Result<Ty> {
    use Ty::*;
    Ok(match receiver {
        Empty => Container {
            fields: [(label.to_owned(), child.clone())].into(),
            arrays: Labels::new(),
        },
        Named(name) => Node {
            name: name.clone(),
            fields: [(label.to_owned(), child.clone())].into(),
            arrays: Labels::new(),
        },
        Container { fields, arrays } => {
            let (fields, arrays) = appended_fields(fields, arrays, label, child);
            Container { fields, arrays }
        }
        Node {
            name,
            fields,
            arrays,
        } => {
            let (fields, arrays) = appended_fields(fields, arrays, label, child);
            Node {
                name: name.clone(),
                fields,
                arrays,
            }
        }
        _ => return Err(receiver.shape_fault("append")),
    })
}

/// A second append under a label promotes it into the array set.
fn appended_fields(
    fields: &super::ty::Fields,
    arrays: &Labels,
    label: &str,
    child: &Ty,
) -> (super::ty::Fields, Labels) {
    let mut fields = fields.clone();
    let mut arrays = arrays.clone();
    match fields.get_mut(label) {
        Some(existing) => {
            *existing = existing.merge(child);
            arrays.insert(label.to_owned());
        }
        None => {
            fields.insert(label.to_owned(), child.clone());
        }
    }
    (fields, arrays)
}
