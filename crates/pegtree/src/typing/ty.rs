//! The static type algebra.
//!
//! [`Ty`] mirrors the fragment algebra shape for shape, but statically: a
//! rule's inferred type describes every fragment it can leave behind.
//! Unions are flat sets that collapse when singleton; field maps record,
//! per label, the union of child types and whether the label repeats.
//! `BTreeMap`/`BTreeSet` keep types `Ord + Hash`, which the inference
//! registry needs for memoisation keys.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use pegtree_core::ShapeError;
use serde::Serialize;

use crate::{Error, Result};

/// Label → child type (always the flat [`Ty::Ref`] form, or a union of it).
pub type Fields = BTreeMap<String, Ty>;

/// The labels known to repeat.
pub type Labels = BTreeSet<String>;

/// A static description of the fragments a grammar position can produce.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Ty {
    /// No commitment.
    Empty,
    /// Untagged text.
    Str,
    /// A bare tag.
    Named(String),
    /// A tag with text: a leaf carrying a value.
    Term(String),
    /// Labelled children without a tag.
    Container { fields: Fields, arrays: Labels },
    /// A tagged node with labelled children.
    Node {
        name: String,
        fields: Fields,
        arrays: Labels,
    },
    /// A flat union of alternatives. Never nested, never a singleton.
    Or(BTreeSet<Ty>),
    /// The flat cut form of a tagged type: a reference by tag name.
    Ref(String),
    /// A lazy reference to a rule's type, resolved through the registry.
    RuleRef(String),
}

impl Ty {
    /// Variant name for error reporting.
    pub fn variant(&self) -> &'static str {
        match self {
            Ty::Empty => "empty",
            Ty::Str => "string",
            Ty::Named(_) => "named",
            Ty::Term(_) => "term",
            Ty::Container { .. } => "container",
            Ty::Node { .. } => "node",
            Ty::Or(_) => "union",
            Ty::Ref(_) => "reference",
            Ty::RuleRef(_) => "rule reference",
        }
    }

    pub(crate) fn shape_fault(&self, op: &'static str) -> Error {
        Error::Shape(ShapeError {
            op,
            variant: self.variant(),
        })
    }

    /// The union's alternatives, or the type itself.
    pub fn members(&self) -> Vec<&Ty> {
        match self {
            Ty::Or(members) => members.iter().collect(),
            other => vec![other],
        }
    }

    /// Build a type from a set of non-union members: none is no type at
    /// all, one collapses, more form a union.
    pub(crate) fn from_members(members: BTreeSet<Ty>) -> Option<Ty> {
        match members.len() {
            0 => None,
            1 => members.into_iter().next(),
            _ => Some(Ty::Or(members)),
        }
    }

    /// Set-union of two types' members.
    pub fn merge(&self, other: &Ty) -> Ty {
        let mut members: BTreeSet<Ty> = self.members().into_iter().cloned().collect();
        members.extend(other.members().into_iter().cloned());
        Ty::from_members(members).unwrap_or(Ty::Empty)
    }

    /// The flat cut form: tagged types collapse to a [`Ty::Ref`] on their
    /// tag. Untagged types have no cut form — labelling one is the static
    /// face of appending an untagged fragment, a shape fault.
    pub fn flat(&self) -> Result<Ty> {
        match self {
            Ty::Named(name) | Ty::Term(name) | Ty::Node { name, .. } => {
                Ok(Ty::Ref(name.clone()))
            }
            Ty::Ref(_) | Ty::RuleRef(_) => Ok(self.clone()),
            Ty::Or(members) => {
                let mut flats = BTreeSet::new();
                for member in members {
                    flats.extend(member.flat()?.members().into_iter().cloned());
                }
                Ok(Ty::from_members(flats).unwrap_or(Ty::Empty))
            }
            Ty::Empty | Ty::Str | Ty::Container { .. } => Err(self.shape_fault("flatten")),
        }
    }

    /// What a concrete member contributes when spliced into an empty
    /// receiver: its content, stripped of any tag.
    pub(crate) fn unnamed_one(&self) -> Ty {
        match self {
            Ty::Named(_) | Ty::Ref(_) => Ty::Empty,
            Ty::Term(_) => Ty::Str,
            Ty::Node { fields, arrays, .. } => Ty::Container {
                fields: fields.clone(),
                arrays: arrays.clone(),
            },
            other => other.clone(),
        }
    }

    /// Collapse a union of same-tag occurrences into one sum-of-products
    /// shape: field maps merge, array sets union.
    pub fn common(&self) -> Result<Ty> {
        let mut current = Ty::Empty;
        for member in self.members() {
            current = current.common_with(member)?;
        }
        Ok(current)
    }

    fn common_with(&self, other: &Ty) -> Result<Ty> {
        use Ty::*;
        match (self, other) {
            (Empty, _) => Ok(other.clone()),
            (Named(a), Named(b)) if a == b => Ok(self.clone()),
            (Named(a), Term(b)) | (Term(a), Named(b)) if a == b => Ok(Term(a.clone())),
            (Term(a), Term(b)) if a == b => Ok(self.clone()),
            (Named(a), Node { name, .. }) if a == name => Ok(other.clone()),
            (Node { name, .. }, Named(b)) if name == b => Ok(self.clone()),
            (
                Node {
                    name,
                    fields,
                    arrays,
                },
                Node {
                    name: other_name,
                    fields: other_fields,
                    arrays: other_arrays,
                },
            ) if name == other_name => {
                let mut fields = fields.clone();
                for (label, ty) in other_fields {
                    fields
                        .entry(label.clone())
                        .and_modify(|existing| *existing = existing.merge(ty))
                        .or_insert_with(|| ty.clone());
                }
                Ok(Node {
                    name: name.clone(),
                    fields,
                    arrays: arrays.union(other_arrays).cloned().collect(),
                })
            }
            // A tag used inconsistently (term here, node there, or two
            // different tags under one cut).
            _ => Err(other.shape_fault("unify")),
        }
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Empty => write!(f, "()"),
            Ty::Str => write!(f, "str"),
            Ty::Named(name) => write!(f, "{name}"),
            Ty::Term(name) => write!(f, "\"{name}\""),
            Ty::Ref(name) => write!(f, "{name}"),
            Ty::RuleRef(name) => write!(f, "*{name}"),
            Ty::Container { fields, arrays } => write_fields(f, None, fields, arrays),
            Ty::Node {
                name,
                fields,
                arrays,
            } => write_fields(f, Some(name), fields, arrays),
            Ty::Or(members) => {
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{member}")?;
                }
                Ok(())
            }
        }
    }
}

fn write_fields(
    f: &mut fmt::Formatter<'_>,
    name: Option<&str>,
    fields: &Fields,
    arrays: &Labels,
) -> fmt::Result {
    if let Some(name) = name {
        write!(f, "{name}")?;
    }
    write!(f, "(")?;
    for (i, (label, ty)) in fields.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        if arrays.contains(label) {
            write!(f, "{label}=[{ty}]")?;
        } else {
            write!(f, "{label}={ty}")?;
        }
    }
    write!(f, ")")
}
