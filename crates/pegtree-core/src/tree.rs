//! Finalized, immutable syntax trees.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An immutable tree produced by finalizing a fragment.
///
/// Children are ordered and labelled; the same label may occur any number of
/// times. Equality is structural.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tree {
    /// A leaf carrying only a tag.
    Named { name: String },
    /// A leaf carrying a tag and the text it consumed.
    Term { name: String, value: String },
    /// An interior node with ordered `(label, child)` pairs.
    Node {
        name: String,
        children: Vec<(String, Tree)>,
    },
}

impl Tree {
    /// The node's tag.
    pub fn name(&self) -> &str {
        match self {
            Tree::Named { name } | Tree::Term { name, .. } | Tree::Node { name, .. } => name,
        }
    }

    /// The consumed text, for terms.
    pub fn value(&self) -> Option<&str> {
        match self {
            Tree::Term { value, .. } => Some(value),
            _ => None,
        }
    }

    /// All `(label, child)` pairs in order. Empty for leaves.
    pub fn children(&self) -> &[(String, Tree)] {
        match self {
            Tree::Node { children, .. } => children,
            _ => &[],
        }
    }

    /// All children under `label`, in order.
    pub fn values(&self, label: &str) -> Vec<&Tree> {
        self.children()
            .iter()
            .filter(|(l, _)| l == label)
            .map(|(_, child)| child)
            .collect()
    }

    /// The single child under `label`.
    ///
    /// Returns `None` when the label is absent *or* repeated; repeated
    /// labels are reached through [`values`](Self::values).
    pub fn get(&self, label: &str) -> Option<&Tree> {
        let mut found = self.children().iter().filter(|(l, _)| l == label);
        match (found.next(), found.next()) {
            (Some((_, child)), None) => Some(child),
            _ => None,
        }
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tree::Named { name } => write!(f, "{name}"),
            Tree::Term { name, value } => write!(f, "{name}({value:?})"),
            Tree::Node { name, children } => {
                write!(f, "{name}(")?;
                for (i, (label, child)) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{label}={child}")?;
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
#[path = "tree_tests.rs"]
mod tree_tests;
