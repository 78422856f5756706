//! Partial tree values threaded through a parse.
//!
//! Every combinator receives an incoming [`Fragment`] and produces a new one;
//! the tree-shaping operators (`extend`, `append` and their reversed forms)
//! are total on the variants listed in their tables and reject everything
//! else with a [`ShapeError`]. A rejected combination means the grammar's
//! tree annotations are inconsistent — it is never a parse failure.

use crate::tree::Tree;

/// A tree-shaping operation was applied to a fragment variant that cannot
/// carry it (e.g. `append` on a lexeme under construction).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("`{op}` has no meaning on a {variant} fragment")]
pub struct ShapeError {
    /// The operation that was attempted.
    pub op: &'static str,
    /// The fragment variant it was attempted on.
    pub variant: &'static str,
}

impl ShapeError {
    fn new(op: &'static str, fragment: &Fragment) -> Self {
        Self {
            op,
            variant: fragment.variant(),
        }
    }
}

/// A partially built tree.
///
/// The variants form a small lattice: `Empty` has committed to nothing,
/// `Named` has committed to a tag, `String` to text, and the remaining
/// variants combine those commitments. `extend` and `append` promote a
/// fragment upward through the lattice; `finalize` snapshots the shaped
/// variants into an immutable [`Tree`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Fragment {
    /// No commitment yet.
    #[default]
    Empty,
    /// A tag has been asserted; children or text will turn it into a node
    /// or a term.
    Named(String),
    /// A lexeme under construction, no tag.
    String(String),
    /// Tag plus accumulated text.
    Term { name: String, value: String },
    /// Labelled children accumulated, no tag yet.
    Container(Vec<(String, Tree)>),
    /// Tag plus labelled children.
    Node {
        name: String,
        children: Vec<(String, Tree)>,
    },
}

impl Fragment {
    /// Variant name for error reporting.
    pub fn variant(&self) -> &'static str {
        match self {
            Fragment::Empty => "empty",
            Fragment::Named(_) => "named",
            Fragment::String(_) => "string",
            Fragment::Term { .. } => "term",
            Fragment::Container(_) => "container",
            Fragment::Node { .. } => "node",
        }
    }

    /// Snapshot this fragment as an immutable tree.
    ///
    /// Only the shaped variants survive finalization: a bare tag becomes a
    /// leaf, tag+text becomes a term, tag+children becomes a node.
    pub fn finalize(&self) -> Result<Tree, ShapeError> {
        match self {
            Fragment::Named(name) => Ok(Tree::Named { name: name.clone() }),
            Fragment::Term { name, value } => Ok(Tree::Term {
                name: name.clone(),
                value: value.clone(),
            }),
            Fragment::Node { name, children } => Ok(Tree::Node {
                name: name.clone(),
                children: children.clone(),
            }),
            other => Err(ShapeError::new("finalize", other)),
        }
    }

    /// Concatenate `other`'s content after this fragment's.
    ///
    /// Text extends text, children splice after children; `Empty` and
    /// `Named` receivers are promoted by whatever content arrives. An
    /// `Empty` or `Named` argument contributes nothing.
    pub fn extend(&self, other: &Fragment) -> Result<Fragment, ShapeError> {
        use Fragment::*;
        match (self, other) {
            (Empty, String(v)) | (Empty, Term { value: v, .. }) => Ok(String(v.clone())),
            (Empty, Container(vs)) | (Empty, Node { children: vs, .. }) => {
                Ok(Container(vs.clone()))
            }
            (Empty, Empty) | (Empty, Named(_)) => Ok(Empty),

            (Named(n), String(v)) | (Named(n), Term { value: v, .. }) => Ok(Term {
                name: n.clone(),
                value: v.clone(),
            }),
            (Named(n), Container(vs)) | (Named(n), Node { children: vs, .. }) => Ok(Node {
                name: n.clone(),
                children: vs.clone(),
            }),
            (Named(n), Empty) | (Named(n), Named(_)) => Ok(Named(n.clone())),

            (String(s), String(v)) | (String(s), Term { value: v, .. }) => {
                Ok(String(format!("{s}{v}")))
            }

            (Term { name, value }, String(v)) | (Term { name, value }, Term { value: v, .. }) => {
                Ok(Term {
                    name: name.clone(),
                    value: format!("{value}{v}"),
                })
            }

            (Container(vs), Container(ws)) | (Container(vs), Node { children: ws, .. }) => {
                let mut children = vs.clone();
                children.extend(ws.iter().cloned());
                Ok(Container(children))
            }

            (Node { name, children }, Container(ws))
            | (Node { name, children }, Node { children: ws, .. }) => {
                let mut children = children.clone();
                children.extend(ws.iter().cloned());
                Ok(Node {
                    name: name.clone(),
                    children,
                })
            }

            (receiver, _) => Err(ShapeError::new("extend", receiver)),
        }
    }

    /// Like [`extend`](Self::extend), but `other`'s content is placed
    /// *before* this fragment's.
    pub fn rextend(&self, other: &Fragment) -> Result<Fragment, ShapeError> {
        use Fragment::*;
        match (self, other) {
            // With no content of its own the receiver promotes the same way
            // in both directions.
            (Empty, _) | (Named(_), _) => self.extend(other),

            (String(s), String(v)) | (String(s), Term { value: v, .. }) => {
                Ok(String(format!("{v}{s}")))
            }

            (Term { name, value }, String(v)) | (Term { name, value }, Term { value: v, .. }) => {
                Ok(Term {
                    name: name.clone(),
                    value: format!("{v}{value}"),
                })
            }

            (Container(vs), Container(ws)) | (Container(vs), Node { children: ws, .. }) => {
                let mut children = ws.clone();
                children.extend(vs.iter().cloned());
                Ok(Container(children))
            }

            (Node { name, children }, Container(ws))
            | (Node { name, children }, Node { children: ws, .. }) => {
                let mut out = ws.clone();
                out.extend(children.iter().cloned());
                Ok(Node {
                    name: name.clone(),
                    children: out,
                })
            }

            (receiver, _) => Err(ShapeError::new("rextend", receiver)),
        }
    }

    /// Finalize `child` and add it after this fragment's children under
    /// `label`. Promotes `Empty` to a container and `Named` to a node.
    pub fn append(&self, label: &str, child: &Fragment) -> Result<Fragment, ShapeError> {
        use Fragment::*;
        let entry = (label.to_owned(), child.finalize()?);
        match self {
            Empty => Ok(Container(vec![entry])),
            Named(n) => Ok(Node {
                name: n.clone(),
                children: vec![entry],
            }),
            Container(vs) => {
                let mut children = vs.clone();
                children.push(entry);
                Ok(Container(children))
            }
            Node { name, children } => {
                let mut children = children.clone();
                children.push(entry);
                Ok(Node {
                    name: name.clone(),
                    children,
                })
            }
            receiver => Err(ShapeError::new("append", receiver)),
        }
    }

    /// Like [`append`](Self::append), but the new child is placed *before*
    /// this fragment's children.
    pub fn rappend(&self, label: &str, child: &Fragment) -> Result<Fragment, ShapeError> {
        use Fragment::*;
        let entry = (label.to_owned(), child.finalize()?);
        match self {
            Empty => Ok(Container(vec![entry])),
            Named(n) => Ok(Node {
                name: n.clone(),
                children: vec![entry],
            }),
            Container(vs) => {
                let mut children = vec![entry];
                children.extend(vs.iter().cloned());
                Ok(Container(children))
            }
            Node { name, children } => {
                let mut out = vec![entry];
                out.extend(children.iter().cloned());
                Ok(Node {
                    name: name.clone(),
                    children: out,
                })
            }
            receiver => Err(ShapeError::new("rappend", receiver)),
        }
    }
}

#[cfg(test)]
#[path = "fragment_tests.rs"]
mod fragment_tests;
