//! Rule-reference bookkeeping over grammar ASTs.

use indexmap::IndexSet;
use pegtree_core::{Tree, Visitor, walk};

/// Rule names defined, defined twice, and referenced anywhere in a body.
#[derive(Debug, Default)]
pub struct References {
    pub defined: IndexSet<String>,
    pub redefined: IndexSet<String>,
    pub referenced: IndexSet<String>,
}

impl Visitor for References {
    fn visit(&mut self, node: &Tree) {
        match node.name() {
            "Rule" => {
                if let Some(name) = node.get("name").and_then(Tree::value) {
                    if !self.defined.insert(name.to_owned()) {
                        self.redefined.insert(name.to_owned());
                    }
                }
                // Only the body is walked: the defining identifier is not a
                // reference.
                if let Some(body) = node.get("body") {
                    self.visit(body);
                }
            }
            "Identifier" => {
                if let Some(name) = node.value() {
                    self.referenced.insert(name.to_owned());
                }
            }
            _ => walk(self, node),
        }
    }
}

impl References {
    pub fn collect(grammar: &Tree) -> Self {
        let mut refs = Self::default();
        refs.visit(grammar);
        refs
    }
}

/// Names defined twice and names referenced but never defined, in
/// first-encounter order.
pub fn bad_references(grammar: &Tree) -> (Vec<String>, Vec<String>) {
    let refs = References::collect(grammar);
    let redefined = refs.redefined.iter().cloned().collect();
    let undefined = refs
        .referenced
        .difference(&refs.defined)
        .cloned()
        .collect();
    (redefined, undefined)
}
