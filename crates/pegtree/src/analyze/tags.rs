//! Tag vocabulary of a grammar.

use indexmap::IndexSet;
use pegtree_core::{Tree, Visitor, walk};

#[derive(Debug, Default)]
struct Tags {
    names: IndexSet<String>,
}

impl Visitor for Tags {
    fn visit(&mut self, node: &Tree) {
        if node.name() == "Tag" {
            if let Some(name) = node.value() {
                self.names.insert(name.to_owned());
            }
        } else {
            walk(self, node);
        }
    }
}

/// Every tag a grammar can emit, in first-use order.
///
/// This is the set of node names a visitor over the grammar's parse trees
/// has to handle.
pub fn tag_names(grammar: &Tree) -> IndexSet<String> {
    let mut tags = Tags::default();
    tags.visit(grammar);
    tags.names
}
