//! Tree-walk convention.
//!
//! Concrete visitors override [`Visitor::visit`] with a `match` on
//! [`Tree::name`] and fall back to [`walk`] for tags they do not handle;
//! `walk` descends children in order.

use crate::tree::Tree;

/// A tree traversal that dispatches on node tags.
pub trait Visitor {
    /// Visit one node. The default just descends.
    fn visit(&mut self, node: &Tree) {
        walk(self, node);
    }
}

/// Visit every child of `node` in order.
pub fn walk<V: Visitor + ?Sized>(visitor: &mut V, node: &Tree) {
    for (_, child) in node.children() {
        visitor.visit(child);
    }
}
