//! AST shape inference.
//!
//! Given a grammar AST, derive for every tag the sum-of-products shape of
//! the nodes it labels: which fields they carry, which fields repeat, and
//! the union of child types per field — everything a code generator needs
//! to emit typed tree classes.

use indexmap::IndexMap;
use pegtree_core::Tree;

use crate::Result;

mod ops;
mod registry;
mod ty;


pub use ty::{Fields, Labels, Ty};

use registry::Registry;

/// Infer, for every tag a grammar can emit, the type of the trees carrying
/// that tag.
///
/// The result contains no [`Ty::RuleRef`]; every [`Ty::Ref`] it contains
/// names another key of the same map. Keys appear in the order their tags
/// were first observed, starting from the first rule.
pub fn infer_types(grammar: &Tree) -> Result<IndexMap<String, Ty>> {
    let mut registry = Registry::compile(grammar)?;
    while let Some(name) = registry.next_rule() {
        let result = registry.process_rule(&name, &Ty::Empty)?;
        let flat = match result {
            Some(ty) => {
                registry.observe(&ty)?;
                Some(ty.flat()?)
            }
            None => None,
        };
        registry.set_return(name, flat);
    }
    registry.finish()
}
