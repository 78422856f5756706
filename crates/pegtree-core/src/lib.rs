#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core data structures for pegtree.
//!
//! Two layers:
//! - **Fragments**: partial tree values threaded through a parse, closed
//!   under the tree-shaping operations
//! - **Trees**: finalized, immutable ASTs with labelled ordered children
//!
//! Plus the [`Visitor`] convention for walking finalized trees.

mod fragment;
mod tree;
mod visitor;

pub use fragment::{Fragment, ShapeError};
pub use tree::Tree;
pub use visitor::{Visitor, walk};
