//! Static analysis over grammar ASTs.
//!
//! - `refs` - which rules are defined, redefined, referenced
//! - `boolean` - the equation algebra and its fixpoint solver
//! - `well_formed` - nullability/well-formedness systems and [`validate`]
//! - `tags` - the tag vocabulary a grammar can emit

pub mod boolean;
mod refs;
mod tags;
mod well_formed;


pub use refs::{References, bad_references};
pub use tags::tag_names;
pub use well_formed::{validate, well_formed};
