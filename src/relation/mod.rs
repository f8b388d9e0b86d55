//! Relationship traversal.
//!
//! Edges between entities are described by [`EdgeStep`]s and exposed to
//! callers as typed [`Edge`]s. An edge predicate (`has_comments()`,
//! `has_user_with(..)`) asserts that related rows exist; the selector lowers
//! it into a join plus an existence test.

pub mod edge;
pub mod step;

pub use edge::Edge;
pub use step::{Cardinality, EdgeKind, EdgeStep, Through};
