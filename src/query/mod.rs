//! Query building and lowering.
//!
//! - [`Selector`]: mutable per-query state; applies predicates and lowers to
//!   `(sql, params)`
//! - [`Query`]: typed, reusable select builder over an entity
//! - [`Insert`], [`Update`], [`Delete`]: mutations validated against the
//!   schema registry
//! - [`clause`] and [`join`]: comparator lowering onto sea-query conditions
//!   and the join registry the selector lowers through
//! - [`value_conversion`]: binding lowered parameters with `may_postgres`

pub mod clause;
pub mod error;
pub mod join;
pub mod mutation;
pub mod select;
pub mod selector;
pub mod value_conversion;

pub use error::BuildError;
pub use join::{Join, JoinRegistry};
pub use mutation::{Delete, Insert, Update};
pub use select::Query;
pub use sea_query::Order;
pub use selector::Selector;
pub use value_conversion::{with_converted_params, Param};
