//! Generated entity modules for the users/comments domain.
//!
//! Each module declares its entity marker type, typed columns, edges, the
//! registry descriptor (defaults, validators, foreign keys) and one predicate
//! constructor per field and operator, in the style of generated code:
//!
//! ```no_run
//! use relq::entity::{comment, user};
//!
//! let p = user::and([
//!     user::age_gte(18),
//!     user::has_comments_with([comment::comment_contains_fold("rust")]),
//! ]);
//! ```

use crate::schema::Schema;

/// Comparison predicates for a field with an ordered type
macro_rules! field_predicates {
    (
        $entity:ty, $col:expr, $ty:ty {
            eq: $eq:ident,
            neq: $neq:ident,
            is_in: $is_in:ident,
            not_in: $not_in:ident,
            gt: $gt:ident,
            gte: $gte:ident,
            lt: $lt:ident,
            lte: $lte:ident $(,)?
        }
    ) => {
        #[doc = concat!("`", stringify!($col), " = v`")]
        pub fn $eq(v: impl Into<$ty>) -> $crate::predicate::Predicate<$entity> {
            $col.eq(v)
        }

        #[doc = concat!("`", stringify!($col), " <> v`")]
        pub fn $neq(v: impl Into<$ty>) -> $crate::predicate::Predicate<$entity> {
            $col.ne(v)
        }

        #[doc = concat!("`", stringify!($col), " IN (vs)`; fails on an empty set")]
        pub fn $is_in<V: Into<$ty>>(
            vs: impl IntoIterator<Item = V>,
        ) -> Result<$crate::predicate::Predicate<$entity>, $crate::query::BuildError> {
            $col.is_in(vs)
        }

        #[doc = concat!("`", stringify!($col), " NOT IN (vs)`; fails on an empty set")]
        pub fn $not_in<V: Into<$ty>>(
            vs: impl IntoIterator<Item = V>,
        ) -> Result<$crate::predicate::Predicate<$entity>, $crate::query::BuildError> {
            $col.is_not_in(vs)
        }

        pub fn $gt(v: impl Into<$ty>) -> $crate::predicate::Predicate<$entity> {
            $col.gt(v)
        }

        pub fn $gte(v: impl Into<$ty>) -> $crate::predicate::Predicate<$entity> {
            $col.gte(v)
        }

        pub fn $lt(v: impl Into<$ty>) -> $crate::predicate::Predicate<$entity> {
            $col.lt(v)
        }

        pub fn $lte(v: impl Into<$ty>) -> $crate::predicate::Predicate<$entity> {
            $col.lte(v)
        }
    };
}

/// String predicates for a text field
macro_rules! text_predicates {
    (
        $entity:ty, $col:expr {
            contains: $contains:ident,
            has_prefix: $has_prefix:ident,
            has_suffix: $has_suffix:ident,
            equal_fold: $equal_fold:ident,
            contains_fold: $contains_fold:ident $(,)?
        }
    ) => {
        pub fn $contains(v: impl Into<String>) -> $crate::predicate::Predicate<$entity> {
            $col.contains(v)
        }

        pub fn $has_prefix(v: impl Into<String>) -> $crate::predicate::Predicate<$entity> {
            $col.has_prefix(v)
        }

        pub fn $has_suffix(v: impl Into<String>) -> $crate::predicate::Predicate<$entity> {
            $col.has_suffix(v)
        }

        /// Case-insensitive equality
        pub fn $equal_fold(v: impl Into<String>) -> $crate::predicate::Predicate<$entity> {
            $col.equal_fold(v)
        }

        /// Case-insensitive substring match
        pub fn $contains_fold(v: impl Into<String>) -> $crate::predicate::Predicate<$entity> {
            $col.contains_fold(v)
        }
    };
}

/// `and` / `or` / `not` specialized to one entity
macro_rules! combinators {
    ($entity:ty) => {
        /// All predicates hold
        pub fn and(
            preds: impl IntoIterator<Item = $crate::predicate::Predicate<$entity>>,
        ) -> $crate::predicate::Predicate<$entity> {
            $crate::predicate::and(preds)
        }

        /// Any predicate holds
        pub fn or(
            preds: impl IntoIterator<Item = $crate::predicate::Predicate<$entity>>,
        ) -> $crate::predicate::Predicate<$entity> {
            $crate::predicate::or(preds)
        }

        /// Negation
        pub fn not(
            pred: $crate::predicate::Predicate<$entity>,
        ) -> $crate::predicate::Predicate<$entity> {
            $crate::predicate::not(pred)
        }
    };
}

pub mod comment;
pub mod user;

pub use comment::Comment;
pub use user::User;

/// Registry for every entity in this module
pub fn schema() -> Schema {
    Schema::new()
        .entity(user::descriptor())
        .entity(comment::descriptor())
}
