//! Predicate algebra.
//!
//! A predicate is a plain tree of [`Node`]s: comparators, `AND` / `OR` / `NOT`
//! groups and edge existence checks. Building a predicate has no side effects;
//! nothing is registered anywhere until a [`Selector`](crate::query::Selector)
//! applies it. The same predicate can be applied to any number of selectors.
//!
//! [`Predicate<E>`] wraps a node with the entity it filters so that, for
//! example, a comment predicate cannot be passed where a user predicate is
//! expected.
//!
//! # Example
//!
//! ```no_run
//! use relq::entity::{comment, user};
//! use relq::predicate::{and, not, or};
//!
//! let p = and([
//!     user::id_eq(5),
//!     user::has_comments_with([comment::comment_has_prefix("hello")]),
//!     not(or([user::name_eq("a8m"), user::age_lt(18)])),
//! ]);
//! ```

pub mod column;
pub mod comparator;

pub use column::{Column, EntityColumn, FieldValue};
pub use comparator::{Comparator, Op};

use crate::query::BuildError;
use crate::relation::EdgeStep;
use crate::schema::Entity;
use std::fmt;
use std::marker::PhantomData;

/// Untyped predicate tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Single field comparison
    Compare(Comparator),
    /// All children hold; an empty group is always true
    And(Vec<Node>),
    /// Any child holds; an empty group is always false
    Or(Vec<Node>),
    Not(Box<Node>),
    /// At least one row is reachable through the step
    HasEdge(EdgeStep),
    /// At least one reachable row satisfies every child
    HasEdgeWith(EdgeStep, Vec<Node>),
}

impl Node {
    /// Negate, collapsing a double negation
    pub fn negate(self) -> Node {
        match self {
            Node::Not(inner) => *inner,
            other => Node::Not(Box::new(other)),
        }
    }
}

/// A predicate over rows of entity `E`
pub struct Predicate<E> {
    node: Node,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for Predicate<E> {
    fn clone(&self) -> Self {
        Self::from_node(self.node.clone())
    }
}

impl<E> fmt::Debug for Predicate<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Predicate").field(&self.node).finish()
    }
}

impl<E> PartialEq for Predicate<E> {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node
    }
}

impl<E> Predicate<E> {
    /// Wrap an untyped node.
    ///
    /// The node is not checked against `E` here; the selector rejects
    /// comparators on other tables with `FieldOutOfScope` when it is applied.
    pub fn from_node(node: Node) -> Self {
        Self {
            node,
            _entity: PhantomData,
        }
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    pub fn into_node(self) -> Node {
        self.node
    }

    /// `self AND other`
    pub fn and(self, other: Predicate<E>) -> Predicate<E> {
        and([self, other])
    }

    /// `self OR other`
    pub fn or(self, other: Predicate<E>) -> Predicate<E> {
        or([self, other])
    }
}

impl<E: Entity> Predicate<E> {
    /// Wrap a comparator built at runtime, e.g. through
    /// [`Schema::comparator`](crate::schema::Schema::comparator).
    ///
    /// # Errors
    ///
    /// `FieldOutOfScope` if the comparator's field is not a column of `E`.
    pub fn compare(comparator: Comparator) -> Result<Self, BuildError> {
        let field = comparator.field();
        if field.table != E::TABLE {
            return Err(BuildError::FieldOutOfScope {
                scope: E::TABLE.to_string(),
                table: field.table,
                field: field.name,
            });
        }
        Ok(Self::from(comparator))
    }
}

impl<E> From<Comparator> for Predicate<E> {
    fn from(comparator: Comparator) -> Self {
        Self::from_node(Node::Compare(comparator))
    }
}

impl<E> std::ops::Not for Predicate<E> {
    type Output = Predicate<E>;

    fn not(self) -> Predicate<E> {
        not(self)
    }
}

/// All predicates hold. `and([])` is always true.
pub fn and<E, I>(preds: I) -> Predicate<E>
where
    I: IntoIterator<Item = Predicate<E>>,
{
    Predicate::from_node(Node::And(preds.into_iter().map(Predicate::into_node).collect()))
}

/// Any predicate holds, checked in the given order. `or([])` is always false.
pub fn or<E, I>(preds: I) -> Predicate<E>
where
    I: IntoIterator<Item = Predicate<E>>,
{
    Predicate::from_node(Node::Or(preds.into_iter().map(Predicate::into_node).collect()))
}

/// Negation. `not(not(p))` is `p`.
pub fn not<E>(pred: Predicate<E>) -> Predicate<E> {
    Predicate::from_node(pred.into_node().negate())
}

/// At least one row is reachable from `S` through `step`
pub fn has_edge<S>(step: EdgeStep) -> Predicate<S> {
    Predicate::from_node(Node::HasEdge(step))
}

/// At least one row of `T` reachable from `S` through `step` satisfies every
/// predicate in `preds`
pub fn has_edge_with<S, T, I>(step: EdgeStep, preds: I) -> Predicate<S>
where
    I: IntoIterator<Item = Predicate<T>>,
{
    Predicate::from_node(Node::HasEdgeWith(
        step,
        preds.into_iter().map(Predicate::into_node).collect(),
    ))
}
