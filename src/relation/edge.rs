//! Typed edges between entities.

use super::EdgeStep;
use crate::predicate::{self, Predicate};
use crate::query::Query;
use crate::schema::Entity;
use std::marker::PhantomData;

/// An edge from entity `S` to entity `T`
pub struct Edge<S, T> {
    step: EdgeStep,
    _marker: PhantomData<fn() -> (S, T)>,
}

impl<S, T> Clone for Edge<S, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S, T> Copy for Edge<S, T> {}

impl<S, T> std::fmt::Debug for Edge<S, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Edge").field(&self.step).finish()
    }
}

impl<S, T> Edge<S, T> {
    pub const fn new(step: EdgeStep) -> Self {
        Self {
            step,
            _marker: PhantomData,
        }
    }

    pub const fn step(&self) -> &EdgeStep {
        &self.step
    }

    /// The same edge walked from `T` back to `S`
    pub fn inverse(&self) -> Edge<T, S> {
        Edge::new(self.step.rev())
    }

    /// At least one `T` is linked to the `S` row
    pub fn exists(&self) -> Predicate<S> {
        predicate::has_edge(self.step)
    }

    /// At least one linked `T` satisfies every predicate in `preds`
    pub fn exists_with<I>(&self, preds: I) -> Predicate<S>
    where
        I: IntoIterator<Item = Predicate<T>>,
    {
        predicate::has_edge_with(self.step, preds)
    }
}

impl<S, T: Entity> Edge<S, T> {
    /// Query the `T` rows linked to any `S` row matching `source`.
    ///
    /// This is the edge walked backwards: the comments of user 5 are the
    /// comments whose user has id 5.
    pub fn query_from<I>(&self, source: I) -> Query<T>
    where
        I: IntoIterator<Item = Predicate<S>>,
    {
        Query::new().filter(self.inverse().exists_with(source))
    }
}
