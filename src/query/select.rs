//! Typed select query builder.
//!
//! [`Query<E>`] collects predicates and options for entity `E` without
//! touching a selector. Every lowering builds a fresh [`Selector`], so a
//! query can be lowered, cloned and executed any number of times.

use super::{BuildError, Order, Selector};
use crate::executor::{ExecError, Executor};
use crate::predicate::{EntityColumn, Predicate};
use crate::schema::Entity;
use sea_query::Values;
use std::marker::PhantomData;

/// Query builder for selecting rows of `E`
///
/// # Example
///
/// ```no_run
/// use relq::entity::{comment, user, User};
/// use relq::query::{Order, Query};
///
/// // Users with a comment starting with "hello", by name, first ten
/// let query = Query::<User>::new()
///     .filter(user::has_comments_with([comment::comment_has_prefix("hello")]))
///     .order_by(user::NAME, Order::Asc)
///     .limit(10);
/// let (sql, params) = query.to_sql()?;
/// # Ok::<(), relq::query::BuildError>(())
/// ```
pub struct Query<E> {
    predicates: Vec<Predicate<E>>,
    columns: Vec<&'static str>,
    order: Vec<(&'static str, Order)>,
    limit: Option<u64>,
    offset: Option<u64>,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for Query<E> {
    fn clone(&self) -> Self {
        Self {
            predicates: self.predicates.clone(),
            columns: self.columns.clone(),
            order: self.order.clone(),
            limit: self.limit,
            offset: self.offset,
            _entity: PhantomData,
        }
    }
}

impl<E> std::fmt::Debug for Query<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Query")
            .field("predicates", &self.predicates)
            .field("columns", &self.columns)
            .field("order", &self.order)
            .field("limit", &self.limit)
            .field("offset", &self.offset)
            .finish()
    }
}

impl<E: Entity> Default for Query<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> Query<E> {
    pub fn new() -> Self {
        Self {
            predicates: Vec::new(),
            columns: Vec::new(),
            order: Vec::new(),
            limit: None,
            offset: None,
            _entity: PhantomData,
        }
    }

    /// Add a filter; filters are `AND`ed
    pub fn filter(mut self, predicate: Predicate<E>) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Add a column to the projection
    pub fn select<C: EntityColumn<E>>(mut self, column: C) -> Self {
        self.columns.push(column.entity_field().name);
        self
    }

    pub fn order_by<C: EntityColumn<E>>(mut self, column: C, order: Order) -> Self {
        self.order.push((column.entity_field().name, order));
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// A fresh selector with everything in this query applied
    pub fn selector(&self) -> Result<Selector, BuildError> {
        let mut selector = Selector::for_entity::<E>();
        selector.columns(self.columns.iter().copied());
        for (column, order) in &self.order {
            selector.order_by(*column, order.clone());
        }
        if let Some(limit) = self.limit {
            selector.limit(limit);
        }
        if let Some(offset) = self.offset {
            selector.offset(offset);
        }
        for predicate in &self.predicates {
            selector.apply(predicate)?;
        }
        Ok(selector)
    }

    pub fn to_sql(&self) -> Result<(String, Values), BuildError> {
        self.selector()?.lower()
    }

    pub fn count_sql(&self) -> Result<(String, Values), BuildError> {
        self.selector()?.lower_count()
    }

    /// Run the query and return the raw rows
    pub fn all<X: Executor>(&self, executor: &X) -> Result<Vec<X::Row>, ExecError> {
        let (sql, values) = self.to_sql()?;
        executor.query_all(&sql, &values)
    }

    /// Whether at least one row matches
    pub fn exists<X: Executor>(&self, executor: &X) -> Result<bool, ExecError> {
        let (sql, values) = self.clone().select_key().limit(1).to_sql()?;
        Ok(!executor.query_all(&sql, &values)?.is_empty())
    }

    fn select_key(mut self) -> Self {
        self.columns = vec![E::PRIMARY_KEY];
        self.order.clear();
        self
    }
}
