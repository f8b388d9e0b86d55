//! Per-query statement builder.
//!
//! A [`Selector`] owns the mutable state of one query: the table it reads,
//! the conditions applied so far, the joins edge predicates registered, and
//! the projection and paging options. Predicates are applied through a
//! visitor that resolves every comparator to a table alias; `AND` / `OR` /
//! `NOT` produce grouped conditions. An edge predicate in positive position
//! registers a deduplicated `LEFT JOIN`; under `NOT`, and inside such a
//! subquery, it becomes a correlated `EXISTS (SELECT 1 ...)` instead. Lowering
//! consumes the state and builds a sea-query statement rendered with `$n`
//! placeholders plus the parameter list.
//!
//! # Example
//!
//! ```no_run
//! use relq::entity::{comment, user, User};
//! use relq::predicate::and;
//! use relq::query::Selector;
//!
//! let mut selector = Selector::for_entity::<User>();
//! selector.apply(&and([
//!     user::id_eq(5),
//!     user::has_comments_with([comment::comment_has_prefix("hello")]),
//! ]))?;
//! let (sql, params) = selector.lower()?;
//! # Ok::<(), relq::query::BuildError>(())
//! ```

use super::clause::{self, column, ident, leaf};
use super::join::JoinRegistry;
use super::BuildError;
use crate::predicate::{Comparator, Node, Predicate};
use crate::relation::EdgeStep;
use crate::schema::Entity;
use sea_query::{
    Asterisk, Condition, Expr, ExprTrait, Func, JoinType, Order, PostgresQueryBuilder, Query,
    SelectStatement, Values,
};

/// How an edge predicate is lowered where it appears
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Positive position in the root statement: shared `LEFT JOIN`
    Join,
    /// Under `NOT` or inside a subquery: correlated `EXISTS`
    Exists,
}

/// Table and alias comparators are currently resolved against
#[derive(Debug, Clone, PartialEq, Eq)]
struct Scope {
    table: &'static str,
    alias: String,
}

/// Mutable state of a single query
#[derive(Debug, Clone)]
pub struct Selector {
    table: &'static str,
    primary_key: &'static str,
    scope: Scope,
    columns: Vec<&'static str>,
    predicates: Vec<Condition>,
    joins: JoinRegistry,
    order: Vec<(&'static str, Order)>,
    limit: Option<u64>,
    offset: Option<u64>,
    lowered: bool,
}

impl Selector {
    /// Selector over `table` with primary key `id`
    pub fn new(table: &'static str) -> Self {
        Self::with_primary_key(table, "id")
    }

    pub fn with_primary_key(table: &'static str, primary_key: &'static str) -> Self {
        Self {
            table,
            primary_key,
            scope: Scope {
                table,
                alias: table.to_string(),
            },
            columns: Vec::new(),
            predicates: Vec::new(),
            joins: JoinRegistry::new(table),
            order: Vec::new(),
            limit: None,
            offset: None,
            lowered: false,
        }
    }

    pub fn for_entity<E: Entity>() -> Self {
        Self::with_primary_key(E::TABLE, E::PRIMARY_KEY)
    }

    /// Point the selector at the table of `E`, discarding everything applied
    /// so far.
    ///
    /// # Errors
    ///
    /// `SelectorAlreadyLowered` once [`Selector::lower`] has run.
    pub fn set_table<E: Entity>(&mut self) -> Result<&mut Self, BuildError> {
        if self.lowered {
            return Err(BuildError::SelectorAlreadyLowered);
        }
        *self = Self::for_entity::<E>();
        Ok(self)
    }

    pub fn primary_key(&self) -> &'static str {
        self.primary_key
    }

    pub fn table(&self) -> &'static str {
        self.table
    }

    pub fn joins(&self) -> &JoinRegistry {
        &self.joins
    }

    pub fn is_lowered(&self) -> bool {
        self.lowered
    }

    /// Restrict the projection; all columns are selected when none are given
    pub fn columns<I>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = &'static str>,
    {
        self.columns.extend(columns);
        self
    }

    pub fn order_by(&mut self, column: &'static str, order: Order) -> &mut Self {
        self.order.push((column, order));
        self
    }

    pub fn limit(&mut self, limit: u64) -> &mut Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(&mut self, offset: u64) -> &mut Self {
        self.offset = Some(offset);
        self
    }

    /// Apply a typed predicate
    ///
    /// # Errors
    ///
    /// See [`Selector::apply_node`].
    pub fn apply<E>(&mut self, predicate: &Predicate<E>) -> Result<&mut Self, BuildError> {
        self.apply_node(predicate.node())
    }

    /// Apply a predicate tree as one more `AND`ed condition.
    ///
    /// Application is all-or-nothing: when it fails, joins and aliases
    /// registered while walking the tree are dropped again.
    ///
    /// # Errors
    ///
    /// - `SelectorAlreadyLowered` once [`Selector::lower`] has run
    /// - `FieldOutOfScope` when a comparator or edge does not start from the
    ///   table it is applied to
    pub fn apply_node(&mut self, node: &Node) -> Result<&mut Self, BuildError> {
        if self.lowered {
            return Err(BuildError::SelectorAlreadyLowered);
        }
        let snapshot = self.joins.clone();
        match self.visit(node, Mode::Join) {
            Ok(condition) => {
                self.predicates.push(condition);
                Ok(self)
            }
            Err(err) => {
                self.joins = snapshot;
                Err(err)
            }
        }
    }

    fn visit(&mut self, node: &Node, mode: Mode) -> Result<Condition, BuildError> {
        match node {
            Node::Compare(comparator) => self.visit_compare(comparator),
            Node::And(children) => Ok(clause::all(self.visit_all(children, mode)?)),
            Node::Or(children) => Ok(clause::any(self.visit_all(children, mode)?)),
            Node::Not(child) => Ok(clause::not(self.visit(child, Mode::Exists)?)),
            Node::HasEdge(step) => self.visit_edge(step, &[], mode),
            Node::HasEdgeWith(step, children) => self.visit_edge(step, children, mode),
        }
    }

    fn visit_all(&mut self, children: &[Node], mode: Mode) -> Result<Vec<Condition>, BuildError> {
        children.iter().map(|child| self.visit(child, mode)).collect()
    }

    /// Visit `children` with comparators resolved against `alias`
    fn visit_scoped(
        &mut self,
        table: &'static str,
        alias: String,
        children: &[Node],
        mode: Mode,
    ) -> Result<Vec<Condition>, BuildError> {
        let outer = std::mem::replace(&mut self.scope, Scope { table, alias });
        let nested = self.visit_all(children, mode);
        self.scope = outer;
        nested
    }

    fn visit_compare(&self, comparator: &Comparator) -> Result<Condition, BuildError> {
        let field = comparator.field();
        if field.table != self.scope.table {
            return Err(BuildError::FieldOutOfScope {
                scope: self.scope.table.to_string(),
                table: field.table,
                field: field.name,
            });
        }
        Ok(clause::compare(
            &self.scope.alias,
            field.name,
            comparator.op(),
            comparator.operands(),
        ))
    }

    fn visit_edge(
        &mut self,
        step: &EdgeStep,
        children: &[Node],
        mode: Mode,
    ) -> Result<Condition, BuildError> {
        if step.from_table() != self.scope.table {
            return Err(BuildError::FieldOutOfScope {
                scope: self.scope.table.to_string(),
                table: step.from_table(),
                field: step.from_field(),
            });
        }
        match mode {
            Mode::Join => {
                let alias = self.joins.register(step, &self.scope.alias);
                let mut conditions = vec![leaf(column(&alias, step.to_field()).is_not_null())];
                conditions.extend(self.visit_scoped(step.to_table(), alias, children, mode)?);
                Ok(clause::all(conditions))
            }
            Mode::Exists => self.visit_exists(step, children),
        }
    }

    /// `EXISTS (SELECT 1 FROM target WHERE target.to = scope.from AND ...)`,
    /// through the join table for many-to-many steps
    fn visit_exists(&mut self, step: &EdgeStep, children: &[Node]) -> Result<Condition, BuildError> {
        let mut subquery = Query::select();
        subquery.expr(Expr::cust("1"));
        let (alias, correlation) = match step.through() {
            None => {
                let alias = self.joins.reserve(step.to_table());
                subquery.from_as(ident(step.to_table()), ident(&alias));
                let correlation = column(&alias, step.to_field())
                    .eq(column(&self.scope.alias, step.from_field()));
                (alias, correlation)
            }
            Some(through) => {
                let bridge = self.joins.reserve(through.table);
                let alias = self.joins.reserve(step.to_table());
                subquery.from_as(ident(through.table), ident(&bridge)).join_as(
                    JoinType::InnerJoin,
                    ident(step.to_table()),
                    ident(&alias),
                    column(&alias, step.to_field()).eq(column(&bridge, through.to_column)),
                );
                let correlation = column(&bridge, through.from_column)
                    .eq(column(&self.scope.alias, step.from_field()));
                (alias, correlation)
            }
        };
        log::trace!("lowering {} edge as EXISTS over {alias}", step.to_table());
        let mut conditions = vec![leaf(correlation)];
        conditions.extend(self.visit_scoped(step.to_table(), alias, children, Mode::Exists)?);
        subquery.cond_where(clause::all(conditions));
        Ok(leaf(Expr::exists(subquery)))
    }

    fn begin_lowering(&mut self) -> Result<(), BuildError> {
        if self.lowered {
            return Err(BuildError::SelectorAlreadyLowered);
        }
        self.lowered = true;
        Ok(())
    }

    /// Lower to `SELECT ...` text and parameters.
    ///
    /// A query with joins selects `DISTINCT` rows so that one-to-many joins
    /// do not repeat the root row. When the projection leaves out a sort
    /// column, `DISTINCT` would be rejected by PostgreSQL, so the joins move
    /// into a primary key subquery instead:
    /// `WHERE "t"."pk" IN (SELECT "t"."pk" FROM "t" LEFT JOIN ... WHERE ...)`.
    ///
    /// # Errors
    ///
    /// `SelectorAlreadyLowered` on the second call.
    pub fn lower(&mut self) -> Result<(String, Values), BuildError> {
        self.begin_lowering()?;
        let mut query = Query::select();
        if self.columns.is_empty() {
            query.column((ident(self.table), Asterisk));
        } else {
            for name in &self.columns {
                query.column((ident(self.table), ident(name)));
            }
        }
        query.from(ident(self.table));
        if self.joins.is_empty() {
            self.filter(&mut query);
        } else if self.order_is_projected() {
            query.distinct();
            self.joins.apply(&mut query);
            self.filter(&mut query);
        } else {
            query.cond_where(self.key_filter());
        }
        for (name, order) in &self.order {
            query.order_by((ident(self.table), ident(name)), order.clone());
        }
        if let Some(limit) = self.limit {
            query.limit(limit);
        }
        if let Some(offset) = self.offset {
            query.offset(offset);
        }
        Ok(query.build(PostgresQueryBuilder))
    }

    /// Lower to a `SELECT COUNT(*)` over the filtered rows.
    ///
    /// Projection, ordering and paging are ignored. With joins the rows are
    /// counted through a primary key subquery, so each root row counts once.
    ///
    /// # Errors
    ///
    /// `SelectorAlreadyLowered` on the second call.
    pub fn lower_count(&mut self) -> Result<(String, Values), BuildError> {
        self.begin_lowering()?;
        let mut query = Query::select();
        query
            .expr(Func::count(Expr::col(Asterisk)))
            .from(ident(self.table));
        if self.joins.is_empty() {
            self.filter(&mut query);
        } else {
            query.cond_where(self.key_filter());
        }
        Ok(query.build(PostgresQueryBuilder))
    }

    /// The filter of a mutation statement, `None` when no predicate was
    /// applied.
    ///
    /// Without joins this is the plain condition. With joins it goes through
    /// the primary key: `"t"."pk" IN (SELECT "t"."pk" FROM ...)`.
    pub(crate) fn lower_filter(&mut self) -> Result<Option<Condition>, BuildError> {
        self.begin_lowering()?;
        if self.predicates.is_empty() {
            return Ok(None);
        }
        if self.joins.is_empty() {
            Ok(Some(clause::all(self.predicates.clone())))
        } else {
            Ok(Some(self.key_filter()))
        }
    }

    /// Whether `DISTINCT` over the projection can be sorted as requested
    fn order_is_projected(&self) -> bool {
        self.columns.is_empty()
            || self
                .order
                .iter()
                .all(|(name, _)| self.columns.contains(name))
    }

    fn filter(&self, query: &mut SelectStatement) {
        if !self.predicates.is_empty() {
            query.cond_where(clause::all(self.predicates.clone()));
        }
    }

    fn key_filter(&self) -> Condition {
        let mut keys = Query::select();
        keys.column((ident(self.table), ident(self.primary_key)))
            .from(ident(self.table));
        self.joins.apply(&mut keys);
        self.filter(&mut keys);
        leaf(column(self.table, self.primary_key).in_subquery(keys))
    }
}
