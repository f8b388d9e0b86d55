//! # relq
//!
//! Typed predicate algebra, edge traversal and transactional execution over
//! PostgreSQL for the `may` coroutine runtime.
//!
//! - [`predicate`]: composable `AND` / `OR` / `NOT` filters over typed fields;
//!   every operand is a bound parameter
//! - [`relation`]: edges between entities, lowered to joins plus existence tests
//! - [`query`]: the per-query [`Selector`](query::Selector) and typed builders
//!   that lower predicates to `(sql, params)`
//! - [`transaction`]: [`run_in_transaction`] with exactly one commit or rollback
//!   per unit of work
//! - [`schema`] and [`entity`]: the schema registry and the generated
//!   users/comments entities
//!
//! ```no_run
//! use relq::entity::{comment, user, User};
//! use relq::predicate::and;
//! use relq::query::Query;
//!
//! let (sql, params) = Query::<User>::new()
//!     .filter(and([
//!         user::id_eq(5),
//!         user::has_comments_with([comment::comment_has_prefix("hello")]),
//!     ]))
//!     .to_sql()?;
//! # Ok::<(), relq::query::BuildError>(())
//! ```

pub mod config;
pub mod connection;
pub mod entity;
pub mod executor;
pub mod metrics;
pub mod predicate;
pub mod query;
pub mod relation;
pub mod schema;
pub mod transaction;

pub use config::DatabaseConfig;
pub use connection::{connect, ConnectionError};
pub use executor::{ExecError, Executor, MayPostgresExecutor, TransactionalConnection};
pub use predicate::{and, not, or, Predicate};
pub use query::{BuildError, Order, Query, Selector};
pub use schema::{Entity, Schema};
pub use transaction::{
    run_in_transaction, run_in_transaction_with, IsolationLevel, RunError, Transaction,
    TransactionError, TransactionState,
};
