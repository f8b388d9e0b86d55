//! Insert, update and delete statements.
//!
//! Mutations go through the schema registry: inserts fill declared defaults
//! for unset fields, and every written value is checked against its field's
//! type, nullability and validators before any SQL is produced. Update and
//! delete filters reuse the predicate machinery of [`Selector`].
//!
//! # Example
//!
//! ```no_run
//! use relq::entity::{self, user, User};
//!
//! let schema = entity::schema();
//! let (sql, params) = schema
//!     .insert::<User>()
//!     .set(user::AGE, 30)
//!     .set(user::NAME, "a8m")
//!     .to_sql()?;
//! # Ok::<(), relq::query::BuildError>(())
//! ```

use super::clause::ident;
use super::{BuildError, Selector};
use crate::executor::{ExecError, Executor};
use crate::predicate::{Column, FieldValue, Predicate};
use crate::schema::{Entity, EntityDescriptor, FieldDescriptor, Schema};
use sea_query::{Expr, PostgresQueryBuilder, Query, Value, Values};
use std::marker::PhantomData;

/// Pending `column = value` assignments, last write wins
#[derive(Debug, Clone, Default)]
struct Assignments(Vec<(String, Value)>);

impl Assignments {
    fn set(&mut self, name: &str, value: Value) {
        match self.0.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name.to_string(), value)),
        }
    }

    fn get(&self, name: &str) -> Option<&Value> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Resolve every assignment to its field, checking the value and
    /// bringing it to the column's width
    fn resolve<'e>(
        &self,
        entity: &'e EntityDescriptor,
    ) -> Result<Vec<(&'e FieldDescriptor, Value)>, BuildError> {
        self.0
            .iter()
            .map(|(name, value)| {
                let descriptor = entity.find_field(name).ok_or_else(|| BuildError::UnknownField {
                    table: entity.table.to_string(),
                    field: name.clone(),
                })?;
                Ok((descriptor, descriptor.check_value(value)?))
            })
            .collect()
    }
}

fn typed<T: FieldValue, V: Into<T>>(value: V) -> Value {
    let value: T = value.into();
    value.into()
}

/// `INSERT INTO ... RETURNING pk`
pub struct Insert<'s, E> {
    schema: &'s Schema,
    values: Assignments,
    _entity: PhantomData<fn() -> E>,
}

impl<'s, E: Entity> Insert<'s, E> {
    pub fn new(schema: &'s Schema) -> Self {
        Self {
            schema,
            values: Assignments::default(),
            _entity: PhantomData,
        }
    }

    pub fn set<T: FieldValue, V: Into<T>>(mut self, column: Column<E, T>, value: V) -> Self {
        self.values.set(column.name(), typed::<T, V>(value));
        self
    }

    /// Set a field by name; the value is checked when the statement is lowered
    pub fn set_value(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.values.set(field, value.into());
        self
    }

    /// Lower to SQL.
    ///
    /// Columns are written in declaration order. Unset fields take their
    /// declared default; unset nullable fields and the primary key are left
    /// to the database.
    ///
    /// # Errors
    ///
    /// `UnknownField`, `TypeMismatch`, `ValidationFailed` for bad values and
    /// `MissingValue` for a required field with neither value nor default.
    pub fn to_sql(&self) -> Result<(String, Values), BuildError> {
        let entity = self.schema.lookup(E::TABLE)?;
        self.values.resolve(entity)?;

        let mut columns = Vec::new();
        for descriptor in entity.fields() {
            let field = descriptor.field;
            let value = self
                .values
                .get(field.name)
                .cloned()
                .or_else(|| descriptor.default.clone());
            match value {
                Some(value) => columns.push((field.name, descriptor.check_value(&value)?)),
                None if field.nullable || field.name == entity.primary_key => {}
                None => {
                    return Err(BuildError::MissingValue {
                        table: field.table,
                        field: field.name,
                    })
                }
            }
        }

        let mut insert = Query::insert();
        insert.into_table(ident(entity.table));
        if columns.is_empty() {
            insert.or_default_values();
        } else {
            let (names, values): (Vec<_>, Vec<_>) = columns.into_iter().unzip();
            insert.columns(names.into_iter().map(ident));
            insert
                .values(values.into_iter().map(Expr::val))
                .map_err(|err| BuildError::InvalidStatement {
                    table: entity.table,
                    reason: err.to_string(),
                })?;
        }
        insert.returning_col(ident(entity.primary_key));
        Ok(insert.build(PostgresQueryBuilder))
    }

    /// Insert the row and return what `RETURNING` produced
    pub fn save<X: Executor>(&self, executor: &X) -> Result<Vec<X::Row>, ExecError> {
        let (sql, values) = self.to_sql()?;
        executor.query_all(&sql, &values)
    }
}

/// `UPDATE ... SET ... WHERE ...`
pub struct Update<'s, E> {
    schema: &'s Schema,
    predicates: Vec<Predicate<E>>,
    values: Assignments,
}

impl<'s, E: Entity> Update<'s, E> {
    pub fn new(schema: &'s Schema) -> Self {
        Self {
            schema,
            predicates: Vec::new(),
            values: Assignments::default(),
        }
    }

    pub fn filter(mut self, predicate: Predicate<E>) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn set<T: FieldValue, V: Into<T>>(mut self, column: Column<E, T>, value: V) -> Self {
        self.values.set(column.name(), typed::<T, V>(value));
        self
    }

    pub fn set_value(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.values.set(field, value.into());
        self
    }

    /// Lower to SQL. `SET` parameters come before filter parameters.
    ///
    /// # Errors
    ///
    /// `EmptyUpdate` without assignments, plus value and predicate errors.
    pub fn to_sql(&self) -> Result<(String, Values), BuildError> {
        let entity = self.schema.lookup(E::TABLE)?;
        let assignments = self.values.resolve(entity)?;
        if assignments.is_empty() {
            return Err(BuildError::EmptyUpdate {
                table: entity.table,
            });
        }

        let mut update = Query::update();
        update.table(ident(entity.table));
        for (descriptor, value) in assignments {
            update.value(ident(descriptor.name()), value);
        }
        if let Some(condition) = filtered::<E>(&self.predicates)?.lower_filter()? {
            update.cond_where(condition);
        }
        Ok(update.build(PostgresQueryBuilder))
    }

    /// Run the update and return the number of affected rows
    pub fn exec<X: Executor>(&self, executor: &X) -> Result<u64, ExecError> {
        let (sql, values) = self.to_sql()?;
        executor.execute(&sql, &values)
    }
}

/// `DELETE FROM ... WHERE ...`; without a filter every row is deleted
pub struct Delete<E> {
    predicates: Vec<Predicate<E>>,
}

impl<E: Entity> Default for Delete<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> Delete<E> {
    pub fn new() -> Self {
        Self {
            predicates: Vec::new(),
        }
    }

    pub fn filter(mut self, predicate: Predicate<E>) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn to_sql(&self) -> Result<(String, Values), BuildError> {
        let mut delete = Query::delete();
        delete.from_table(ident(E::TABLE));
        if let Some(condition) = filtered::<E>(&self.predicates)?.lower_filter()? {
            delete.cond_where(condition);
        }
        Ok(delete.build(PostgresQueryBuilder))
    }

    /// Run the delete and return the number of affected rows
    pub fn exec<X: Executor>(&self, executor: &X) -> Result<u64, ExecError> {
        let (sql, values) = self.to_sql()?;
        executor.execute(&sql, &values)
    }
}

fn filtered<E: Entity>(predicates: &[Predicate<E>]) -> Result<Selector, BuildError> {
    let mut selector = Selector::for_entity::<E>();
    for predicate in predicates {
        selector.apply(predicate)?;
    }
    Ok(selector)
}

impl Schema {
    /// Start an insert of `E`
    pub fn insert<E: Entity>(&self) -> Insert<'_, E> {
        Insert::new(self)
    }

    /// Start an update of `E`
    pub fn update<E: Entity>(&self) -> Update<'_, E> {
        Update::new(self)
    }

    /// Start a delete of `E`
    pub fn delete<E: Entity>(&self) -> Delete<E> {
        Delete::new()
    }
}
