//! Typed columns for type-safe predicate building.
//!
//! A [`Column<E, T>`] ties a schema [`Field`] to its entity `E` and its Rust
//! value type `T`. The comparison methods only accept values convertible to
//! `T`, so an operand of the wrong type is a compile error rather than a
//! `TypeMismatch` at runtime. String operators only exist on `Column<E, String>`.
//!
//! # Example
//!
//! ```no_run
//! use relq::entity::user;
//!
//! // Type-safe: AGE.gt() accepts i32
//! let adults = user::AGE.gt(17);
//!
//! // Type-safe: NAME.has_prefix() only exists on text columns
//! let a_names = user::NAME.has_prefix("a");
//! ```

use super::{Comparator, Op, Predicate};
use crate::query::BuildError;
use crate::schema::{Field, FieldType};
use sea_query::Value;
use std::marker::PhantomData;

/// Rust types that map onto a schema [`FieldType`]
pub trait FieldValue: Into<Value> {
    const FIELD_TYPE: FieldType;
}

impl FieldValue for bool {
    const FIELD_TYPE: FieldType = FieldType::Bool;
}

impl FieldValue for i32 {
    const FIELD_TYPE: FieldType = FieldType::Int;
}

impl FieldValue for i64 {
    const FIELD_TYPE: FieldType = FieldType::BigInt;
}

impl FieldValue for f64 {
    const FIELD_TYPE: FieldType = FieldType::Float;
}

impl FieldValue for String {
    const FIELD_TYPE: FieldType = FieldType::Text;
}

impl FieldValue for Vec<u8> {
    const FIELD_TYPE: FieldType = FieldType::Bytes;
}

/// Any column of entity `E`, whatever its value type.
///
/// Used where columns of different types are mixed, such as projections and
/// sort keys.
pub trait EntityColumn<E> {
    fn entity_field(&self) -> Field;
}

impl<E, T> EntityColumn<E> for Column<E, T> {
    fn entity_field(&self) -> Field {
        self.field
    }
}

/// A column of entity `E` holding values of type `T`
pub struct Column<E, T> {
    field: Field,
    _marker: PhantomData<fn() -> (E, T)>,
}

impl<E, T> Clone for Column<E, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E, T> Copy for Column<E, T> {}

impl<E, T> std::fmt::Debug for Column<E, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Column").field(&self.field).finish()
    }
}

impl<E, T> Column<E, T> {
    pub const fn new(field: Field) -> Self {
        Self {
            field,
            _marker: PhantomData,
        }
    }

    pub const fn field(&self) -> Field {
        self.field
    }

    pub fn name(&self) -> &'static str {
        self.field.name
    }

    /// `column IS NULL`
    pub fn is_null(&self) -> Predicate<E> {
        self.compare(Op::IsNull, Vec::new())
    }

    /// `column IS NOT NULL`
    pub fn is_not_null(&self) -> Predicate<E> {
        self.compare(Op::NotNull, Vec::new())
    }

    fn compare(&self, op: Op, operands: Vec<Value>) -> Predicate<E> {
        Predicate::from(Comparator::unchecked(self.field, op, operands))
    }
}

impl<E, T: FieldValue> Column<E, T> {
    fn single<V: Into<T>>(&self, op: Op, value: V) -> Predicate<E> {
        let value: T = value.into();
        self.compare(op, vec![value.into()])
    }

    fn set<V, I>(&self, op: Op, values: I) -> Result<Predicate<E>, BuildError>
    where
        V: Into<T>,
        I: IntoIterator<Item = V>,
    {
        let operands: Vec<Value> = values
            .into_iter()
            .map(|v| {
                let v: T = v.into();
                v.into()
            })
            .collect();
        Comparator::new(self.field, op, operands).map(Predicate::from)
    }

    /// `column = value`
    pub fn eq<V: Into<T>>(&self, value: V) -> Predicate<E> {
        self.single(Op::Eq, value)
    }

    /// `column <> value`
    pub fn ne<V: Into<T>>(&self, value: V) -> Predicate<E> {
        self.single(Op::Neq, value)
    }

    pub fn gt<V: Into<T>>(&self, value: V) -> Predicate<E> {
        self.single(Op::Gt, value)
    }

    pub fn gte<V: Into<T>>(&self, value: V) -> Predicate<E> {
        self.single(Op::Gte, value)
    }

    pub fn lt<V: Into<T>>(&self, value: V) -> Predicate<E> {
        self.single(Op::Lt, value)
    }

    pub fn lte<V: Into<T>>(&self, value: V) -> Predicate<E> {
        self.single(Op::Lte, value)
    }

    /// `column IN (values)`
    ///
    /// # Errors
    ///
    /// `EmptyOperandSet` when `values` is empty.
    #[allow(clippy::wrong_self_convention)]
    pub fn is_in<V, I>(&self, values: I) -> Result<Predicate<E>, BuildError>
    where
        V: Into<T>,
        I: IntoIterator<Item = V>,
    {
        self.set(Op::In, values)
    }

    /// `column NOT IN (values)`
    ///
    /// # Errors
    ///
    /// `EmptyOperandSet` when `values` is empty.
    #[allow(clippy::wrong_self_convention)]
    pub fn is_not_in<V, I>(&self, values: I) -> Result<Predicate<E>, BuildError>
    where
        V: Into<T>,
        I: IntoIterator<Item = V>,
    {
        self.set(Op::NotIn, values)
    }
}

impl<E> Column<E, String> {
    /// `column LIKE '%value%'`
    pub fn contains<V: Into<String>>(&self, value: V) -> Predicate<E> {
        self.single(Op::Contains, value.into())
    }

    /// `column LIKE 'value%'`
    pub fn has_prefix<V: Into<String>>(&self, value: V) -> Predicate<E> {
        self.single(Op::HasPrefix, value.into())
    }

    /// `column LIKE '%value'`
    pub fn has_suffix<V: Into<String>>(&self, value: V) -> Predicate<E> {
        self.single(Op::HasSuffix, value.into())
    }

    /// `LOWER(column) = LOWER(value)`
    pub fn equal_fold<V: Into<String>>(&self, value: V) -> Predicate<E> {
        self.single(Op::EqualFold, value.into())
    }

    /// `LOWER(column) LIKE LOWER('%value%')`
    pub fn contains_fold<V: Into<String>>(&self, value: V) -> Predicate<E> {
        self.single(Op::ContainsFold, value.into())
    }
}
