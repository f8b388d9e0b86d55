//! Value conversion from SeaQuery to may_postgres.
//!
//! Lowered statements carry their parameters as `sea_query::Value`s. Before
//! execution each value is copied into an owned [`Param`] whose variant fixes
//! the PostgreSQL type it binds as, and the statement runs against references
//! to those params. Typed nulls keep their type (`Option<String>` for a text
//! null, and so on) so the server can infer the parameter type.

use crate::executor::ExecError;
use may_postgres::types::ToSql;
use sea_query::{Value, Values};

/// Owned, typed statement parameter
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Bool(Option<bool>),
    Int(Option<i32>),
    BigInt(Option<i64>),
    Float(Option<f32>),
    Double(Option<f64>),
    Text(Option<String>),
    Bytes(Option<Vec<u8>>),
}

impl Param {
    pub fn as_to_sql(&self) -> &dyn ToSql {
        match self {
            Param::Bool(v) => v,
            Param::Int(v) => v,
            Param::BigInt(v) => v,
            Param::Float(v) => v,
            Param::Double(v) => v,
            Param::Text(v) => v,
            Param::Bytes(v) => v,
        }
    }
}

impl TryFrom<&Value> for Param {
    type Error = ExecError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        let param = match value {
            Value::Bool(v) => Param::Bool(*v),
            Value::TinyInt(v) => Param::Int(v.map(i32::from)),
            Value::SmallInt(v) => Param::Int(v.map(i32::from)),
            Value::Int(v) => Param::Int(*v),
            Value::BigInt(v) => Param::BigInt(*v),
            Value::TinyUnsigned(v) => Param::Int(v.map(i32::from)),
            Value::SmallUnsigned(v) => Param::Int(v.map(i32::from)),
            Value::Unsigned(v) => Param::BigInt(v.map(i64::from)),
            Value::BigUnsigned(Some(u)) => Param::BigInt(Some(i64::try_from(*u).map_err(|_| {
                ExecError::QueryError(format!(
                    "BigUnsigned value {u} exceeds i64::MAX, cannot be bound as BIGINT"
                ))
            })?)),
            Value::BigUnsigned(None) => Param::BigInt(None),
            Value::Float(v) => Param::Float(*v),
            Value::Double(v) => Param::Double(*v),
            Value::String(v) => Param::Text(v.as_ref().map(|s| s.to_string())),
            Value::Char(v) => Param::Text(v.map(String::from)),
            Value::Bytes(v) => Param::Bytes(v.as_ref().map(|b| b.to_vec())),
            other => {
                return Err(ExecError::QueryError(format!(
                    "Unsupported value type in query: {other:?}"
                )))
            }
        };
        Ok(param)
    }
}

/// Convert every value of a statement
pub fn convert_values(values: &Values) -> Result<Vec<Param>, ExecError> {
    values.0.iter().map(Param::try_from).collect()
}

/// Convert SeaQuery values and run `f` with the bound parameters.
///
/// # Errors
///
/// Returns `ExecError::QueryError` if a value has no PostgreSQL mapping,
/// otherwise whatever `f` returns.
pub fn with_converted_params<F, R>(values: &Values, f: F) -> Result<R, ExecError>
where
    F: FnOnce(&[&dyn ToSql]) -> Result<R, ExecError>,
{
    let params = convert_values(values)?;
    let refs: Vec<&dyn ToSql> = params.iter().map(Param::as_to_sql).collect();
    f(&refs)
}
