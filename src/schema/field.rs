//! Field descriptors for the schema registry.
//!
//! A [`Field`] identifies one column of one entity together with its declared
//! type. It is a plain `Copy` value so that generated entity modules can
//! declare their columns as constants. A [`FieldDescriptor`] wraps a field
//! with the runtime metadata the registry owns: default value, validators and
//! the foreign key the column references, if any.

use crate::query::BuildError;
use sea_query::Value;
use std::fmt;
use std::sync::Arc;

/// Declared storage type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// Boolean column
    Bool,
    /// 32-bit integer column (`INTEGER`)
    Int,
    /// 64-bit integer column (`BIGINT`)
    BigInt,
    /// Double precision column
    Float,
    /// Text column (`TEXT` / `VARCHAR`)
    Text,
    /// Binary column (`BYTEA`)
    Bytes,
}

impl FieldType {
    /// Normalize `value` to the variant this type binds as.
    ///
    /// Integers of any width are narrowed or widened to the column's width
    /// and floats become `f64`. Returns `None` when the variant does not
    /// belong to this type or an integer does not fit the column. Nulls keep
    /// their null-ness and are rejected separately where not allowed.
    pub fn coerce(self, value: &Value) -> Option<Value> {
        match self {
            FieldType::Bool => matches!(value, Value::Bool(_)).then(|| value.clone()),
            FieldType::Int => {
                let wide = int_content(value)?;
                match wide {
                    None => Some(Value::Int(None)),
                    Some(v) => i32::try_from(v).ok().map(|v| Value::Int(Some(v))),
                }
            }
            FieldType::BigInt => {
                let wide = int_content(value)?;
                match wide {
                    None => Some(Value::BigInt(None)),
                    Some(v) => i64::try_from(v).ok().map(|v| Value::BigInt(Some(v))),
                }
            }
            FieldType::Float => match value {
                Value::Float(v) => Some(Value::Double(v.map(f64::from))),
                Value::Double(_) => Some(value.clone()),
                _ => None,
            },
            FieldType::Text => match value {
                Value::String(_) => Some(value.clone()),
                Value::Char(Some(c)) => Some(Value::from(c.to_string())),
                Value::Char(None) => Some(Value::String(None)),
                _ => None,
            },
            FieldType::Bytes => matches!(value, Value::Bytes(_)).then(|| value.clone()),
        }
    }

    /// Whether [`FieldType::coerce`] succeeds for `value`
    pub fn accepts(self, value: &Value) -> bool {
        self.coerce(value).is_some()
    }

    /// String operators (`LIKE` family, case folding) are only valid on text.
    pub fn is_text(self) -> bool {
        self == FieldType::Text
    }

    /// Coerce `value` for `field`, or report why it cannot be bound
    pub(crate) fn coerce_for(self, field: &Field, value: &Value) -> Result<Value, BuildError> {
        self.coerce(value).ok_or_else(|| {
            let found = match value_type_name(value) {
                "int" if int_content(value).is_some() && self.is_integer() => "out-of-range int",
                name => name,
            };
            BuildError::TypeMismatch {
                table: field.table,
                field: field.name,
                expected: self,
                found,
            }
        })
    }

    fn is_integer(self) -> bool {
        matches!(self, FieldType::Int | FieldType::BigInt)
    }
}

/// Integer content widened to `i128`; the outer `None` means "not an integer"
fn int_content(value: &Value) -> Option<Option<i128>> {
    let wide = match value {
        Value::TinyInt(v) => v.map(i128::from),
        Value::SmallInt(v) => v.map(i128::from),
        Value::Int(v) => v.map(i128::from),
        Value::BigInt(v) => v.map(i128::from),
        Value::TinyUnsigned(v) => v.map(i128::from),
        Value::SmallUnsigned(v) => v.map(i128::from),
        Value::Unsigned(v) => v.map(i128::from),
        Value::BigUnsigned(v) => v.map(i128::from),
        _ => return None,
    };
    Some(wide)
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::Bool => "bool",
            FieldType::Int => "int",
            FieldType::BigInt => "bigint",
            FieldType::Float => "float",
            FieldType::Text => "text",
            FieldType::Bytes => "bytes",
        };
        f.write_str(name)
    }
}

/// Short type name of a value, used in mismatch errors
pub fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Bool(_) => "bool",
        Value::TinyInt(_)
        | Value::SmallInt(_)
        | Value::Int(_)
        | Value::BigInt(_)
        | Value::TinyUnsigned(_)
        | Value::SmallUnsigned(_)
        | Value::Unsigned(_)
        | Value::BigUnsigned(_) => "int",
        Value::Float(_) | Value::Double(_) => "float",
        Value::String(_) | Value::Char(_) => "text",
        Value::Bytes(_) => "bytes",
        _ => "unsupported",
    }
}

/// Whether the value is a typed SQL `NULL`
pub fn is_null_value(value: &Value) -> bool {
    matches!(
        value,
        Value::Bool(None)
            | Value::TinyInt(None)
            | Value::SmallInt(None)
            | Value::Int(None)
            | Value::BigInt(None)
            | Value::TinyUnsigned(None)
            | Value::SmallUnsigned(None)
            | Value::Unsigned(None)
            | Value::BigUnsigned(None)
            | Value::Float(None)
            | Value::Double(None)
            | Value::String(None)
            | Value::Char(None)
            | Value::Bytes(None)
    )
}

/// Integer content of a value, if it is a non-null integer that fits `i64`
pub fn value_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::TinyInt(Some(v)) => Some(i64::from(*v)),
        Value::SmallInt(Some(v)) => Some(i64::from(*v)),
        Value::Int(Some(v)) => Some(i64::from(*v)),
        Value::BigInt(Some(v)) => Some(*v),
        Value::TinyUnsigned(Some(v)) => Some(i64::from(*v)),
        Value::SmallUnsigned(Some(v)) => Some(i64::from(*v)),
        Value::Unsigned(Some(v)) => Some(i64::from(*v)),
        Value::BigUnsigned(Some(v)) => i64::try_from(*v).ok(),
        _ => None,
    }
}

/// Text content of a value, if it is a non-null string or char
pub fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(Some(s)) => Some(s.to_string()),
        Value::Char(Some(c)) => Some(c.to_string()),
        _ => None,
    }
}

/// A column of an entity: `(table, name, declared type)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Field {
    /// Table the column belongs to
    pub table: &'static str,
    /// Column name
    pub name: &'static str,
    /// Declared type
    pub field_type: FieldType,
    /// Whether the column accepts `NULL`
    pub nullable: bool,
}

impl Field {
    /// Declare a non-nullable field
    pub const fn new(table: &'static str, name: &'static str, field_type: FieldType) -> Self {
        Self {
            table,
            name,
            field_type,
            nullable: false,
        }
    }

    /// Mark the field as nullable
    pub const fn nullable(self) -> Self {
        Self {
            nullable: true,
            ..self
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.name)
    }
}

/// Validator run against a value before it is written to a field
pub type Validator = Arc<dyn Fn(&Value) -> Result<(), String> + Send + Sync>;

/// Column referenced by a foreign key field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ForeignKey {
    /// Referenced table
    pub table: &'static str,
    /// Referenced column
    pub column: &'static str,
}

/// Registry entry for one field
#[derive(Clone)]
pub struct FieldDescriptor {
    /// The field itself
    pub field: Field,
    /// Value used on insert when none is set
    pub default: Option<Value>,
    /// Validators run on insert and update
    pub validators: Vec<Validator>,
    /// Foreign key target when the column references another table
    pub references: Option<ForeignKey>,
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("field", &self.field)
            .field("default", &self.default)
            .field("validators", &self.validators.len())
            .field("references", &self.references)
            .finish()
    }
}

impl FieldDescriptor {
    pub fn new(field: Field) -> Self {
        Self {
            field,
            default: None,
            validators: Vec::new(),
            references: None,
        }
    }

    /// Set the default value used when an insert leaves the field unset
    pub fn default_value<V: Into<Value>>(mut self, value: V) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Add a validator
    pub fn validate<F>(mut self, validator: F) -> Self
    where
        F: Fn(&Value) -> Result<(), String> + Send + Sync + 'static,
    {
        self.validators.push(Arc::new(validator));
        self
    }

    /// Declare this field as a foreign key to `table.column`
    pub fn references(mut self, table: &'static str, column: &'static str) -> Self {
        self.references = Some(ForeignKey { table, column });
        self
    }

    pub fn name(&self) -> &'static str {
        self.field.name
    }

    /// Whether this field references exactly `table.column`
    pub fn references_column(&self, table: &str, column: &str) -> bool {
        self.references
            .map(|fk| fk.table == table && fk.column == column)
            .unwrap_or(false)
    }

    /// Check a value about to be written to this field and return it in
    /// the width the column binds as.
    ///
    /// Covers type compatibility, nullability and every registered validator,
    /// in that order.
    pub fn check_value(&self, value: &Value) -> Result<Value, BuildError> {
        let value = self.field.field_type.coerce_for(&self.field, value)?;
        if is_null_value(&value) {
            if self.field.nullable {
                return Ok(value);
            }
            return Err(BuildError::ValidationFailed {
                table: self.field.table,
                field: self.field.name,
                reason: "value must not be null".to_string(),
            });
        }
        for validator in &self.validators {
            validator(&value).map_err(|reason| BuildError::ValidationFailed {
                table: self.field.table,
                field: self.field.name,
                reason,
            })?;
        }
        Ok(value)
    }
}

/// Stock validators used by the generated entities
pub mod validators {
    use super::{value_as_i64, value_as_text};
    use sea_query::Value;

    /// Integer must be strictly positive
    pub fn positive(value: &Value) -> Result<(), String> {
        match value_as_i64(value) {
            Some(v) if v > 0 => Ok(()),
            Some(v) => Err(format!("value {v} is not positive")),
            None => Err("value is not an integer".to_string()),
        }
    }

    /// Text must not be empty
    pub fn not_empty(value: &Value) -> Result<(), String> {
        match value_as_text(value) {
            Some(s) if !s.is_empty() => Ok(()),
            Some(_) => Err("value is empty".to_string()),
            None => Err("value is not text".to_string()),
        }
    }

    /// Text must be at most `max` characters
    pub fn max_len(max: usize) -> impl Fn(&Value) -> Result<(), String> + Send + Sync + 'static {
        move |value| match value_as_text(value) {
            Some(s) if s.chars().count() <= max => Ok(()),
            Some(s) => Err(format!("value has {} characters, limit is {max}", s.chars().count())),
            None => Err("value is not text".to_string()),
        }
    }
}
