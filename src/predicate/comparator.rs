//! Comparison primitives over a single field.

use crate::query::BuildError;
use crate::schema::field::is_null_value;
use crate::schema::Field;
use sea_query::Value;
use std::fmt;

/// Comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    NotIn,
    /// Substring match (`LIKE '%x%'`)
    Contains,
    /// `LIKE 'x%'`
    HasPrefix,
    /// `LIKE '%x'`
    HasSuffix,
    /// Case-insensitive equality
    EqualFold,
    /// Case-insensitive substring match
    ContainsFold,
    IsNull,
    NotNull,
}

impl Op {
    /// Operators that only apply to text fields
    pub fn is_string_op(self) -> bool {
        matches!(
            self,
            Op::Contains | Op::HasPrefix | Op::HasSuffix | Op::EqualFold | Op::ContainsFold
        )
    }

    /// `IN` and `NOT IN`
    pub fn is_set_op(self) -> bool {
        matches!(self, Op::In | Op::NotIn)
    }

    /// `IS NULL` and `IS NOT NULL`
    pub fn is_null_check(self) -> bool {
        matches!(self, Op::IsNull | Op::NotNull)
    }

    pub fn name(self) -> &'static str {
        match self {
            Op::Eq => "EQ",
            Op::Neq => "NEQ",
            Op::Gt => "GT",
            Op::Gte => "GTE",
            Op::Lt => "LT",
            Op::Lte => "LTE",
            Op::In => "IN",
            Op::NotIn => "NOT_IN",
            Op::Contains => "CONTAINS",
            Op::HasPrefix => "HAS_PREFIX",
            Op::HasSuffix => "HAS_SUFFIX",
            Op::EqualFold => "EQUAL_FOLD",
            Op::ContainsFold => "CONTAINS_FOLD",
            Op::IsNull => "IS_NULL",
            Op::NotNull => "NOT_NULL",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A validated `field op operands` triple.
///
/// Operands are always bound as parameters when lowered; they never appear in
/// the SQL text.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparator {
    field: Field,
    op: Op,
    operands: Vec<Value>,
}

impl Comparator {
    /// Build a comparator, checking operator and operands against the field.
    ///
    /// # Errors
    ///
    /// - `UnsupportedOperator` for a string operator on a non-text field
    /// - `EmptyOperandSet` for `IN` / `NOT IN` without operands
    /// - `InvalidOperandCount` when a scalar operator does not get exactly one
    ///   operand, or a null check gets any
    /// - `NullOperand` when an operand is a typed `NULL`
    /// - `TypeMismatch` when an operand's type differs from the field's or an
    ///   integer does not fit the column; accepted operands are stored in the
    ///   column's width
    pub fn new(field: Field, op: Op, operands: Vec<Value>) -> Result<Self, BuildError> {
        if op.is_string_op() && !field.field_type.is_text() {
            return Err(BuildError::UnsupportedOperator {
                table: field.table,
                field: field.name,
                op: op.name(),
                field_type: field.field_type,
            });
        }

        let expected = if op.is_null_check() { 0 } else { 1 };
        if op.is_set_op() {
            if operands.is_empty() {
                return Err(BuildError::EmptyOperandSet {
                    table: field.table,
                    field: field.name,
                });
            }
        } else if operands.len() != expected {
            return Err(BuildError::InvalidOperandCount {
                table: field.table,
                field: field.name,
                expected,
                found: operands.len(),
            });
        }

        let operands = operands
            .iter()
            .map(|operand| {
                let operand = field.field_type.coerce_for(&field, operand)?;
                if is_null_value(&operand) {
                    return Err(BuildError::NullOperand {
                        table: field.table,
                        field: field.name,
                    });
                }
                Ok(operand)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            field,
            op,
            operands,
        })
    }

    /// Build a comparator whose operand types are already guaranteed by the
    /// caller's type parameters.
    pub(crate) fn unchecked(field: Field, op: Op, operands: Vec<Value>) -> Self {
        Self {
            field,
            op,
            operands,
        }
    }

    pub fn field(&self) -> Field {
        self.field
    }

    pub fn op(&self) -> Op {
        self.op
    }

    pub fn operands(&self) -> &[Value] {
        &self.operands
    }
}
