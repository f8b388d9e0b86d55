//! Build-time errors for predicates, edges and statements.
//!
//! Everything here is reported before any SQL reaches the database: a
//! comparator with the wrong operand type, an edge declared against the
//! foreign key, a selector lowered twice. Errors raised by the database itself
//! are [`ExecError`](crate::executor::ExecError).

use crate::relation::EdgeKind;
use crate::schema::FieldType;
use std::fmt;

/// Error raised while building or lowering a statement
#[derive(Debug, Clone, PartialEq)]
pub enum BuildError {
    /// Operand type does not match the field's declared type
    TypeMismatch {
        table: &'static str,
        field: &'static str,
        expected: FieldType,
        found: &'static str,
    },
    /// `IN` / `NOT IN` with no operands
    EmptyOperandSet {
        table: &'static str,
        field: &'static str,
    },
    /// Operator given the wrong number of operands
    InvalidOperandCount {
        table: &'static str,
        field: &'static str,
        expected: usize,
        found: usize,
    },
    /// `NULL` used as a comparison operand (use `IS NULL` instead)
    NullOperand {
        table: &'static str,
        field: &'static str,
    },
    /// Operator not valid for the field's type
    UnsupportedOperator {
        table: &'static str,
        field: &'static str,
        op: &'static str,
        field_type: FieldType,
    },
    /// Table not registered in the schema
    UnknownEntity(String),
    /// Column not declared on the table
    UnknownField { table: String, field: String },
    /// No edge with that name or no relationship between the columns
    UnknownEdge { table: String, edge: String },
    /// Edge kind disagrees with the declared relationship
    InvalidEdgeDirection {
        from: &'static str,
        to: &'static str,
        kind: EdgeKind,
        reason: &'static str,
    },
    /// Comparator or edge does not belong to the table being filtered
    FieldOutOfScope {
        scope: String,
        table: &'static str,
        field: &'static str,
    },
    /// Selector was already lowered to SQL
    SelectorAlreadyLowered,
    /// A field validator rejected a value
    ValidationFailed {
        table: &'static str,
        field: &'static str,
        reason: String,
    },
    /// Insert left a required field without a value or default
    MissingValue {
        table: &'static str,
        field: &'static str,
    },
    /// Update without any `SET` value
    EmptyUpdate { table: &'static str },
    /// The statement builder rejected the assembled statement
    InvalidStatement { table: &'static str, reason: String },
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::TypeMismatch {
                table,
                field,
                expected,
                found,
            } => write!(f, "Type mismatch on {table}.{field}: expected {expected}, found {found}"),
            BuildError::EmptyOperandSet { table, field } => {
                write!(f, "Empty operand set for {table}.{field}")
            }
            BuildError::InvalidOperandCount {
                table,
                field,
                expected,
                found,
            } => write!(
                f,
                "Invalid operand count for {table}.{field}: expected {expected}, found {found}"
            ),
            BuildError::NullOperand { table, field } => {
                write!(f, "Null operand for {table}.{field}; use IS NULL instead")
            }
            BuildError::UnsupportedOperator {
                table,
                field,
                op,
                field_type,
            } => write!(f, "Unsupported operator {op} on {field_type} field {table}.{field}"),
            BuildError::UnknownEntity(table) => write!(f, "Unknown entity: {table}"),
            BuildError::UnknownField { table, field } => {
                write!(f, "Unknown field: {table}.{field}")
            }
            BuildError::UnknownEdge { table, edge } => write!(f, "Unknown edge on {table}: {edge}"),
            BuildError::InvalidEdgeDirection {
                from,
                to,
                kind,
                reason,
            } => write!(f, "Invalid edge direction {from} -> {to} ({kind}): {reason}"),
            BuildError::FieldOutOfScope {
                scope,
                table,
                field,
            } => write!(f, "Field {table}.{field} is out of scope for {scope}"),
            BuildError::SelectorAlreadyLowered => {
                write!(f, "Selector has already been lowered")
            }
            BuildError::ValidationFailed {
                table,
                field,
                reason,
            } => write!(f, "Validation failed for {table}.{field}: {reason}"),
            BuildError::MissingValue { table, field } => {
                write!(f, "Missing value for required field {table}.{field}")
            }
            BuildError::EmptyUpdate { table } => write!(f, "Update of {table} sets no fields"),
            BuildError::InvalidStatement { table, reason } => {
                write!(f, "Invalid statement for {table}: {reason}")
            }
        }
    }
}

impl std::error::Error for BuildError {}
