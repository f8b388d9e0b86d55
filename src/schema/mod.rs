//! Schema registry.
//!
//! The registry is an explicit value built once at startup and passed by
//! reference wherever runtime schema knowledge is needed: dynamic comparator
//! construction, edge step validation, insert defaults and field validators.
//! There is no global registry.
//!
//! # Example
//!
//! ```no_run
//! use relq::schema::{EntityDescriptor, FieldDescriptor, Field, FieldType, Schema};
//!
//! let schema = Schema::new().entity(
//!     EntityDescriptor::new("User", "users", "id")
//!         .field(FieldDescriptor::new(Field::new("users", "id", FieldType::Int)))
//!         .field(FieldDescriptor::new(Field::new("users", "name", FieldType::Text)).default_value("unknown")),
//! );
//! assert!(schema.field("users", "name").is_ok());
//! ```

pub mod field;

pub use field::{Field, FieldDescriptor, FieldType, ForeignKey, Validator};

use crate::predicate::{Comparator, Op};
use crate::query::BuildError;
use crate::relation::{EdgeKind, EdgeStep};
use sea_query::Value;

/// Static identity of a generated entity
///
/// Implemented by the marker types in [`crate::entity`]; typed predicates,
/// columns and queries are parameterized over it.
pub trait Entity {
    /// Entity name, e.g. `User`
    const NAME: &'static str;
    /// Table name, e.g. `users`
    const TABLE: &'static str;
    /// Primary key column
    const PRIMARY_KEY: &'static str;
}

/// Declared relationship from one entity to another
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeDescriptor {
    /// Edge name, e.g. `comments`
    pub name: &'static str,
    /// Relationship kind as seen from the declaring entity
    pub kind: EdgeKind,
    /// Column on the declaring entity's table
    pub from_field: &'static str,
    /// Target table
    pub to_table: &'static str,
    /// Column on the target table
    pub to_field: &'static str,
}

/// Registry entry for one entity
#[derive(Debug, Clone)]
pub struct EntityDescriptor {
    pub name: &'static str,
    pub table: &'static str,
    pub primary_key: &'static str,
    fields: Vec<FieldDescriptor>,
    edges: Vec<EdgeDescriptor>,
}

impl EntityDescriptor {
    pub fn new(name: &'static str, table: &'static str, primary_key: &'static str) -> Self {
        Self {
            name,
            table,
            primary_key,
            fields: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn edge(mut self, edge: EdgeDescriptor) -> Self {
        self.edges.push(edge);
        self
    }

    /// Fields in declaration order
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn edges(&self) -> &[EdgeDescriptor] {
        &self.edges
    }

    pub fn find_field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.field.name == name)
    }

    pub fn find_edge(&self, name: &str) -> Option<&EdgeDescriptor> {
        self.edges.iter().find(|e| e.name == name)
    }
}

/// One side of a many-to-many join table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JoinColumn {
    /// Column on the join table
    pub column: &'static str,
    /// Table the column points at
    pub references: &'static str,
    /// Key column on the referenced table
    pub key: &'static str,
}

/// Join table backing a many-to-many edge.
///
/// `owner` is the side that declares the edge (non-inverse); `member` is the
/// side that declares the inverse edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JoinTableDescriptor {
    pub table: &'static str,
    pub owner: JoinColumn,
    pub member: JoinColumn,
}

/// The schema registry
#[derive(Debug, Clone, Default)]
pub struct Schema {
    entities: Vec<EntityDescriptor>,
    join_tables: Vec<JoinTableDescriptor>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity
    pub fn entity(mut self, entity: EntityDescriptor) -> Self {
        self.entities.push(entity);
        self
    }

    /// Register a many-to-many join table
    pub fn join_table(mut self, join_table: JoinTableDescriptor) -> Self {
        self.join_tables.push(join_table);
        self
    }

    pub fn entities(&self) -> &[EntityDescriptor] {
        &self.entities
    }

    pub fn join_tables(&self) -> &[JoinTableDescriptor] {
        &self.join_tables
    }

    /// Look up an entity by table name
    pub fn lookup(&self, table: &str) -> Result<&EntityDescriptor, BuildError> {
        self.entities
            .iter()
            .find(|e| e.table == table)
            .ok_or_else(|| BuildError::UnknownEntity(table.to_string()))
    }

    /// Look up a field by table and column name
    pub fn field(&self, table: &str, name: &str) -> Result<&FieldDescriptor, BuildError> {
        self.lookup(table)?
            .find_field(name)
            .ok_or_else(|| BuildError::UnknownField {
                table: table.to_string(),
                field: name.to_string(),
            })
    }

    /// Build a comparator from names, validated against the registry.
    ///
    /// This is the entry point for predicates assembled at runtime (filters
    /// coming from a request, for instance); generated entity modules build
    /// their comparators from typed columns instead.
    ///
    /// # Errors
    ///
    /// `UnknownEntity` / `UnknownField` for names missing from the registry,
    /// plus every error [`Comparator::new`] reports.
    pub fn comparator(
        &self,
        table: &str,
        field: &str,
        op: Op,
        operands: Vec<Value>,
    ) -> Result<Comparator, BuildError> {
        let descriptor = self.field(table, field)?;
        Comparator::new(descriptor.field, op, operands)
    }

    /// Build the step for an edge declared on `table`.
    ///
    /// The declaration is re-validated through [`EdgeStep::new`], so a
    /// descriptor whose kind disagrees with the foreign keys is reported here.
    pub fn step(&self, table: &str, edge: &str) -> Result<EdgeStep, BuildError> {
        let entity = self.lookup(table)?;
        let declared = entity
            .find_edge(edge)
            .ok_or_else(|| BuildError::UnknownEdge {
                table: table.to_string(),
                edge: edge.to_string(),
            })?;
        EdgeStep::new(
            self,
            (entity.table, declared.from_field),
            declared.kind,
            (declared.to_table, declared.to_field),
        )
    }

    /// Check that a pre-built step agrees with the registry
    pub fn verify_step(&self, step: &EdgeStep) -> Result<(), BuildError> {
        let rebuilt = EdgeStep::new(
            self,
            (step.from_table(), step.from_field()),
            step.kind(),
            (step.to_table(), step.to_field()),
        )?;
        if rebuilt == *step {
            Ok(())
        } else {
            Err(BuildError::InvalidEdgeDirection {
                from: step.from_table(),
                to: step.to_table(),
                kind: step.kind(),
                reason: "join table columns disagree with the registry",
            })
        }
    }
}
