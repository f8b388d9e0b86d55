//! Edge steps: how to reach a related table from a source table.
//!
//! An [`EdgeStep`] is a pure description. It knows the source column, the
//! target column, the relationship kind and, for many-to-many edges, the join
//! table in between. It does not know about any selector; the planner in
//! [`crate::query`] lowers it into a join when a predicate uses it.

use crate::query::BuildError;
use crate::schema::{JoinTableDescriptor, Schema};
use std::fmt;

/// Relationship cardinality as a raw flag, before direction is checked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    O2M,
    M2O,
    M2M,
}

/// Kind of an edge, with its direction folded in.
///
/// One-to-many edges are always declared from the referenced ("one") side and
/// many-to-one edges from the referencing side, so only many-to-many edges carry
/// an explicit `inverse` flag. Combinations such as an inverse one-to-many edge
/// cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// Source primary key is referenced by a foreign key on the target
    OneToMany,
    /// Source foreign key references the target primary key
    ManyToOne,
    /// Both sides are linked through a join table
    ManyToMany {
        /// `false` when walking from the side that owns the join table
        inverse: bool,
    },
}

impl EdgeKind {
    /// Fold a `(cardinality, inverse)` flag pair into a kind.
    ///
    /// # Errors
    ///
    /// `InvalidEdgeDirection` for an inverse one-to-many or a non-inverse
    /// many-to-one pair.
    pub fn from_parts(
        cardinality: Cardinality,
        inverse: bool,
        from: &'static str,
        to: &'static str,
    ) -> Result<Self, BuildError> {
        match (cardinality, inverse) {
            (Cardinality::O2M, false) => Ok(EdgeKind::OneToMany),
            (Cardinality::M2O, true) => Ok(EdgeKind::ManyToOne),
            (Cardinality::M2M, inverse) => Ok(EdgeKind::ManyToMany { inverse }),
            (Cardinality::O2M, true) => Err(BuildError::InvalidEdgeDirection {
                from,
                to,
                kind: EdgeKind::OneToMany,
                reason: "a one-to-many edge is never the inverse side",
            }),
            (Cardinality::M2O, false) => Err(BuildError::InvalidEdgeDirection {
                from,
                to,
                kind: EdgeKind::ManyToOne,
                reason: "a many-to-one edge is always the inverse side",
            }),
        }
    }

    pub fn cardinality(self) -> Cardinality {
        match self {
            EdgeKind::OneToMany => Cardinality::O2M,
            EdgeKind::ManyToOne => Cardinality::M2O,
            EdgeKind::ManyToMany { .. } => Cardinality::M2M,
        }
    }

    pub fn is_inverse(self) -> bool {
        match self {
            EdgeKind::OneToMany => false,
            EdgeKind::ManyToOne => true,
            EdgeKind::ManyToMany { inverse } => inverse,
        }
    }

    /// The kind of the same edge walked the other way
    pub fn rev(self) -> Self {
        match self {
            EdgeKind::OneToMany => EdgeKind::ManyToOne,
            EdgeKind::ManyToOne => EdgeKind::OneToMany,
            EdgeKind::ManyToMany { inverse } => EdgeKind::ManyToMany { inverse: !inverse },
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeKind::OneToMany => f.write_str("O2M"),
            EdgeKind::ManyToOne => f.write_str("M2O"),
            EdgeKind::ManyToMany { inverse: false } => f.write_str("M2M"),
            EdgeKind::ManyToMany { inverse: true } => f.write_str("M2M (inverse)"),
        }
    }
}

/// Join table hop of a many-to-many step, oriented along the step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Through {
    pub table: &'static str,
    /// Join table column pointing at the step's source
    pub from_column: &'static str,
    /// Join table column pointing at the step's target
    pub to_column: &'static str,
}

/// A single hop across an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeStep {
    from_table: &'static str,
    from_field: &'static str,
    kind: EdgeKind,
    to_table: &'static str,
    to_field: &'static str,
    through: Option<Through>,
}

impl EdgeStep {
    /// Build a step and check it against the registry.
    ///
    /// `from` and `to` are `(table, column)` pairs. For one-to-many and
    /// many-to-one steps the foreign key must sit on the side the kind says;
    /// for many-to-many steps a join table linking both columns must be
    /// registered, owned by `from` unless the kind is inverse.
    ///
    /// # Errors
    ///
    /// - `UnknownEntity` / `UnknownField` when a table or column is missing
    /// - `InvalidEdgeDirection` when the relationship exists but runs the
    ///   other way
    /// - `UnknownEdge` when no relationship links the two columns
    pub fn new(
        schema: &Schema,
        from: (&'static str, &'static str),
        kind: EdgeKind,
        to: (&'static str, &'static str),
    ) -> Result<Self, BuildError> {
        let source = schema.field(from.0, from.1)?;
        let target = schema.field(to.0, to.1)?;
        let no_relation = || BuildError::UnknownEdge {
            table: from.0.to_string(),
            edge: format!("{}.{} -> {}.{}", from.0, from.1, to.0, to.1),
        };

        let through = match kind {
            EdgeKind::OneToMany => {
                if target.references_column(from.0, from.1) {
                    None
                } else if source.references_column(to.0, to.1) {
                    return Err(BuildError::InvalidEdgeDirection {
                        from: from.0,
                        to: to.0,
                        kind,
                        reason: "the foreign key lives on the source table",
                    });
                } else {
                    return Err(no_relation());
                }
            }
            EdgeKind::ManyToOne => {
                if source.references_column(to.0, to.1) {
                    None
                } else if target.references_column(from.0, from.1) {
                    return Err(BuildError::InvalidEdgeDirection {
                        from: from.0,
                        to: to.0,
                        kind,
                        reason: "the foreign key lives on the target table",
                    });
                } else {
                    return Err(no_relation());
                }
            }
            EdgeKind::ManyToMany { inverse } => {
                let tables = schema.join_tables();
                if let Some(jt) = tables.iter().find(|jt| links(jt, from, to, inverse)) {
                    let (near, far) = oriented(jt, inverse);
                    Some(Through {
                        table: jt.table,
                        from_column: near.column,
                        to_column: far.column,
                    })
                } else if tables.iter().any(|jt| links(jt, from, to, !inverse)) {
                    return Err(BuildError::InvalidEdgeDirection {
                        from: from.0,
                        to: to.0,
                        kind,
                        reason: "the join table is owned by the other side",
                    });
                } else {
                    return Err(no_relation());
                }
            }
        };

        Ok(Self {
            from_table: from.0,
            from_field: from.1,
            kind,
            to_table: to.0,
            to_field: to.1,
            through,
        })
    }

    /// Build a step without consulting a registry.
    ///
    /// Generated entity modules use this for their edge constants; their
    /// tests check each constant with [`Schema::verify_step`].
    pub const fn unchecked(
        from: (&'static str, &'static str),
        kind: EdgeKind,
        to: (&'static str, &'static str),
        through: Option<Through>,
    ) -> Self {
        Self {
            from_table: from.0,
            from_field: from.1,
            kind,
            to_table: to.0,
            to_field: to.1,
            through,
        }
    }

    pub fn from_table(&self) -> &'static str {
        self.from_table
    }

    pub fn from_field(&self) -> &'static str {
        self.from_field
    }

    pub fn kind(&self) -> EdgeKind {
        self.kind
    }

    pub fn to_table(&self) -> &'static str {
        self.to_table
    }

    pub fn to_field(&self) -> &'static str {
        self.to_field
    }

    pub fn through(&self) -> Option<&Through> {
        self.through.as_ref()
    }

    /// The same edge walked from the target back to the source
    pub fn rev(&self) -> Self {
        Self {
            from_table: self.to_table,
            from_field: self.to_field,
            kind: self.kind.rev(),
            to_table: self.from_table,
            to_field: self.from_field,
            through: self.through.map(|t| Through {
                table: t.table,
                from_column: t.to_column,
                to_column: t.from_column,
            }),
        }
    }
}

fn oriented(
    jt: &JoinTableDescriptor,
    inverse: bool,
) -> (crate::schema::JoinColumn, crate::schema::JoinColumn) {
    if inverse {
        (jt.member, jt.owner)
    } else {
        (jt.owner, jt.member)
    }
}

fn links(
    jt: &JoinTableDescriptor,
    from: (&str, &str),
    to: (&str, &str),
    inverse: bool,
) -> bool {
    let (near, far) = oriented(jt, inverse);
    near.references == from.0 && near.key == from.1 && far.references == to.0 && far.key == to.1
}
