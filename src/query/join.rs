//! Join registry for edge lowering.
//!
//! Every edge predicate needs its target table joined into the query. The
//! registry hands out one alias per distinct join and returns the existing
//! alias when the same join is requested again, so two predicates over the
//! same edge filter the same joined rows. Correlated subqueries draw their
//! aliases from the same pool so no name is bound twice in one statement.

use super::clause::{column, ident};
use crate::relation::EdgeStep;
use sea_query::{ExprTrait, JoinType, SelectStatement};

/// Identity of a join: target table plus its `ON` condition
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct JoinKey {
    table: &'static str,
    from_alias: String,
    from_column: &'static str,
    to_column: &'static str,
}

/// A registered `LEFT JOIN`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    pub table: &'static str,
    pub alias: String,
    pub from_alias: String,
    pub from_column: &'static str,
    pub to_column: &'static str,
}

/// Joins registered by one selector, in first-registration order
#[derive(Debug, Clone, Default)]
pub struct JoinRegistry {
    joins: Vec<Join>,
    reserved: Vec<String>,
}

impl JoinRegistry {
    /// Registry for a query rooted at `root_table`; the root keeps its own
    /// name as alias.
    pub fn new(root_table: &str) -> Self {
        Self {
            joins: Vec::new(),
            reserved: vec![root_table.to_string()],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.joins.is_empty()
    }

    pub fn joins(&self) -> &[Join] {
        &self.joins
    }

    /// Join the step's target from `from_alias` and return the target alias.
    ///
    /// Many-to-many steps join the join table first, then the target through
    /// it. Each hop is deduplicated on its own.
    pub fn register(&mut self, step: &EdgeStep, from_alias: &str) -> String {
        match step.through() {
            None => self.join(JoinKey {
                table: step.to_table(),
                from_alias: from_alias.to_string(),
                from_column: step.from_field(),
                to_column: step.to_field(),
            }),
            Some(through) => {
                let bridge = self.join(JoinKey {
                    table: through.table,
                    from_alias: from_alias.to_string(),
                    from_column: step.from_field(),
                    to_column: through.from_column,
                });
                self.join(JoinKey {
                    table: step.to_table(),
                    from_alias: bridge,
                    from_column: through.to_column,
                    to_column: step.to_field(),
                })
            }
        }
    }

    fn join(&mut self, key: JoinKey) -> String {
        if let Some(existing) = self.joins.iter().find(|j| {
            j.table == key.table
                && j.from_alias == key.from_alias
                && j.from_column == key.from_column
                && j.to_column == key.to_column
        }) {
            return existing.alias.clone();
        }
        let alias = self.reserve(key.table);
        log::trace!("registered join {} AS {alias}", key.table);
        self.joins.push(Join {
            table: key.table,
            alias: alias.clone(),
            from_alias: key.from_alias,
            from_column: key.from_column,
            to_column: key.to_column,
        });
        alias
    }

    /// Reserve a fresh alias for `table` without joining it
    pub fn reserve(&mut self, table: &str) -> String {
        let mut alias = table.to_string();
        let mut n = 1;
        while self.reserved.contains(&alias) {
            alias = format!("{table}_{n}");
            n += 1;
        }
        self.reserved.push(alias.clone());
        alias
    }

    /// Add a `LEFT JOIN "t" [AS "a"] ON "a"."to" = "from"."col"` to `query`
    /// for every join
    pub fn apply(&self, query: &mut SelectStatement) {
        for join in &self.joins {
            let on = column(&join.alias, join.to_column)
                .eq(column(&join.from_alias, join.from_column));
            if join.alias == join.table {
                query.join(JoinType::LeftJoin, ident(join.table), on);
            } else {
                query.join_as(JoinType::LeftJoin, ident(join.table), ident(&join.alias), on);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relation::{EdgeKind, Through};
    use sea_query::{Asterisk, PostgresQueryBuilder, Query};

    const USER_COMMENTS: EdgeStep = EdgeStep::unchecked(
        ("users", "id"),
        EdgeKind::OneToMany,
        ("comments", "user_id"),
        None,
    );

    fn rendered(registry: &JoinRegistry) -> String {
        let mut query = Query::select();
        query.column(Asterisk).from("users");
        registry.apply(&mut query);
        query.to_string(PostgresQueryBuilder)
    }

    #[test]
    fn test_same_step_reuses_alias() {
        let mut registry = JoinRegistry::new("users");
        let a = registry.register(&USER_COMMENTS, "users");
        let b = registry.register(&USER_COMMENTS, "users");
        assert_eq!(a, "comments");
        assert_eq!(a, b);
        assert_eq!(registry.joins().len(), 1);
        let sql = rendered(&registry);
        assert_eq!(sql.matches("LEFT JOIN").count(), 1);
        assert!(sql.contains(
            "LEFT JOIN \"comments\" ON \"comments\".\"user_id\" = \"users\".\"id\""
        ));
    }

    #[test]
    fn test_self_join_gets_fresh_alias() {
        let friends = EdgeStep::unchecked(
            ("users", "id"),
            EdgeKind::ManyToMany { inverse: false },
            ("users", "id"),
            Some(Through {
                table: "user_friends",
                from_column: "user_id",
                to_column: "friend_id",
            }),
        );
        let mut registry = JoinRegistry::new("users");
        let alias = registry.register(&friends, "users");
        assert_eq!(alias, "users_1");
        let sql = rendered(&registry);
        assert!(sql.contains(
            "LEFT JOIN \"user_friends\" ON \"user_friends\".\"user_id\" = \"users\".\"id\""
        ));
        assert!(sql.contains(
            "LEFT JOIN \"users\" AS \"users_1\" ON \"users_1\".\"id\" = \"user_friends\".\"friend_id\""
        ));
    }

    #[test]
    fn test_same_table_from_other_alias_is_distinct() {
        let mut registry = JoinRegistry::new("users");
        registry.register(&USER_COMMENTS, "users");
        let other = registry.register(&USER_COMMENTS, "users_1");
        assert_eq!(other, "comments_1");
        assert_eq!(registry.joins().len(), 2);
    }

    #[test]
    fn test_reserved_alias_is_not_reused_by_joins() {
        let mut registry = JoinRegistry::new("users");
        assert_eq!(registry.reserve("comments"), "comments");
        assert_eq!(registry.register(&USER_COMMENTS, "users"), "comments_1");
        assert!(registry.joins().iter().all(|j| j.alias != "comments"));
    }
}
