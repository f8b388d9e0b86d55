use relq::entity::{self, comment, user, Comment, User};
use relq::predicate::{and, has_edge, has_edge_with, not, Node, Predicate};
use relq::query::{BuildError, Order, Query, Selector};
use relq::relation::{EdgeKind, EdgeStep};
use relq::schema::{
    EdgeDescriptor, Entity, EntityDescriptor, Field, FieldDescriptor, FieldType, JoinColumn,
    JoinTableDescriptor, Schema,
};
use sea_query::Value;

struct Group;

impl Entity for Group {
    const NAME: &'static str = "Group";
    const TABLE: &'static str = "groups";
    const PRIMARY_KEY: &'static str = "id";
}

/// users/comments plus groups joined to users through `group_users`
fn group_schema() -> Schema {
    Schema::new()
        .entity(
            user::descriptor().edge(EdgeDescriptor {
                name: "groups",
                kind: EdgeKind::ManyToMany { inverse: true },
                from_field: "id",
                to_table: "groups",
                to_field: "id",
            }),
        )
        .entity(comment::descriptor())
        .entity(
            EntityDescriptor::new(Group::NAME, Group::TABLE, Group::PRIMARY_KEY)
                .field(FieldDescriptor::new(Field::new("groups", "id", FieldType::Int)))
                .field(FieldDescriptor::new(Field::new("groups", "name", FieldType::Text)))
                .edge(EdgeDescriptor {
                    name: "users",
                    kind: EdgeKind::ManyToMany { inverse: false },
                    from_field: "id",
                    to_table: "users",
                    to_field: "id",
                }),
        )
        .join_table(JoinTableDescriptor {
            table: "group_users",
            owner: JoinColumn {
                column: "group_id",
                references: "groups",
                key: "id",
            },
            member: JoinColumn {
                column: "user_id",
                references: "users",
                key: "id",
            },
        })
}

fn lower<E>(selector: &mut Selector, p: &Predicate<E>) -> (String, Vec<Value>) {
    selector.apply(p).unwrap();
    let (sql, values) = selector.lower().unwrap();
    (sql, values.0)
}

#[test]
fn test_generated_edges_agree_with_registry() {
    let schema = entity::schema();
    schema.verify_step(user::COMMENTS.step()).unwrap();
    schema.verify_step(comment::USER.step()).unwrap();
    assert_eq!(schema.step("users", "comments").unwrap(), *user::COMMENTS.step());
    assert_eq!(schema.step("comments", "user").unwrap(), *comment::USER.step());
    assert_eq!(user::COMMENTS.step().rev(), *comment::USER.step());
}

#[test]
fn test_unknown_edge_name() {
    let err = entity::schema().step("users", "friends").unwrap_err();
    assert_eq!(
        err,
        BuildError::UnknownEdge {
            table: "users".to_string(),
            edge: "friends".to_string(),
        }
    );
}

#[test]
fn test_wrong_direction_is_rejected_before_lowering() {
    let schema = entity::schema();
    let err = EdgeStep::new(
        &schema,
        ("users", "id"),
        EdgeKind::ManyToOne,
        ("comments", "user_id"),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        BuildError::InvalidEdgeDirection {
            from: "users",
            to: "comments",
            kind: EdgeKind::ManyToOne,
            ..
        }
    ));
}

#[test]
fn test_two_conditions_on_one_edge_share_the_join() {
    let p = and([
        user::has_comments_with([comment::comment_contains("a")]),
        user::has_comments_with([comment::comment_contains("b")]),
    ]);
    let mut selector = Selector::for_entity::<User>();
    let (sql, values) = lower(&mut selector, &p);
    assert_eq!(sql.matches("LEFT JOIN").count(), 1);
    assert!(sql.contains(
        "LEFT JOIN \"comments\" ON \"comments\".\"user_id\" = \"users\".\"id\""
    ));
    assert_eq!(sql.matches("\"comments\".\"user_id\" IS NOT NULL").count(), 2);
    assert!(sql.contains("\"comments\".\"comment\" LIKE $1"));
    assert!(sql.contains("\"comments\".\"comment\" LIKE $2"));
    assert_eq!(values, vec![Value::from("%a%"), Value::from("%b%")]);
}

#[test]
fn test_round_trip_through_same_table_gets_an_alias() {
    let p = comment::has_user_with([user::has_comments_with([comment::comment_eq("x")])]);
    let mut selector = Selector::for_entity::<Comment>();
    let (sql, values) = lower(&mut selector, &p);
    assert!(sql.starts_with("SELECT DISTINCT \"comments\".* FROM \"comments\""));
    assert!(sql.contains(
        "LEFT JOIN \"users\" ON \"users\".\"id\" = \"comments\".\"user_id\""
    ));
    assert!(sql.contains(
        "LEFT JOIN \"comments\" AS \"comments_1\" ON \"comments_1\".\"user_id\" = \"users\".\"id\""
    ));
    assert!(sql.contains("\"users\".\"id\" IS NOT NULL"));
    assert!(sql.contains("\"comments_1\".\"comment\" = $1"));
    assert_eq!(values, vec![Value::from("x")]);
}

#[test]
fn test_many_to_many_joins_through_join_table() {
    let schema = group_schema();
    let step = schema.step("groups", "users").unwrap();
    assert_eq!(step.through().unwrap().table, "group_users");

    let p: Predicate<Group> = has_edge_with(step, [user::name_eq("a8m")]);
    let mut selector = Selector::for_entity::<Group>();
    let (sql, values) = lower(&mut selector, &p);
    assert!(sql.starts_with("SELECT DISTINCT \"groups\".* FROM \"groups\""));
    assert!(sql.contains(
        "LEFT JOIN \"group_users\" ON \"group_users\".\"group_id\" = \"groups\".\"id\" \
         LEFT JOIN \"users\" ON \"users\".\"id\" = \"group_users\".\"user_id\""
    ));
    assert!(sql.contains("\"users\".\"id\" IS NOT NULL AND \"users\".\"name\" = $1"));
    assert_eq!(values, vec![Value::from("a8m")]);
}

#[test]
fn test_inverse_many_to_many() {
    let schema = group_schema();
    let step = schema.step("users", "groups").unwrap();
    assert_eq!(step, schema.step("groups", "users").unwrap().rev());

    let p: Predicate<User> = has_edge(step);
    let mut selector = Selector::for_entity::<User>();
    let (sql, values) = lower(&mut selector, &p);
    assert!(sql.contains(
        "LEFT JOIN \"group_users\" ON \"group_users\".\"user_id\" = \"users\".\"id\" \
         LEFT JOIN \"groups\" ON \"groups\".\"id\" = \"group_users\".\"group_id\""
    ));
    assert!(sql.ends_with("WHERE \"groups\".\"id\" IS NOT NULL"));
    assert!(values.is_empty());
}

#[test]
fn test_many_to_many_declared_from_wrong_side() {
    let err = EdgeStep::new(
        &group_schema(),
        ("users", "id"),
        EdgeKind::ManyToMany { inverse: false },
        ("groups", "id"),
    )
    .unwrap_err();
    assert!(matches!(err, BuildError::InvalidEdgeDirection { .. }));
}

#[test]
fn test_out_of_scope_predicate_leaves_selector_untouched() {
    let mut selector = Selector::for_entity::<User>();
    let node = Node::And(vec![
        user::has_comments().into_node(),
        comment::comment_eq("x").into_node(),
    ]);
    let err = selector.apply_node(&node).unwrap_err();
    assert!(matches!(
        err,
        BuildError::FieldOutOfScope {
            table: "comments",
            field: "comment",
            ..
        }
    ));
    assert!(selector.joins().is_empty());

    let (sql, _) = selector.lower().unwrap();
    assert_eq!(sql, "SELECT \"users\".* FROM \"users\"");
}

#[test]
fn test_selector_lowers_once() {
    let mut selector = Selector::for_entity::<User>();
    selector.apply(&user::has_comments()).unwrap();
    selector.lower().unwrap();
    assert!(matches!(
        selector.lower(),
        Err(BuildError::SelectorAlreadyLowered)
    ));
    assert!(matches!(
        selector.apply(&user::age_gt(1)),
        Err(BuildError::SelectorAlreadyLowered)
    ));
}

#[test]
fn test_query_from_walks_the_inverse_edge() {
    let (sql, values) = comment::USER
        .query_from([comment::comment_has_suffix("!")])
        .to_sql()
        .unwrap();
    assert!(sql.starts_with("SELECT DISTINCT \"users\".* FROM \"users\""));
    assert!(sql.contains(
        "LEFT JOIN \"comments\" ON \"comments\".\"user_id\" = \"users\".\"id\""
    ));
    assert!(sql.contains("\"comments\".\"comment\" LIKE $1"));
    assert_eq!(values.0, vec![Value::from("%!")]);
}

#[test]
fn test_negated_edge_becomes_not_exists() {
    let mut selector = Selector::for_entity::<User>();
    let (sql, values) = lower(&mut selector, &not(user::has_comments()));
    assert!(selector.joins().is_empty());
    assert!(!sql.contains("JOIN"));
    assert!(!sql.contains("DISTINCT"));
    assert!(!sql.contains("IS NOT NULL"));
    assert!(sql.contains("WHERE NOT"));
    assert!(sql.contains("EXISTS"));
    assert!(sql.contains(
        "SELECT 1 FROM \"comments\" AS \"comments\" \
         WHERE \"comments\".\"user_id\" = \"users\".\"id\""
    ));
    assert!(values.is_empty());
}

#[test]
fn test_negated_edge_with_condition_keeps_it_inside_the_subquery() {
    let p = not(user::has_comments_with([comment::comment_eq("spam")]));
    let mut selector = Selector::for_entity::<User>();
    let (sql, values) = lower(&mut selector, &p);
    assert!(!sql.contains("JOIN"));
    assert!(sql.contains(
        "WHERE \"comments\".\"user_id\" = \"users\".\"id\" AND \"comments\".\"comment\" = $1"
    ));
    assert_eq!(values, vec![Value::from("spam")]);
}

#[test]
fn test_negated_and_positive_conditions_on_one_edge() {
    let p = and([
        user::has_comments_with([comment::comment_contains("a")]),
        not(user::has_comments_with([comment::comment_eq("spam")])),
    ]);
    let mut selector = Selector::for_entity::<User>();
    let (sql, values) = lower(&mut selector, &p);

    // the positive edge joins, the negated one gets its own alias
    assert_eq!(sql.matches("LEFT JOIN").count(), 1);
    assert!(sql.contains(
        "LEFT JOIN \"comments\" ON \"comments\".\"user_id\" = \"users\".\"id\""
    ));
    assert!(sql.contains("\"comments\".\"comment\" LIKE $1"));
    assert!(sql.contains(
        "SELECT 1 FROM \"comments\" AS \"comments_1\" \
         WHERE \"comments_1\".\"user_id\" = \"users\".\"id\" AND \"comments_1\".\"comment\" = $2"
    ));
    assert_eq!(values, vec![Value::from("%a%"), Value::from("spam")]);
}

#[test]
fn test_negated_many_to_many_goes_through_join_table() {
    let schema = group_schema();
    let step = schema.step("groups", "users").unwrap();
    let p: Predicate<Group> = not(has_edge_with(step, [user::age_lt(18)]));
    let mut selector = Selector::for_entity::<Group>();
    let (sql, values) = lower(&mut selector, &p);
    assert!(!sql.contains("LEFT JOIN"));
    assert!(sql.contains(
        "SELECT 1 FROM \"group_users\" AS \"group_users\" \
         INNER JOIN \"users\" AS \"users\" ON \"users\".\"id\" = \"group_users\".\"user_id\""
    ));
    assert!(sql.contains(
        "\"group_users\".\"group_id\" = \"groups\".\"id\" AND \"users\".\"age\" < $1"
    ));
    assert_eq!(values, vec![Value::from(18i32)]);
}

#[test]
fn test_edges_nested_under_negation_stay_correlated() {
    let p = not(comment::has_user_with([user::has_comments()]));
    let mut selector = Selector::for_entity::<Comment>();
    let (sql, _) = lower(&mut selector, &p);
    assert!(!sql.contains("LEFT JOIN"));
    assert_eq!(sql.matches("EXISTS").count(), 2);
    assert!(sql.contains(
        "SELECT 1 FROM \"users\" AS \"users\" WHERE \"users\".\"id\" = \"comments\".\"user_id\""
    ));
    assert!(sql.contains(
        "SELECT 1 FROM \"comments\" AS \"comments_1\" \
         WHERE \"comments_1\".\"user_id\" = \"users\".\"id\""
    ));
}

#[test]
fn test_order_outside_projection_avoids_distinct() {
    let (sql, _) = Query::<User>::new()
        .filter(user::has_comments())
        .select(user::ID)
        .order_by(user::NAME, Order::Asc)
        .to_sql()
        .unwrap();
    assert!(!sql.contains("DISTINCT"));
    assert!(sql.starts_with("SELECT \"users\".\"id\" FROM \"users\" WHERE"));
    assert!(sql.contains(
        "\"users\".\"id\" IN (SELECT \"users\".\"id\" FROM \"users\" LEFT JOIN \"comments\""
    ));
    assert!(sql.ends_with("ORDER BY \"users\".\"name\" ASC"));
}

#[test]
fn test_projected_order_keeps_distinct() {
    let (sql, _) = Query::<User>::new()
        .filter(user::has_comments())
        .select(user::ID)
        .select(user::NAME)
        .order_by(user::NAME, Order::Desc)
        .to_sql()
        .unwrap();
    assert!(sql.starts_with(
        "SELECT DISTINCT \"users\".\"id\", \"users\".\"name\" FROM \"users\" LEFT JOIN"
    ));
    assert!(!sql.contains(" IN (SELECT"));

    let (all_columns, _) = Query::<User>::new()
        .filter(user::has_comments())
        .order_by(user::AGE, Order::Asc)
        .to_sql()
        .unwrap();
    assert!(all_columns.starts_with("SELECT DISTINCT \"users\".* FROM \"users\" LEFT JOIN"));
}
