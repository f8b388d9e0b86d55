mod common;

use common::{Event, RecordingConnection};
use relq::entity::{self, comment, user, Comment, User};
use relq::executor::ExecError;
use relq::predicate::not;
use relq::query::{BuildError, Delete, Order};
use sea_query::Value;

#[test]
fn test_insert_fills_defaults_in_declaration_order() {
    let schema = entity::schema();
    let (sql, values) = schema.insert::<User>().set(user::AGE, 30).to_sql().unwrap();
    assert!(sql.starts_with(
        "INSERT INTO \"users\" (\"name\", \"age\", \"nickname\") VALUES ($1, $2, $3)"
    ));
    assert!(sql.ends_with("RETURNING \"id\""));
    assert_eq!(
        values.0,
        vec![
            Value::from(user::DEFAULT_NAME),
            Value::from(30i32),
            Value::from(user::DEFAULT_NICKNAME),
        ]
    );
}

#[test]
fn test_insert_explicit_values_win_over_defaults() {
    let schema = entity::schema();
    let (_, values) = schema
        .insert::<User>()
        .set(user::NAME, "first")
        .set(user::AGE, 30)
        .set(user::NAME, "a8m")
        .to_sql()
        .unwrap();
    assert_eq!(values.0[0], Value::from("a8m"));
}

#[test]
fn test_insert_runs_validators() {
    let schema = entity::schema();
    let err = schema.insert::<User>().set(user::AGE, 0).to_sql().unwrap_err();
    assert!(matches!(
        err,
        BuildError::ValidationFailed {
            table: "users",
            field: "age",
            ..
        }
    ));
}

#[test]
fn test_insert_requires_fields_without_default() {
    let schema = entity::schema();
    assert_eq!(
        schema.insert::<User>().to_sql().unwrap_err(),
        BuildError::MissingValue {
            table: "users",
            field: "age",
        }
    );
    assert_eq!(
        schema.insert::<Comment>().to_sql().unwrap_err(),
        BuildError::MissingValue {
            table: "comments",
            field: "user_id",
        }
    );
}

#[test]
fn test_insert_by_name_is_type_checked() {
    let schema = entity::schema();
    let err = schema
        .insert::<User>()
        .set_value("age", "thirty")
        .to_sql()
        .unwrap_err();
    assert!(matches!(err, BuildError::TypeMismatch { field: "age", .. }));

    let err = schema
        .insert::<User>()
        .set_value("email", "a@b.c")
        .to_sql()
        .unwrap_err();
    assert!(matches!(err, BuildError::UnknownField { .. }));
}

#[test]
fn test_insert_by_name_binds_column_width() {
    let schema = entity::schema();
    let (_, values) = schema
        .insert::<User>()
        .set_value("age", 5i64)
        .to_sql()
        .unwrap();
    assert_eq!(values.0[1], Value::Int(Some(5)));

    let err = schema
        .update::<User>()
        .set_value("age", i64::MAX)
        .to_sql()
        .unwrap_err();
    assert!(matches!(
        err,
        BuildError::TypeMismatch {
            field: "age",
            found: "out-of-range int",
            ..
        }
    ));
}

#[test]
fn test_save_sends_insert_through_executor() {
    let conn = RecordingConnection::new();
    conn.rows.set(1);
    let schema = entity::schema();
    let rows = schema
        .insert::<Comment>()
        .set(comment::USER_ID, 7)
        .save(&conn)
        .unwrap();
    assert_eq!(rows.len(), 1);
    match conn.events().as_slice() {
        [Event::Query(sql, values)] => {
            assert!(sql.starts_with(
                "INSERT INTO \"comments\" (\"user_id\", \"comment\") VALUES ($1, $2)"
            ));
            assert!(sql.ends_with("RETURNING \"id\""));
            assert_eq!(
                values,
                &vec![Value::from(7i32), Value::from(comment::DEFAULT_COMMENT)]
            );
        }
        other => panic!("unexpected events: {other:?}"),
    }
}

#[test]
fn test_update_set_params_come_first() {
    let schema = entity::schema();
    let (sql, values) = schema
        .update::<User>()
        .filter(user::age_lt(18))
        .set(user::NICKNAME, "kid")
        .to_sql()
        .unwrap();
    assert!(sql.starts_with("UPDATE \"users\" SET \"nickname\" = $1 WHERE"));
    assert!(sql.contains("\"users\".\"age\" < $2"));
    assert_eq!(values.0, vec![Value::from("kid"), Value::from(18i32)]);
}

#[test]
fn test_update_without_values() {
    let schema = entity::schema();
    let err = schema
        .update::<User>()
        .filter(user::id_eq(1))
        .to_sql()
        .unwrap_err();
    assert_eq!(err, BuildError::EmptyUpdate { table: "users" });
}

#[test]
fn test_update_rejects_invalid_value() {
    let schema = entity::schema();
    let err = schema.update::<User>().set(user::AGE, -3).to_sql().unwrap_err();
    assert!(matches!(err, BuildError::ValidationFailed { .. }));
}

#[test]
fn test_delete_over_edge_filters_by_primary_key() {
    let (sql, values) = Delete::<User>::new()
        .filter(user::has_comments_with([comment::comment_eq("spam")]))
        .to_sql()
        .unwrap();
    assert!(sql.starts_with("DELETE FROM \"users\" WHERE"));
    assert!(sql.contains(
        "\"users\".\"id\" IN (SELECT \"users\".\"id\" FROM \"users\" \
         LEFT JOIN \"comments\" ON \"comments\".\"user_id\" = \"users\".\"id\""
    ));
    assert!(sql.contains("\"comments\".\"comment\" = $1"));
    assert_eq!(values.0, vec![Value::from("spam")]);
}

#[test]
fn test_delete_over_negated_edge_needs_no_key_subquery() {
    let (sql, values) = Delete::<User>::new()
        .filter(not(user::has_comments()))
        .to_sql()
        .unwrap();
    assert!(sql.starts_with("DELETE FROM \"users\" WHERE NOT"));
    assert!(!sql.contains(" IN (SELECT"));
    assert!(sql.contains(
        "SELECT 1 FROM \"comments\" AS \"comments\" \
         WHERE \"comments\".\"user_id\" = \"users\".\"id\""
    ));
    assert!(values.0.is_empty());
}

#[test]
fn test_delete_without_filter_deletes_everything() {
    let conn = RecordingConnection::new();
    conn.rows.set(3);
    let deleted = entity::schema().delete::<Comment>().exec(&conn).unwrap();
    assert_eq!(deleted, 3);
    assert_eq!(
        conn.events(),
        vec![Event::Execute("DELETE FROM \"comments\"".to_string(), vec![])]
    );
}

#[test]
fn test_build_error_never_reaches_the_executor() {
    let conn = RecordingConnection::new();
    let err = entity::schema()
        .update::<User>()
        .filter(user::id_eq(1))
        .exec(&conn)
        .unwrap_err();
    assert!(matches!(err, ExecError::Build(BuildError::EmptyUpdate { .. })));
    assert!(conn.events().is_empty());
}

#[test]
fn test_exists_selects_one_key() {
    let conn = RecordingConnection::new();
    conn.rows.set(1);
    let found = user::query()
        .filter(user::has_comments())
        .order_by(user::NAME, Order::Asc)
        .exists(&conn)
        .unwrap();
    assert!(found);
    match conn.events().as_slice() {
        [Event::Query(sql, values)] => {
            assert!(sql.starts_with("SELECT DISTINCT \"users\".\"id\" FROM \"users\" LEFT JOIN"));
            assert!(!sql.contains("ORDER BY"));
            assert!(sql.ends_with("LIMIT $1"));
            assert_eq!(values.len(), 1);
        }
        other => panic!("unexpected events: {other:?}"),
    }
}
