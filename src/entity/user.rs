//! The `User` entity (`users` table).

use super::comment::Comment;
use crate::predicate::{Column, Predicate};
use crate::query::Query;
use crate::relation::{Edge, EdgeKind, EdgeStep};
use crate::schema::field::validators;
use crate::schema::{EdgeDescriptor, Entity, EntityDescriptor, Field, FieldDescriptor, FieldType};

pub struct User;

impl Entity for User {
    const NAME: &'static str = "User";
    const TABLE: &'static str = TABLE;
    const PRIMARY_KEY: &'static str = "id";
}

pub const TABLE: &str = "users";

pub const ID: Column<User, i32> = Column::new(Field::new(TABLE, "id", FieldType::Int));
pub const NAME: Column<User, String> = Column::new(Field::new(TABLE, "name", FieldType::Text));
pub const AGE: Column<User, i32> = Column::new(Field::new(TABLE, "age", FieldType::Int));
pub const NICKNAME: Column<User, String> =
    Column::new(Field::new(TABLE, "nickname", FieldType::Text).nullable());

/// Default value of `name` on insert
pub const DEFAULT_NAME: &str = "unknown";
/// Default value of `nickname` on insert
pub const DEFAULT_NICKNAME: &str = "";

/// Comments written by the user (O2M, foreign key on `comments.user_id`)
pub const COMMENTS: Edge<User, Comment> = Edge::new(EdgeStep::unchecked(
    (TABLE, "id"),
    EdgeKind::OneToMany,
    (super::comment::TABLE, "user_id"),
    None,
));

/// Registry entry: defaults for `name` and `nickname`, `age` must be positive
pub fn descriptor() -> EntityDescriptor {
    EntityDescriptor::new(User::NAME, TABLE, User::PRIMARY_KEY)
        .field(FieldDescriptor::new(ID.field()))
        .field(FieldDescriptor::new(NAME.field()).default_value(DEFAULT_NAME))
        .field(FieldDescriptor::new(AGE.field()).validate(validators::positive))
        .field(FieldDescriptor::new(NICKNAME.field()).default_value(DEFAULT_NICKNAME))
        .edge(EdgeDescriptor {
            name: "comments",
            kind: EdgeKind::OneToMany,
            from_field: "id",
            to_table: super::comment::TABLE,
            to_field: "user_id",
        })
}

/// Query over all users
pub fn query() -> Query<User> {
    Query::new()
}

/// `id = v`
pub fn id(v: i32) -> Predicate<User> {
    ID.eq(v)
}

/// `name = v`
pub fn name(v: impl Into<String>) -> Predicate<User> {
    NAME.eq(v)
}

/// `age = v`
pub fn age(v: i32) -> Predicate<User> {
    AGE.eq(v)
}

/// `nickname = v`
pub fn nickname(v: impl Into<String>) -> Predicate<User> {
    NICKNAME.eq(v)
}

field_predicates!(User, ID, i32 {
    eq: id_eq,
    neq: id_neq,
    is_in: id_in,
    not_in: id_not_in,
    gt: id_gt,
    gte: id_gte,
    lt: id_lt,
    lte: id_lte,
});

field_predicates!(User, NAME, String {
    eq: name_eq,
    neq: name_neq,
    is_in: name_in,
    not_in: name_not_in,
    gt: name_gt,
    gte: name_gte,
    lt: name_lt,
    lte: name_lte,
});

text_predicates!(User, NAME {
    contains: name_contains,
    has_prefix: name_has_prefix,
    has_suffix: name_has_suffix,
    equal_fold: name_equal_fold,
    contains_fold: name_contains_fold,
});

field_predicates!(User, AGE, i32 {
    eq: age_eq,
    neq: age_neq,
    is_in: age_in,
    not_in: age_not_in,
    gt: age_gt,
    gte: age_gte,
    lt: age_lt,
    lte: age_lte,
});

field_predicates!(User, NICKNAME, String {
    eq: nickname_eq,
    neq: nickname_neq,
    is_in: nickname_in,
    not_in: nickname_not_in,
    gt: nickname_gt,
    gte: nickname_gte,
    lt: nickname_lt,
    lte: nickname_lte,
});

text_predicates!(User, NICKNAME {
    contains: nickname_contains,
    has_prefix: nickname_has_prefix,
    has_suffix: nickname_has_suffix,
    equal_fold: nickname_equal_fold,
    contains_fold: nickname_contains_fold,
});

/// `nickname IS NULL`
pub fn nickname_is_nil() -> Predicate<User> {
    NICKNAME.is_null()
}

/// `nickname IS NOT NULL`
pub fn nickname_not_nil() -> Predicate<User> {
    NICKNAME.is_not_null()
}

/// The user has at least one comment
pub fn has_comments() -> Predicate<User> {
    COMMENTS.exists()
}

/// The user has at least one comment matching every predicate
pub fn has_comments_with(preds: impl IntoIterator<Item = Predicate<Comment>>) -> Predicate<User> {
    COMMENTS.exists_with(preds)
}

combinators!(User);
