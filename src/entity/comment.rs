//! The `Comment` entity (`comments` table).

use super::user::User;
use crate::predicate::{Column, Predicate};
use crate::query::Query;
use crate::relation::{Edge, EdgeKind, EdgeStep};
use crate::schema::{EdgeDescriptor, Entity, EntityDescriptor, Field, FieldDescriptor, FieldType};

pub struct Comment;

impl Entity for Comment {
    const NAME: &'static str = "Comment";
    const TABLE: &'static str = TABLE;
    const PRIMARY_KEY: &'static str = "id";
}

pub const TABLE: &str = "comments";

pub const ID: Column<Comment, i32> = Column::new(Field::new(TABLE, "id", FieldType::Int));
pub const USER_ID: Column<Comment, i32> =
    Column::new(Field::new(TABLE, "user_id", FieldType::Int));
pub const COMMENT: Column<Comment, String> =
    Column::new(Field::new(TABLE, "comment", FieldType::Text));

/// Default value of `comment` on insert
pub const DEFAULT_COMMENT: &str = "";

/// Author of the comment (M2O through `comments.user_id`)
pub const USER: Edge<Comment, User> = Edge::new(EdgeStep::unchecked(
    (TABLE, "user_id"),
    EdgeKind::ManyToOne,
    (super::user::TABLE, "id"),
    None,
));

pub fn descriptor() -> EntityDescriptor {
    EntityDescriptor::new(Comment::NAME, TABLE, Comment::PRIMARY_KEY)
        .field(FieldDescriptor::new(ID.field()))
        .field(FieldDescriptor::new(USER_ID.field()).references(super::user::TABLE, "id"))
        .field(FieldDescriptor::new(COMMENT.field()).default_value(DEFAULT_COMMENT))
        .edge(EdgeDescriptor {
            name: "user",
            kind: EdgeKind::ManyToOne,
            from_field: "user_id",
            to_table: super::user::TABLE,
            to_field: "id",
        })
}

pub fn query() -> Query<Comment> {
    Query::new()
}

/// `id = v`
pub fn id(v: i32) -> Predicate<Comment> {
    ID.eq(v)
}

/// `user_id = v`
pub fn user_id(v: i32) -> Predicate<Comment> {
    USER_ID.eq(v)
}

/// `comment = v`
pub fn comment(v: impl Into<String>) -> Predicate<Comment> {
    COMMENT.eq(v)
}

field_predicates!(Comment, ID, i32 {
    eq: id_eq,
    neq: id_neq,
    is_in: id_in,
    not_in: id_not_in,
    gt: id_gt,
    gte: id_gte,
    lt: id_lt,
    lte: id_lte,
});

field_predicates!(Comment, USER_ID, i32 {
    eq: user_id_eq,
    neq: user_id_neq,
    is_in: user_id_in,
    not_in: user_id_not_in,
    gt: user_id_gt,
    gte: user_id_gte,
    lt: user_id_lt,
    lte: user_id_lte,
});

field_predicates!(Comment, COMMENT, String {
    eq: comment_eq,
    neq: comment_neq,
    is_in: comment_in,
    not_in: comment_not_in,
    gt: comment_gt,
    gte: comment_gte,
    lt: comment_lt,
    lte: comment_lte,
});

text_predicates!(Comment, COMMENT {
    contains: comment_contains,
    has_prefix: comment_has_prefix,
    has_suffix: comment_has_suffix,
    equal_fold: comment_equal_fold,
    contains_fold: comment_contains_fold,
});

/// The comment has an author
pub fn has_user() -> Predicate<Comment> {
    USER.exists()
}

/// The comment's author matches every predicate
pub fn has_user_with(preds: impl IntoIterator<Item = Predicate<User>>) -> Predicate<Comment> {
    USER.exists_with(preds)
}

combinators!(Comment);
