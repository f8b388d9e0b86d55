//! Comparator and group lowering onto sea-query conditions.
//!
//! A [`Selector`](super::Selector) resolves every comparator to the alias
//! of the table it reads, then builds its WHERE tree from the helpers here.
//! Operands stay attached to the expressions, so sea-query numbers the
//! parameters in the order they appear in the statement.

use crate::predicate::Op;
use crate::schema::field::value_as_text;
use sea_query::{Alias, BinOper, Condition, Expr, ExprTrait, Func, LikeExpr, Value};

/// Escape `LIKE` metacharacters so the text matches literally
pub fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

pub(crate) fn ident(name: &str) -> Alias {
    Alias::new(name.to_string())
}

/// `"alias"."column"`
pub(crate) fn column(alias: &str, column: &str) -> Expr {
    Expr::col((ident(alias), ident(column)))
}

pub(crate) fn leaf(expr: Expr) -> Condition {
    Condition::all().add(expr)
}

/// Conjunction of `children`; `TRUE` when empty
pub fn all(children: Vec<Condition>) -> Condition {
    group(Condition::all(), children, "TRUE")
}

/// Disjunction of `children`; `FALSE` when empty
pub fn any(children: Vec<Condition>) -> Condition {
    group(Condition::any(), children, "FALSE")
}

fn group(junction: Condition, mut children: Vec<Condition>, empty: &'static str) -> Condition {
    match children.len() {
        0 => leaf(Expr::cust(empty)),
        1 => children.remove(0),
        _ => children
            .into_iter()
            .fold(junction, |group, child| group.add(child)),
    }
}

pub fn not(child: Condition) -> Condition {
    Condition::all().add(child).not()
}

fn lower(expr: Expr) -> Expr {
    Func::lower(expr).into()
}

fn like_pattern(operand: &Value, prefix: &str, suffix: &str) -> String {
    let text = value_as_text(operand).unwrap_or_default();
    format!("{prefix}{}{suffix}", escape_like(&text))
}

fn like(pattern: String) -> LikeExpr {
    LikeExpr::new(pattern).escape('\\')
}

/// Lower one comparator read through `alias`
pub fn compare(alias: &str, field: &'static str, op: Op, operands: &[Value]) -> Condition {
    let col = column(alias, field);
    let first = operands.first().cloned().unwrap_or(Value::Bool(None));
    let expr = match op {
        Op::Eq => col.eq(first),
        Op::Neq => col.ne(first),
        Op::Gt => col.gt(first),
        Op::Gte => col.gte(first),
        Op::Lt => col.lt(first),
        Op::Lte => col.lte(first),
        Op::In => col.is_in(operands.iter().cloned()),
        Op::NotIn => col.is_not_in(operands.iter().cloned()),
        Op::Contains => col.like(like(like_pattern(&first, "%", "%"))),
        Op::HasPrefix => col.like(like(like_pattern(&first, "", "%"))),
        Op::HasSuffix => col.like(like(like_pattern(&first, "%", ""))),
        Op::EqualFold => lower(col).eq(lower(Expr::val(first))),
        Op::ContainsFold => {
            let pattern = Expr::val(like_pattern(&first, "%", "%"));
            lower(col).binary(BinOper::Like, lower(pattern))
        }
        Op::IsNull => col.is_null(),
        Op::NotNull => col.is_not_null(),
    };
    leaf(expr)
}
