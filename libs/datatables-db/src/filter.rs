//! Predicate AST → `sea_orm::Condition` compiler.
//! Building the AST belongs to `datatables-core`; this module only consumes
//! `datatables_core::ast::Expr`.

use bigdecimal::{BigDecimal, ToPrimitive};
use datatables_core::ast::{self as core, FN_CONTAINS, FN_ENDS_WITH, FN_STARTS_WITH, FN_TO_LOWER};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::{Alias, Expr, Func, LikeExpr, SimpleExpr},
    ColumnTrait, Condition, EntityTrait,
};
use thiserror::Error;

use crate::fields::{Field, FieldKind, FieldMap};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BuildError {
    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("type mismatch: expected {expected:?}, got {got}")]
    TypeMismatch {
        expected: FieldKind,
        got: &'static str,
    },

    #[error("unsupported operator: {0:?}")]
    UnsupportedOp(core::CompareOperator),

    #[error("unsupported function or args: {0}()")]
    UnsupportedFn(String),

    #[error("IN() list supports only literals")]
    NonLiteralInList,

    #[error("bare identifier not allowed: {0}")]
    BareIdentifier(String),

    #[error("bare literal not allowed")]
    BareLiteral,

    #[error("{0}")]
    Other(&'static str),
}
pub type BuildResult<T> = Result<T, BuildError>;

impl From<BuildError> for datatables_core::Error {
    fn from(e: BuildError) -> Self {
        match e {
            BuildError::UnknownField(name) => datatables_core::Error::UnknownField(name),
            other => datatables_core::Error::InvalidPredicate(other.to_string()),
        }
    }
}

/* ---------- coercion helpers ---------- */

fn bigdecimal_to_decimal(bd: &BigDecimal) -> BuildResult<Decimal> {
    let s = bd.normalized().to_string();
    Decimal::from_str_exact(&s)
        .or_else(|_| s.parse::<Decimal>())
        .map_err(|_| BuildError::Other("invalid decimal"))
}

fn value_name(v: &core::Value) -> &'static str {
    use core::Value as V;
    match v {
        V::Null => "null",
        V::Bool(_) => "bool",
        V::Number(_) => "number",
        V::Uuid(_) => "uuid",
        V::DateTime(_) => "datetime",
        V::Date(_) => "date",
        V::Time(_) => "time",
        V::String(_) => "string",
    }
}

fn coerce(kind: FieldKind, v: &core::Value) -> BuildResult<sea_orm::Value> {
    use core::Value as V;
    let mismatch = || BuildError::TypeMismatch {
        expected: kind,
        got: value_name(v),
    };

    Ok(match (kind, v) {
        (FieldKind::String, V::String(s)) => sea_orm::Value::String(Some(Box::new(s.clone()))),
        (FieldKind::I64, V::Number(n)) => {
            sea_orm::Value::BigInt(Some(n.to_i64().ok_or_else(mismatch)?))
        }
        (FieldKind::F64, V::Number(n)) => {
            sea_orm::Value::Double(Some(n.to_f64().ok_or_else(mismatch)?))
        }
        (FieldKind::Decimal, V::Number(n)) => {
            sea_orm::Value::Decimal(Some(Box::new(bigdecimal_to_decimal(n)?)))
        }
        (FieldKind::Bool, V::Bool(b)) => sea_orm::Value::Bool(Some(*b)),
        (FieldKind::Uuid, V::Uuid(u)) => sea_orm::Value::Uuid(Some(Box::new(*u))),
        (FieldKind::DateTimeUtc, V::DateTime(dt)) => {
            sea_orm::Value::ChronoDateTimeUtc(Some(Box::new(*dt)))
        }
        (FieldKind::Date, V::Date(d)) => sea_orm::Value::ChronoDate(Some(Box::new(*d))),
        (FieldKind::Time, V::Time(t)) => sea_orm::Value::ChronoTime(Some(Box::new(*t))),
        _ => return Err(mismatch()),
    })
}

fn coerce_many(kind: FieldKind, items: &[core::Expr]) -> BuildResult<Vec<sea_orm::Value>> {
    items
        .iter()
        .map(|e| match e {
            core::Expr::Value(v) => coerce(kind, v),
            _ => Err(BuildError::NonLiteralInList),
        })
        .collect()
}

/* ---------- LIKE helpers ---------- */

const LIKE_ESCAPE: char = '\\';

fn like_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '%' | '_' | LIKE_ESCAPE => {
                out.push(LIKE_ESCAPE);
                out.push(ch);
            }
            c => out.push(c),
        }
    }
    out
}

fn like_pattern(fname: &str, s: &str) -> Option<LikeExpr> {
    let escaped = like_escape(s);
    let pattern = match fname {
        FN_CONTAINS => format!("%{escaped}%"),
        FN_STARTS_WITH => format!("{escaped}%"),
        FN_ENDS_WITH => format!("%{escaped}"),
        _ => return None,
    };
    Some(LikeExpr::new(pattern).escape(LIKE_ESCAPE))
}

/* ---------- field resolution ---------- */

fn lookup<'a, E: EntityTrait>(fmap: &'a FieldMap<E>, name: &str) -> BuildResult<&'a Field<E>> {
    fmap.get(name)
        .ok_or_else(|| BuildError::UnknownField(name.to_string()))
}

/// Column as text. Text matching on a non-string column casts it first so a
/// global search over mixed columns stays valid SQL.
fn text_expr<E: EntityTrait>(f: &Field<E>) -> SimpleExpr
where
    E::Column: ColumnTrait + Copy,
{
    if f.kind == FieldKind::String {
        Expr::col(f.col).into()
    } else {
        Expr::col(f.col).cast_as(Alias::new("TEXT"))
    }
}

/// Left argument of a LIKE-style function: `field` or `tolower(field)`.
fn like_target<E: EntityTrait>(arg: &core::Expr, fmap: &FieldMap<E>) -> BuildResult<SimpleExpr>
where
    E::Column: ColumnTrait + Copy,
{
    use core::Expr as X;

    match arg {
        X::Identifier(name) => Ok(text_expr(lookup(fmap, name)?)),
        X::Function(fname, inner) if fname.eq_ignore_ascii_case(FN_TO_LOWER) => {
            match inner.as_slice() {
                [X::Identifier(name)] => Ok(Func::lower(text_expr(lookup(fmap, name)?)).into()),
                _ => Err(BuildError::UnsupportedFn(fname.clone())),
            }
        }
        _ => Err(BuildError::Other("first argument must be a field")),
    }
}

/* ---------- Expr (AST) -> Condition ---------- */

pub fn expr_to_condition<E: EntityTrait>(
    expr: &core::Expr,
    fmap: &FieldMap<E>,
) -> BuildResult<Condition>
where
    E::Column: ColumnTrait + Copy,
{
    use core::CompareOperator as Op;
    use core::Expr as X;

    Ok(match expr {
        X::And(a, b) => {
            let left = expr_to_condition::<E>(a, fmap)?;
            let right = expr_to_condition::<E>(b, fmap)?;
            Condition::all().add(left).add(right)
        }
        X::Or(a, b) => {
            let left = expr_to_condition::<E>(a, fmap)?;
            let right = expr_to_condition::<E>(b, fmap)?;
            Condition::any().add(left).add(right)
        }
        X::Not(x) => {
            let inner = expr_to_condition::<E>(x, fmap)?;
            Condition::all().not().add(inner)
        }

        // Identifier op Value
        X::Compare(l, op, r) => {
            let (name, rhs) = match (&**l, &**r) {
                (X::Identifier(name), X::Value(v)) => (name, v),
                (X::Identifier(_), X::Identifier(_)) => {
                    return Err(BuildError::Other(
                        "field-to-field comparison is not supported",
                    ))
                }
                _ => return Err(BuildError::Other("unsupported comparison form")),
            };
            let f = lookup(fmap, name)?;
            let col = f.col;

            if matches!(rhs, core::Value::Null) {
                return Ok(match op {
                    Op::Eq => Condition::all().add(Expr::col(col).is_null()),
                    Op::Ne => Condition::all().add(Expr::col(col).is_not_null()),
                    _ => return Err(BuildError::UnsupportedOp(*op)),
                });
            }

            let v = coerce(f.kind, rhs)?;
            let e = match op {
                Op::Eq => Expr::col(col).eq(v),
                Op::Ne => Expr::col(col).ne(v),
                Op::Gt => Expr::col(col).gt(v),
                Op::Ge => Expr::col(col).gte(v),
                Op::Lt => Expr::col(col).lt(v),
                Op::Le => Expr::col(col).lte(v),
            };
            Condition::all().add(e)
        }

        // Identifier IN (value, value, ...)
        X::In(l, list) => {
            let name = match &**l {
                X::Identifier(n) => n,
                _ => return Err(BuildError::Other("left side of IN must be a field")),
            };
            let f = lookup(fmap, name)?;
            let vals = coerce_many(f.kind, list)?;
            if vals.is_empty() {
                // IN () → always false
                Condition::all().add(Expr::cust("1=0"))
            } else {
                Condition::all().add(Expr::col(f.col).is_in(vals))
            }
        }

        // contains/startswith/endswith over `field` or `tolower(field)`
        X::Function(fname, args) => {
            let n = fname.to_ascii_lowercase();
            match args.as_slice() {
                [target, X::Value(core::Value::String(s))] => {
                    let pattern = like_pattern(&n, s)
                        .ok_or_else(|| BuildError::UnsupportedFn(fname.clone()))?;
                    let target = like_target(target, fmap)?;
                    Condition::all().add(Expr::expr(target).like(pattern))
                }
                _ => return Err(BuildError::UnsupportedFn(fname.clone())),
            }
        }

        // Leaf forms are not valid WHERE by themselves
        X::Identifier(name) => return Err(BuildError::BareIdentifier(name.clone())),
        X::Value(_) => return Err(BuildError::BareLiteral),
    })
}

/// Apply an optional predicate to a plain SeaORM `Select<E>`.
pub trait FilterExt<E: EntityTrait>: Sized {
    fn apply_predicate(self, expr: Option<&core::Expr>, fmap: &FieldMap<E>)
        -> BuildResult<Self>;
}

impl<E> FilterExt<E> for sea_orm::Select<E>
where
    E: EntityTrait,
    E::Column: ColumnTrait + Copy,
{
    fn apply_predicate(
        self,
        expr: Option<&core::Expr>,
        fmap: &FieldMap<E>,
    ) -> BuildResult<Self> {
        use sea_orm::QueryFilter;

        match expr {
            Some(ast) => {
                let cond = expr_to_condition::<E>(ast, fmap)?;
                Ok(self.filter(cond))
            }
            None => Ok(self),
        }
    }
}
