//! Server-side processing for DataTables-style grids.
//!
//! The crate is transport- and persistence-agnostic: it defines the grid
//! request/response shapes, a small predicate AST, the translation of a grid
//! request into a predicate plus a [`Pageable`], and the
//! [`DataTablesRepository`] adapter that drives an [`EntitySource`] port.
//! Backends (see `datatables-db`) compile the AST into their own query types.

pub mod config;
pub mod error;
pub mod mapping;
pub mod page;
pub mod repository;
pub mod translate;

pub use config::DataTablesConfig;
pub use error::{Error, Result};
pub use mapping::{Column, DataTablesInput, DataTablesOutput, Order, Search};
pub use page::{OrderKey, Page, Pageable, SortDir};
pub use repository::{DataTablesRepository, EntitySource};

pub mod ast {
    use bigdecimal::BigDecimal;
    use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
    use uuid::Uuid;

    /// Function names understood by backends.
    pub const FN_CONTAINS: &str = "contains";
    pub const FN_STARTS_WITH: &str = "startswith";
    pub const FN_ENDS_WITH: &str = "endswith";
    pub const FN_TO_LOWER: &str = "tolower";

    #[derive(Clone, Debug, PartialEq)]
    pub enum Expr {
        And(Box<Expr>, Box<Expr>),
        Or(Box<Expr>, Box<Expr>),
        Not(Box<Expr>),
        Compare(Box<Expr>, CompareOperator, Box<Expr>),
        In(Box<Expr>, Vec<Expr>),
        Function(String, Vec<Expr>),
        Identifier(String),
        Value(Value),
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum CompareOperator {
        Eq,
        Ne,
        Gt,
        Ge,
        Lt,
        Le,
    }

    #[derive(Clone, Debug, PartialEq)]
    pub enum Value {
        Null,
        Bool(bool),
        Number(BigDecimal),
        Uuid(Uuid),
        DateTime(DateTime<Utc>),
        Date(NaiveDate),
        Time(NaiveTime),
        String(String),
    }

    impl From<bool> for Value {
        fn from(b: bool) -> Self {
            Value::Bool(b)
        }
    }

    impl From<i32> for Value {
        fn from(n: i32) -> Self {
            Value::Number(BigDecimal::from(n))
        }
    }

    impl From<i64> for Value {
        fn from(n: i64) -> Self {
            Value::Number(BigDecimal::from(n))
        }
    }

    impl From<u64> for Value {
        fn from(n: u64) -> Self {
            Value::Number(BigDecimal::from(n))
        }
    }

    impl From<BigDecimal> for Value {
        fn from(n: BigDecimal) -> Self {
            Value::Number(n)
        }
    }

    impl From<&str> for Value {
        fn from(s: &str) -> Self {
            Value::String(s.to_owned())
        }
    }

    impl From<String> for Value {
        fn from(s: String) -> Self {
            Value::String(s)
        }
    }

    impl From<Uuid> for Value {
        fn from(u: Uuid) -> Self {
            Value::Uuid(u)
        }
    }

    impl From<DateTime<Utc>> for Value {
        fn from(dt: DateTime<Utc>) -> Self {
            Value::DateTime(dt)
        }
    }

    impl From<NaiveDate> for Value {
        fn from(d: NaiveDate) -> Self {
            Value::Date(d)
        }
    }

    impl From<NaiveTime> for Value {
        fn from(t: NaiveTime) -> Self {
            Value::Time(t)
        }
    }

    /// Builder helpers, e.g. `Expr::field("age").ge(18).and(Expr::field("active").equals(true))`.
    impl Expr {
        pub fn field(name: impl Into<String>) -> Self {
            Expr::Identifier(name.into())
        }

        pub fn value(v: impl Into<Value>) -> Self {
            Expr::Value(v.into())
        }

        fn compare(self, op: CompareOperator, rhs: impl Into<Value>) -> Self {
            Expr::Compare(Box::new(self), op, Box::new(Expr::Value(rhs.into())))
        }

        pub fn equals(self, rhs: impl Into<Value>) -> Self {
            self.compare(CompareOperator::Eq, rhs)
        }

        pub fn not_equals(self, rhs: impl Into<Value>) -> Self {
            self.compare(CompareOperator::Ne, rhs)
        }

        pub fn gt(self, rhs: impl Into<Value>) -> Self {
            self.compare(CompareOperator::Gt, rhs)
        }

        pub fn ge(self, rhs: impl Into<Value>) -> Self {
            self.compare(CompareOperator::Ge, rhs)
        }

        pub fn lt(self, rhs: impl Into<Value>) -> Self {
            self.compare(CompareOperator::Lt, rhs)
        }

        pub fn le(self, rhs: impl Into<Value>) -> Self {
            self.compare(CompareOperator::Le, rhs)
        }

        pub fn is_null(self) -> Self {
            self.compare(CompareOperator::Eq, Value::Null)
        }

        pub fn is_in<I, V>(self, values: I) -> Self
        where
            I: IntoIterator<Item = V>,
            V: Into<Value>,
        {
            Expr::In(
                Box::new(self),
                values.into_iter().map(|v| Expr::Value(v.into())).collect(),
            )
        }

        pub fn and(self, other: Expr) -> Self {
            Expr::And(Box::new(self), Box::new(other))
        }

        pub fn or(self, other: Expr) -> Self {
            Expr::Or(Box::new(self), Box::new(other))
        }

        pub fn negate(self) -> Self {
            Expr::Not(Box::new(self))
        }

        /// `contains(field, term)`; the backend escapes LIKE wildcards.
        pub fn contains(field: impl Into<String>, term: impl Into<String>) -> Self {
            Expr::Function(
                FN_CONTAINS.to_owned(),
                vec![
                    Expr::Identifier(field.into()),
                    Expr::Value(Value::String(term.into())),
                ],
            )
        }

        /// `contains(tolower(field), lower(term))`.
        pub fn contains_ignore_case(field: impl Into<String>, term: &str) -> Self {
            Expr::Function(
                FN_CONTAINS.to_owned(),
                vec![
                    Expr::Function(
                        FN_TO_LOWER.to_owned(),
                        vec![Expr::Identifier(field.into())],
                    ),
                    Expr::Value(Value::String(term.to_lowercase())),
                ],
            )
        }
    }
}

/// Optional filter expression. `None` matches every row.
///
/// Combining follows boolean-builder semantics: an absent operand is a no-op,
/// so `p.and(None)` is `p` and `Predicate::all([None, None])` is `None`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Predicate(pub Option<Box<ast::Expr>>);

impl Predicate {
    pub fn none() -> Self {
        Self(None)
    }
    pub fn some(expr: ast::Expr) -> Self {
        Self(Some(Box::new(expr)))
    }
    pub fn as_ast(&self) -> Option<&ast::Expr> {
        self.0.as_deref()
    }
    pub fn into_ast(self) -> Option<ast::Expr> {
        self.0.map(|b| *b)
    }
    pub fn is_some(&self) -> bool {
        self.0.is_some()
    }
    pub fn is_none(&self) -> bool {
        self.0.is_none()
    }

    /// AND `other` into this predicate.
    pub fn and(self, other: impl Into<Predicate>) -> Self {
        match (self.into_ast(), other.into().into_ast()) {
            (Some(a), Some(b)) => Predicate::some(a.and(b)),
            (a, b) => a.or(b).into(),
        }
    }

    /// OR `other` into this predicate. An absent side contributes nothing,
    /// it does not turn the disjunction into "match everything".
    pub fn or(self, other: impl Into<Predicate>) -> Self {
        match (self.into_ast(), other.into().into_ast()) {
            (Some(a), Some(b)) => Predicate::some(a.or(b)),
            (a, b) => a.or(b).into(),
        }
    }

    /// Conjunction of every present operand.
    pub fn all<I, P>(items: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Predicate>,
    {
        items
            .into_iter()
            .fold(Predicate::none(), |acc, p| acc.and(p))
    }

    /// Disjunction of every present operand.
    pub fn any<I, P>(items: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Predicate>,
    {
        items.into_iter().fold(Predicate::none(), |acc, p| acc.or(p))
    }
}

impl From<Option<ast::Expr>> for Predicate {
    fn from(opt: Option<ast::Expr>) -> Self {
        match opt {
            Some(e) => Predicate::some(e),
            None => Predicate::none(),
        }
    }
}

impl From<ast::Expr> for Predicate {
    fn from(e: ast::Expr) -> Self {
        Predicate::some(e)
    }
}
