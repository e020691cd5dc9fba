use thiserror::Error;

/// Failure of a grid query.
///
/// The adapter never returns this to its caller; it is carried in
/// [`DataTablesOutput::error`](crate::DataTablesOutput::error) and rendered as
/// a string on the wire.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("invalid predicate: {0}")]
    InvalidPredicate(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("database error: {0}")]
    Db(String),
}

pub type Result<T> = std::result::Result<T, Error>;
