//! Error types for datamapper

use thiserror::Error;

/// Result type alias for datamapper operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the database layer and the runtime mapper
#[derive(Error, Debug)]
pub enum Error {
    /// MySQL driver error
    #[error("MySQL error: {0}")]
    MySql(#[from] mysql_async::Error),

    /// Type conversion error
    #[error("Type conversion error: expected {expected}, got {actual}")]
    TypeConversion {
        expected: &'static str,
        actual: String,
    },

    /// Column not found in row
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// Query execution error
    #[error("Query error: {0}")]
    Query(String),

    /// Connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Load arguments matched neither the field list nor the primary key
    #[error("Load args for `{table}` match neither all fields nor the primary key")]
    LoadArgs { table: String },

    /// Data given to fill a model lacks a mapped field
    #[error("`{field}` is not set in data provided for `{table}`")]
    MissingField { table: String, field: String },

    /// No row matched the primary key
    #[error("Could not load row from `{table}`")]
    NotFound { table: String },

    /// The mapper has no snapshot of the primary key (model never loaded or saved)
    #[error("Model for `{table}` was not loaded: no value for primary key `{key}`")]
    NotLoaded { table: String, key: String },

    /// The table has no primary key, so a stored row cannot be addressed
    #[error("`{table}` has no primary key; rows can only be inserted")]
    NoPrimaryKey { table: String },

    /// Insert into a table without auto-generated key lacks the key value
    #[error("Primary key `{key}` of `{table}` is not auto created, but no value is set in the model")]
    MissingPrimaryKey { table: String, key: String },
}
