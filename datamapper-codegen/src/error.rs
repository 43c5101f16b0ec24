//! Error types for datamapper-codegen

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for datamapper-codegen operations
pub type Result<T> = std::result::Result<T, CodegenError>;

/// Errors that can occur while reading a schema or generating classes
#[derive(Error, Debug)]
pub enum CodegenError {
    #[error("Failed to parse SQL schema: {0}")]
    ParseError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] datamapper::Error),

    #[error("Failed to describe table `{table}`: {source}")]
    Describe {
        table: String,
        #[source]
        source: datamapper::Error,
    },

    #[error("Table `{0}` has no columns")]
    EmptyTable(String),

    #[error("Column `{column}` of table `{table}` clashes with a property every model declares")]
    ReservedColumn { table: String, column: String },

    #[error("Table `{table}` maps to class `{class}`, already taken by {taken_by}")]
    ClassCollision {
        table: String,
        class: String,
        taken_by: String,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<sqlparser::parser::ParserError> for CodegenError {
    fn from(err: sqlparser::parser::ParserError) -> Self {
        CodegenError::ParseError(err.to_string())
    }
}

impl From<config::ConfigError> for CodegenError {
    fn from(err: config::ConfigError) -> Self {
        CodegenError::ConfigError(err.to_string())
    }
}
