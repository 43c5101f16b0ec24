//! Pool trait for database connection pools

use crate::error::Result;
use crate::traits::FromRow;
use crate::value::Value;
use async_trait::async_trait;

/// Result of a statement execution
#[derive(Debug, Clone, Default)]
pub struct ExecuteResult {
    /// Number of rows affected by the statement
    pub rows_affected: u64,
    /// Last insert ID (for INSERT statements)
    pub last_insert_id: Option<u64>,
}

/// Trait for database connection pools.
///
/// The runtime mapper and the schema reader only talk to this trait, so
/// either can run against a stand-in pool in tests.
#[async_trait]
pub trait Pool: Send + Sync {
    /// Execute a statement and report affected rows.
    async fn execute(&self, sql: &str, params: Vec<Value>) -> Result<ExecuteResult>;

    /// Fetch all rows matching the query.
    async fn fetch_all<T: FromRow + Send>(&self, sql: &str, params: Vec<Value>) -> Result<Vec<T>>;

    /// Fetch a single optional row.
    async fn fetch_optional<T: FromRow + Send>(
        &self,
        sql: &str,
        params: Vec<Value>,
    ) -> Result<Option<T>>;
}
