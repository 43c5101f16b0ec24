//! Query builder for datamapper

use crate::error::Result;
use crate::traits::{ExecuteResult, FromRow, Pool};
use crate::value::Value;

/// A SQL string with positionally bound parameters.
///
/// ```ignore
/// use datamapper::{Query, Record};
///
/// let row: Option<Record> = Query::new("SELECT * FROM `users` WHERE `id` = ?")
///     .bind(7i64)
///     .fetch_optional(&pool)
///     .await?;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    sql: String,
    params: Vec<Value>,
}

impl Query {
    /// Create a new query with the given SQL.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Create a query with its parameters already collected.
    pub fn with_params(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    /// Bind a single value, replacing the next `?` placeholder.
    pub fn bind(mut self, value: impl Into<Value>) -> Self {
        self.params.push(value.into());
        self
    }

    /// Get the SQL string.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Get the bound parameters.
    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Execute the statement.
    pub async fn execute<P: Pool>(self, pool: &P) -> Result<ExecuteResult> {
        pool.execute(&self.sql, self.params).await
    }

    /// Fetch all matching rows.
    pub async fn fetch_all<T: FromRow + Send, P: Pool>(self, pool: &P) -> Result<Vec<T>> {
        pool.fetch_all(&self.sql, self.params).await
    }

    /// Fetch a single optional row.
    pub async fn fetch_optional<T: FromRow + Send, P: Pool>(self, pool: &P) -> Result<Option<T>> {
        pool.fetch_optional(&self.sql, self.params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_appends_in_placeholder_order() {
        let query = Query::new("UPDATE `users` SET `email` = ?, `age` = ? WHERE `id` = ?")
            .bind(None::<String>)
            .bind(41i32)
            .bind(7u64);

        assert_eq!(query.params(), &[Value::Null, Value::Int(41), Value::UInt(7)]);
    }
}
