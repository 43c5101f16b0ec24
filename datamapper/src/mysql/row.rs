//! MySQL row implementation

use crate::error::{Error, Result};
use crate::traits::Row;
use crate::value::Value;
use mysql_async::Row as MySqlAsyncRow;

use super::types::from_mysql_value;

/// A decoded MySQL row.
///
/// Keeps the result-set column order, which `SHOW TABLES` and dynamic
/// records rely on.
#[derive(Debug, Clone)]
pub struct MySqlRow {
    values: Vec<(String, Value)>,
}

impl MySqlRow {
    /// Create a new MySqlRow from a mysql_async Row.
    pub fn from_mysql_row(row: MySqlAsyncRow) -> Result<Self> {
        let columns = row.columns_ref();
        let mut values = Vec::with_capacity(columns.len());

        for (i, column) in columns.iter().enumerate() {
            let column_name = column.name_str().to_string();
            let mysql_value = row
                .as_ref(i)
                .ok_or_else(|| Error::ColumnNotFound(column_name.clone()))?
                .clone();
            values.push((column_name, from_mysql_value(mysql_value)?));
        }

        Ok(Self { values })
    }
}

impl Row for MySqlRow {
    fn get_value(&self, column: &str) -> Result<Value> {
        self.values
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.clone())
            .ok_or_else(|| Error::ColumnNotFound(column.to_string()))
    }

    fn columns(&self) -> Vec<&str> {
        self.values.iter().map(|(name, _)| name.as_str()).collect()
    }
}
