//! FromRow trait for mapping result rows to Rust values

use crate::error::Result;
use crate::value::Value;

/// A result row that can be queried by column name.
pub trait Row {
    /// Get a value from the row by column name.
    ///
    /// Returns an error if the column doesn't exist.
    fn get_value(&self, column: &str) -> Result<Value>;

    /// Column names in result-set order.
    fn columns(&self) -> Vec<&str>;
}

/// Extension trait for typed access to row values.
pub trait RowExt: Row {
    /// Get a typed value from the row by column name.
    fn get<T: crate::FromValue>(&self, column: &str) -> Result<T> {
        let value = self.get_value(column)?;
        T::from_value(value)
    }

    /// Get a typed value from the row by position.
    ///
    /// `SHOW TABLES` names its only column after the database, so callers
    /// that cannot know the column name read it positionally.
    fn get_at<T: crate::FromValue>(&self, index: usize) -> Result<T> {
        let column = self
            .columns()
            .get(index)
            .map(|c| c.to_string())
            .ok_or_else(|| crate::Error::ColumnNotFound(format!("#{}", index)))?;
        self.get(&column)
    }
}

impl<R: Row> RowExt for R {}

/// Trait for types that can be constructed from a result row.
///
/// Usually implemented through `#[derive(FromRow)]`.
///
/// ```ignore
/// use datamapper::FromRow;
///
/// #[derive(FromRow)]
/// pub struct TableName {
///     #[datamapper(column = "Tables_in_shop")]
///     pub name: String,
/// }
/// ```
pub trait FromRow: Sized {
    /// Construct an instance of this type from a row.
    fn from_row<R: Row>(row: &R) -> Result<Self>;

    /// Column names this type reads.
    ///
    /// Types that take whatever columns a row carries return an empty slice.
    fn column_names() -> &'static [&'static str];
}
