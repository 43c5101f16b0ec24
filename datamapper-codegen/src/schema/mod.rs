//! Schema sources: a live MySQL database or a DDL file

mod ddl;
mod metadata;
mod mysql;

pub use ddl::DdlSchemaReader;
pub use metadata::{ColumnInfo, KeyRole, TableSchema};
pub use mysql::MySqlSchemaReader;

use async_trait::async_trait;

use crate::error::Result;

/// Something that can list tables with their ordered column metadata.
#[async_trait]
pub trait SchemaSource: Send + Sync {
    /// Every table in source order (`SHOW TABLES` order, or statement order for DDL).
    async fn read_tables(&self) -> Result<Vec<TableSchema>>;
}
