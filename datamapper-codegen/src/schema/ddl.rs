//! Offline schema source: `CREATE TABLE` DDL parsed with sqlparser-rs
//!
//! Produces the same column metadata a live `DESCRIBE` would, so generation
//! does not need a running server.

use std::path::Path;

use async_trait::async_trait;
use sqlparser::ast::{
    ColumnDef, ColumnOption, CreateTable, Expr, ForeignKeyConstraint, Ident, IndexColumn,
    IndexConstraint, ObjectName, PrimaryKeyConstraint, Statement, TableConstraint,
    UniqueConstraint,
};
use sqlparser::dialect::MySqlDialect;
use sqlparser::parser::Parser;
use tracing::debug;

use super::metadata::{ColumnInfo, KeyRole, TableSchema};
use super::SchemaSource;
use crate::error::{CodegenError, Result};

/// Reads table schemas from DDL text.
#[derive(Debug, Clone)]
pub struct DdlSchemaReader {
    sql: String,
}

impl DdlSchemaReader {
    pub fn new(sql: impl Into<String>) -> Self {
        Self { sql: sql.into() }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        Ok(Self::new(std::fs::read_to_string(path)?))
    }

    /// Parse every `CREATE TABLE` statement; other statements are ignored.
    pub fn parse(&self) -> Result<Vec<TableSchema>> {
        let statements = Parser::parse_sql(&MySqlDialect {}, &self.sql)?;

        let mut tables = Vec::new();
        for stmt in statements {
            if let Statement::CreateTable(create_table) = stmt {
                let table = table_schema(&create_table)?;
                debug!(table = %table.name, columns = table.columns.len(), "parsed table");
                tables.push(table);
            }
        }
        Ok(tables)
    }
}

#[async_trait]
impl SchemaSource for DdlSchemaReader {
    async fn read_tables(&self) -> Result<Vec<TableSchema>> {
        self.parse()
    }
}

fn table_schema(create: &CreateTable) -> Result<TableSchema> {
    let name = table_name(&create.name);
    let mut columns: Vec<ColumnInfo> = create.columns.iter().map(column_info).collect();

    if columns.is_empty() {
        return Err(CodegenError::EmptyTable(name));
    }

    for constraint in &create.constraints {
        match constraint {
            TableConstraint::PrimaryKey(PrimaryKeyConstraint { columns: keys, .. }) => {
                for key in keys {
                    if let Some(col) = find_column(&mut columns, &index_column_name(key)) {
                        col.key = KeyRole::Primary;
                        col.nullable = false;
                    }
                }
            }
            TableConstraint::Unique(UniqueConstraint { columns: keys, .. }) => {
                // DESCRIBE shows UNI only for single-column unique indexes
                let role = if keys.len() == 1 {
                    KeyRole::Unique
                } else {
                    KeyRole::Multiple
                };
                if let Some(first) = keys.first() {
                    promote(&mut columns, &index_column_name(first), role);
                }
            }
            TableConstraint::Index(IndexConstraint { columns: keys, .. }) => {
                if let Some(first) = keys.first() {
                    promote(&mut columns, &index_column_name(first), KeyRole::Multiple);
                }
            }
            TableConstraint::ForeignKey(ForeignKeyConstraint { columns: keys, .. }) => {
                if let Some(first) = keys.first() {
                    promote(&mut columns, &ident(first), KeyRole::Multiple);
                }
            }
            _ => {}
        }
    }

    Ok(TableSchema { name, columns })
}

fn column_info(col_def: &ColumnDef) -> ColumnInfo {
    let mut column = ColumnInfo {
        name: ident(&col_def.name),
        column_type: col_def.data_type.to_string().to_lowercase(),
        nullable: true,
        key: KeyRole::None,
        default: None,
        extra: String::new(),
    };

    for option in &col_def.options {
        match &option.option {
            ColumnOption::NotNull => column.nullable = false,
            ColumnOption::Null => column.nullable = true,
            ColumnOption::Default(expr) => column.default = default_value(expr),
            ColumnOption::PrimaryKey(_) => {
                column.key = KeyRole::Primary;
                column.nullable = false;
            }
            ColumnOption::Unique(_) => column.key = column.key.max(KeyRole::Unique),
            ColumnOption::DialectSpecific(tokens) => {
                let is_auto = tokens
                    .iter()
                    .any(|t| t.to_string().eq_ignore_ascii_case("AUTO_INCREMENT"));
                if is_auto {
                    column.extra = "auto_increment".to_string();
                }
            }
            _ => {}
        }
    }

    column
}

/// Default as the server reports it: unquoted, with `NULL` meaning none.
fn default_value(expr: &Expr) -> Option<String> {
    let text = expr.to_string();
    if text.eq_ignore_ascii_case("NULL") {
        return None;
    }
    let unquoted = text
        .strip_prefix('\'')
        .and_then(|t| t.strip_suffix('\''))
        .map(|t| t.replace("''", "'"));
    Some(unquoted.unwrap_or(text))
}

fn find_column<'a>(columns: &'a mut [ColumnInfo], name: &str) -> Option<&'a mut ColumnInfo> {
    columns.iter_mut().find(|c| c.name == name)
}

fn promote(columns: &mut [ColumnInfo], name: &str, role: KeyRole) {
    if let Some(col) = find_column(columns, name) {
        col.key = col.key.max(role);
    }
}

fn table_name(name: &ObjectName) -> String {
    name.0
        .last()
        .and_then(|part| part.as_ident())
        .map(|ident| ident.value.clone())
        .unwrap_or_default()
}

fn ident(ident: &Ident) -> String {
    ident.value.clone()
}

fn index_column_name(ic: &IndexColumn) -> String {
    match &ic.column.expr {
        Expr::Identifier(ident) => ident.value.clone(),
        other => other.to_string(),
    }
}
