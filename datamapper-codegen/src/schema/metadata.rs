//! Table and column metadata in the shape `DESCRIBE` reports it

use serde::{Deserialize, Serialize};

/// Index role of a column, from the `Key` column of `DESCRIBE`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyRole {
    #[default]
    None,
    /// `MUL`: first column of a non-unique index
    Multiple,
    /// `UNI`
    Unique,
    /// `PRI`
    Primary,
}

impl KeyRole {
    /// Parse the `Key` value of a `DESCRIBE` row.
    pub fn parse(key: &str) -> Self {
        match key.trim().to_ascii_uppercase().as_str() {
            "PRI" => KeyRole::Primary,
            "UNI" => KeyRole::Unique,
            "MUL" => KeyRole::Multiple,
            _ => KeyRole::None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            KeyRole::None => "",
            KeyRole::Multiple => "MUL",
            KeyRole::Unique => "UNI",
            KeyRole::Primary => "PRI",
        }
    }
}

/// Metadata for a column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Column name
    pub name: String,

    /// Lowercased SQL type, e.g. `int(10) unsigned`, `varchar(255)`
    pub column_type: String,

    pub nullable: bool,

    pub key: KeyRole,

    /// Default value as reported by the server (`None` for no default or NULL)
    pub default: Option<String>,

    /// Extra attributes, e.g. `auto_increment`
    pub extra: String,
}

impl ColumnInfo {
    pub fn is_primary_key(&self) -> bool {
        self.key == KeyRole::Primary
    }

    pub fn is_auto_increment(&self) -> bool {
        self.extra.to_ascii_lowercase().contains("auto_increment")
    }
}

/// Metadata for a database table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Table name
    pub name: String,

    /// Columns in table order
    pub columns: Vec<ColumnInfo>,
}

impl TableSchema {
    /// Get a column by name
    pub fn column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Primary-key column names, in column order
    pub fn primary_keys(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.is_primary_key())
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Check if a column is part of the primary key
    pub fn is_primary_key_column(&self, name: &str) -> bool {
        self.column(name).is_some_and(ColumnInfo::is_primary_key)
    }

    /// Whether the primary key is generated by the server
    pub fn has_auto_primary_key(&self) -> bool {
        self.columns
            .iter()
            .any(|c| c.is_primary_key() && c.is_auto_increment())
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str, key: &str, extra: &str) -> ColumnInfo {
        ColumnInfo {
            name: name.to_string(),
            column_type: "int(11)".to_string(),
            nullable: false,
            key: KeyRole::parse(key),
            default: None,
            extra: extra.to_string(),
        }
    }

    #[test]
    fn test_key_role_parse() {
        assert_eq!(KeyRole::parse("PRI"), KeyRole::Primary);
        assert_eq!(KeyRole::parse("uni"), KeyRole::Unique);
        assert_eq!(KeyRole::parse("MUL"), KeyRole::Multiple);
        assert_eq!(KeyRole::parse(""), KeyRole::None);
    }

    #[test]
    fn test_primary_keys_in_column_order() {
        let table = TableSchema {
            name: "order_items".to_string(),
            columns: vec![
                column("order_id", "PRI", ""),
                column("quantity", "", ""),
                column("product_id", "PRI", ""),
            ],
        };
        assert_eq!(table.primary_keys(), vec!["order_id", "product_id"]);
        assert!(!table.has_auto_primary_key());
    }

    #[test]
    fn test_auto_primary_key() {
        let table = TableSchema {
            name: "users".to_string(),
            columns: vec![column("id", "PRI", "auto_increment"), column("name", "", "")],
        };
        assert!(table.has_auto_primary_key());
        assert!(table.is_primary_key_column("id"));
        assert!(!table.is_primary_key_column("name"));
    }
}
