//! MySQL to PHP type mapping

use std::fmt;

/// PHP type used in `@var`, `@param` and `@return` annotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhpType {
    Int,
    Float,
    String,
}

impl PhpType {
    /// Map a MySQL column type such as `int(10) unsigned` or `DECIMAL(8,2)`.
    ///
    /// Only the leading type keyword matters. Anything that is not an
    /// integer or a real number (dates, text, blobs, enums, json) is a string.
    pub fn resolve(column_type: &str) -> Self {
        let base = base_type(column_type);
        match base.as_str() {
            "tinyint" | "smallint" | "mediumint" | "int" | "integer" | "bigint" | "bit"
            | "bool" | "boolean" | "year" => PhpType::Int,
            "float" | "real" | "double" | "decimal" | "numeric" | "dec" | "fixed" => {
                PhpType::Float
            }
            _ => PhpType::String,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PhpType::Int => "int",
            PhpType::Float => "float",
            PhpType::String => "string",
        }
    }
}

impl fmt::Display for PhpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Leading keyword of a column type, lowercased: `INT(11) UNSIGNED` -> `int`
fn base_type(column_type: &str) -> String {
    column_type
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect::<String>()
        .to_ascii_lowercase()
}
