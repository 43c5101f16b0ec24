//! datamapper-codegen: generate PHP model and data mapper classes from a MySQL schema
//!
//! The schema comes either from a live server (`SHOW TABLES` + `DESCRIBE`)
//! or from a file of `CREATE TABLE` statements parsed with `sqlparser-rs`.
//! For every table the generator writes:
//!
//! - a model class (`User.php`) with one property per column, accessors,
//!   and lazy accessors for `*_id` relations;
//! - a mapper class (`UserMapper.php`) describing the table to the
//!   `DataMapper` runtime base, which is copied next to the mappers.
//!
//! # Programmatic use
//!
//! ```rust,ignore
//! let report = datamapper_codegen::CodegenBuilder::from_database("mysql://root@localhost/shop")
//!     .model_dir("app/models")
//!     .mapper_dir("app/mappers")
//!     .model_prefix("Shop")
//!     .generate()
//!     .await?;
//! println!("{} files written", report.written());
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! datamapper-codegen --schema schema.sql --model-dir ./models generate
//! ```

pub mod codegen;
pub mod config;
pub mod error;
pub mod schema;

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, info};

pub use codegen::{CodeGenerator, FileKind, GeneratedFile, GenerationReport, WriteOutcome};
pub use config::CodegenConfig;
pub use error::{CodegenError, Result};
pub use schema::{DdlSchemaReader, MySqlSchemaReader, SchemaSource, TableSchema};

/// Main entry point for code generation
pub async fn generate(config: &CodegenConfig) -> Result<GenerationReport> {
    config.validate()?;

    let tables = read_schema(config).await?;
    let tables = filter_tables(tables, &config.include_tables, &config.exclude_tables);
    debug!(
        "After filtering: {} tables (include={}, exclude={})",
        tables.len(),
        config.include_tables,
        config.exclude_tables
    );

    let report = CodeGenerator::new(config).generate(&tables)?;
    info!(
        "Code generation complete: {} written, {} skipped",
        report.written(),
        report.skipped()
    );
    Ok(report)
}

/// Open the schema source named by the configuration
pub fn schema_source(config: &CodegenConfig) -> Result<Box<dyn SchemaSource>> {
    match (&config.database_url, &config.schema_file) {
        (Some(url), _) => {
            info!("Reading schema from database");
            Ok(Box::new(MySqlSchemaReader::connect(url)?))
        }
        (None, Some(path)) => {
            info!("Parsing schema: {:?}", path);
            Ok(Box::new(DdlSchemaReader::from_file(path)?))
        }
        (None, None) => Err(CodegenError::ValidationError(
            "either database_url or schema_file is required".into(),
        )),
    }
}

/// Read every table from the configured source, unfiltered
pub async fn read_schema(config: &CodegenConfig) -> Result<Vec<TableSchema>> {
    let source = schema_source(config)?;
    let tables = source.read_tables().await?;
    info!("Found {} tables", tables.len());
    Ok(tables)
}

/// Filter tables based on include/exclude patterns
pub fn filter_tables(tables: Vec<TableSchema>, include: &str, exclude: &str) -> Vec<TableSchema> {
    let include_all = include.trim() == "*" || include.trim().is_empty();
    let include_set: HashSet<&str> = if include_all {
        HashSet::new()
    } else {
        include.split(',').map(str::trim).collect()
    };
    let exclude_set: HashSet<&str> = exclude
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    tables
        .into_iter()
        .filter(|t| {
            let name = t.name.as_str();
            let included = include_all || include_set.contains(name);
            included && !exclude_set.contains(name)
        })
        .collect()
}

/// Builder for configuring a run in code
pub struct CodegenBuilder {
    config: CodegenConfig,
}

impl CodegenBuilder {
    /// Read the schema from a DDL file
    pub fn new(schema_file: impl AsRef<Path>) -> Self {
        Self {
            config: CodegenConfig::default_with_schema(schema_file.as_ref().to_path_buf()),
        }
    }

    /// Read the schema from a live database
    pub fn from_database(database_url: &str) -> Self {
        Self {
            config: CodegenConfig::default_with_database(database_url),
        }
    }

    /// Set the model directory (also used for mappers unless set separately)
    pub fn model_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.config.model_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn mapper_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.config.mapper_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn model_prefix(mut self, prefix: &str) -> Self {
        self.config.model_prefix = prefix.to_string();
        self
    }

    /// Class every model extends
    pub fn model_extends(mut self, class: &str) -> Self {
        self.config.model_extends = Some(class.to_string());
        self
    }

    /// Class every mapper extends (default `DataMapper`)
    pub fn mapper_extends(mut self, class: &str) -> Self {
        self.config.mapper_extends = class.to_string();
        self
    }

    /// Keep class casing in file names (default) or lowercase them
    pub fn translation(mut self, translation: bool) -> Self {
        self.config.translation = translation;
        self
    }

    pub fn overwrite_models(mut self, overwrite: bool) -> Self {
        self.config.overwrite_models = overwrite;
        self
    }

    pub fn overwrite_mappers(mut self, overwrite: bool) -> Self {
        self.config.overwrite_mappers = overwrite;
        self
    }

    /// Set tables to include
    pub fn include_tables(mut self, tables: &[&str]) -> Self {
        self.config.include_tables = tables.join(",");
        self
    }

    /// Set tables to exclude
    pub fn exclude_tables(mut self, tables: &[&str]) -> Self {
        self.config.exclude_tables = tables.join(",");
        self
    }

    /// Generate only models, no mappers
    pub fn models_only(mut self) -> Self {
        self.config.generate_mappers = false;
        self
    }

    /// Generate only mappers and the runtime base, no models
    pub fn mappers_only(mut self) -> Self {
        self.config.generate_models = false;
        self
    }

    /// Enable dry run mode (report without writing files)
    pub fn dry_run(mut self) -> Self {
        self.config.dry_run = true;
        self
    }

    pub fn config(&self) -> &CodegenConfig {
        &self.config
    }

    /// Generate the code
    pub async fn generate(self) -> Result<GenerationReport> {
        generate(&self.config).await
    }
}
