//! Main code generator orchestrator

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::{defaults, CodegenConfig};
use crate::error::{CodegenError, Result};
use crate::schema::TableSchema;

use super::mapper_generator::render_mapper;
use super::model_generator::{render_model, RESERVED_PROPERTIES};
use super::naming::{class_file_name, mapper_class_name};
use super::writer::{write_file, WriteOutcome};
use super::TemplateOptions;

/// PHP base class every generated mapper extends, shipped as-is.
pub const RUNTIME_BASE: &str = include_str!("../../templates/datamapper.php");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    Model,
    Mapper,
    Runtime,
}

/// One file the generator wrote, skipped or would write.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedFile {
    /// Source table; `None` for the runtime base
    pub table: Option<String>,
    pub kind: FileKind,
    pub path: PathBuf,
    pub outcome: WriteOutcome,
}

/// Summary of a generation run, in write order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GenerationReport {
    pub files: Vec<GeneratedFile>,
}

impl GenerationReport {
    /// Files created or overwritten
    pub fn written(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f.outcome, WriteOutcome::Created | WriteOutcome::Overwritten))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.count(WriteOutcome::Skipped)
    }

    pub fn count(&self, outcome: WriteOutcome) -> usize {
        self.files.iter().filter(|f| f.outcome == outcome).count()
    }

    pub fn of_kind(&self, kind: FileKind) -> impl Iterator<Item = &GeneratedFile> {
        self.files.iter().filter(move |f| f.kind == kind)
    }
}

/// Renders and writes the model/mapper pair of every table
pub struct CodeGenerator<'a> {
    config: &'a CodegenConfig,
    options: TemplateOptions,
}

impl<'a> CodeGenerator<'a> {
    /// Create a new code generator with the given configuration
    pub fn new(config: &'a CodegenConfig) -> Self {
        Self {
            config,
            options: TemplateOptions::from_config(config),
        }
    }

    /// Generate every enabled file kind
    pub fn generate(&self, tables: &[TableSchema]) -> Result<GenerationReport> {
        self.check_tables(tables)?;
        let mut report = GenerationReport::default();

        if self.config.generate_models {
            info!("Generating models in {:?}", self.config.model_dir);
            self.generate_models(tables, &mut report)?;
        }
        if self.config.generate_mappers {
            info!("Generating mappers in {:?}", self.config.mapper_dir());
            self.generate_mappers(tables, &mut report)?;
            self.install_runtime(&mut report)?;
        }

        Ok(report)
    }

    /// Reject tables whose classes could not coexist in one PHP application.
    ///
    /// PHP class names are case-insensitive, and without translation the
    /// file names are lowercased class names, so classes are compared
    /// lowercased. The mapper base class and the runtime file are taken
    /// up front. When models are generated, columns may not reuse the
    /// model's own properties.
    pub fn check_tables(&self, tables: &[TableSchema]) -> Result<()> {
        let mut taken: HashMap<String, String> = HashMap::new();
        taken.insert(
            self.options.mapper_extends.to_lowercase(),
            "the mapper base class".to_string(),
        );
        let runtime_stem = defaults::RUNTIME_FILE.trim_end_matches(".php");
        taken
            .entry(runtime_stem.to_lowercase())
            .or_insert_with(|| format!("the runtime file `{}`", defaults::RUNTIME_FILE));

        for table in tables {
            let reserved = table
                .columns
                .iter()
                .find(|c| RESERVED_PROPERTIES.contains(&c.name.as_str()));
            if let Some(column) = reserved.filter(|_| self.config.generate_models) {
                return Err(CodegenError::ReservedColumn {
                    table: table.name.clone(),
                    column: column.name.clone(),
                });
            }

            let model = self.options.model_class(&table.name);
            let mapper = mapper_class_name(&model);
            for (class, role) in [(model, "model"), (mapper, "mapper")] {
                let key = class.to_lowercase();
                if let Some(taken_by) = taken.get(&key) {
                    return Err(CodegenError::ClassCollision {
                        table: table.name.clone(),
                        class,
                        taken_by: taken_by.clone(),
                    });
                }
                taken.insert(key, format!("the {} of table `{}`", role, table.name));
            }
        }
        Ok(())
    }

    /// Write one model class per table; existing models are kept unless
    /// `overwrite_models` is set
    pub fn generate_models(
        &self,
        tables: &[TableSchema],
        report: &mut GenerationReport,
    ) -> Result<()> {
        for table in tables {
            let class = self.options.model_class(&table.name);
            let path = self
                .config
                .model_dir
                .join(class_file_name(&class, self.config.translation));
            let code = render_model(table, &self.options);
            self.write(
                report,
                Some(table.name.as_str()),
                FileKind::Model,
                path,
                &code,
                self.config.overwrite_models,
            )?;
        }
        Ok(())
    }

    /// Write one mapper class per table
    pub fn generate_mappers(
        &self,
        tables: &[TableSchema],
        report: &mut GenerationReport,
    ) -> Result<()> {
        for table in tables {
            let class = mapper_class_name(&self.options.model_class(&table.name));
            let path = self
                .config
                .mapper_dir()
                .join(class_file_name(&class, self.config.translation));
            let code = render_mapper(table, &self.options);
            self.write(
                report,
                Some(table.name.as_str()),
                FileKind::Mapper,
                path,
                &code,
                self.config.overwrite_mappers,
            )?;
        }
        Ok(())
    }

    /// Copy the runtime base class next to the mappers
    pub fn install_runtime(&self, report: &mut GenerationReport) -> Result<()> {
        let path = self.config.mapper_dir().join(defaults::RUNTIME_FILE);
        self.write(
            report,
            None,
            FileKind::Runtime,
            path,
            RUNTIME_BASE,
            self.config.overwrite_mappers,
        )
    }

    fn write(
        &self,
        report: &mut GenerationReport,
        table: Option<&str>,
        kind: FileKind,
        path: PathBuf,
        contents: &str,
        overwrite: bool,
    ) -> Result<()> {
        let outcome = write_file(&path, contents, overwrite, self.config.dry_run)?;
        debug!("{:?} {} -> {}", kind, path.display(), outcome);
        report.files.push(GeneratedFile {
            table: table.map(str::to_string),
            kind,
            path,
            outcome,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ColumnInfo, KeyRole};
    use std::fs;
    use tempfile::TempDir;

    fn tables() -> Vec<TableSchema> {
        let column = |name: &str, ty: &str, key: KeyRole| ColumnInfo {
            name: name.to_string(),
            column_type: ty.to_string(),
            nullable: false,
            key,
            default: None,
            extra: String::new(),
        };
        vec![TableSchema {
            name: "categories".to_string(),
            columns: vec![
                column("id", "int(11)", KeyRole::Primary),
                column("title", "varchar(80)", KeyRole::None),
            ],
        }]
    }

    fn table(name: &str, columns: &[&str]) -> TableSchema {
        TableSchema {
            name: name.to_string(),
            columns: columns
                .iter()
                .map(|c| ColumnInfo {
                    name: c.to_string(),
                    column_type: "varchar(20)".to_string(),
                    nullable: true,
                    key: KeyRole::None,
                    default: None,
                    extra: String::new(),
                })
                .collect(),
        }
    }

    fn config(dir: &TempDir) -> CodegenConfig {
        let mut config = CodegenConfig::default_with_schema(PathBuf::from("unused.sql"));
        config.model_dir = dir.path().join("models");
        config.mapper_dir = Some(dir.path().join("mappers"));
        config
    }

    #[test]
    fn test_generate_writes_pair_and_runtime() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);

        let report = CodeGenerator::new(&config).generate(&tables()).unwrap();

        assert_eq!(report.written(), 3);
        assert!(dir.path().join("models/Category.php").exists());
        assert!(dir.path().join("mappers/CategoryMapper.php").exists());
        let runtime = fs::read_to_string(dir.path().join("mappers/datamapper.php")).unwrap();
        assert_eq!(runtime, RUNTIME_BASE);
    }

    #[test]
    fn test_lowercase_file_names_without_translation() {
        let dir = TempDir::new().unwrap();
        let mut config = config(&dir);
        config.translation = false;
        config.model_prefix = "Shop".to_string();

        CodeGenerator::new(&config).generate(&tables()).unwrap();

        assert!(dir.path().join("models/shopcategory.php").exists());
        assert!(dir.path().join("mappers/shopcategorymapper.php").exists());
    }

    #[test]
    fn test_models_kept_mappers_replaced_on_rerun() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let generator = CodeGenerator::new(&config);
        generator.generate(&tables()).unwrap();

        let model = dir.path().join("models/Category.php");
        let mapper = dir.path().join("mappers/CategoryMapper.php");
        fs::write(&model, "edited").unwrap();
        fs::write(&mapper, "edited").unwrap();

        let report = generator.generate(&tables()).unwrap();

        assert_eq!(fs::read_to_string(&model).unwrap(), "edited");
        assert_ne!(fs::read_to_string(&mapper).unwrap(), "edited");
        let model_file = report.of_kind(FileKind::Model).next().unwrap();
        assert_eq!(model_file.outcome, WriteOutcome::Skipped);
        assert_eq!(report.count(WriteOutcome::Overwritten), 2);
    }

    #[test]
    fn test_models_only() {
        let dir = TempDir::new().unwrap();
        let mut config = config(&dir);
        config.generate_mappers = false;

        let report = CodeGenerator::new(&config).generate(&tables()).unwrap();

        assert_eq!(report.files.len(), 1);
        assert!(!dir.path().join("mappers").exists());
    }

    #[test]
    fn test_dry_run_reports_without_writing() {
        let dir = TempDir::new().unwrap();
        let mut config = config(&dir);
        config.dry_run = true;

        let report = CodeGenerator::new(&config).generate(&tables()).unwrap();

        assert_eq!(report.count(WriteOutcome::DryRun), 3);
        assert!(!dir.path().join("models").exists());
    }

    #[test]
    fn test_column_named_like_model_property_is_rejected() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);

        for column in ["mapper", "db"] {
            let widgets = table("widgets", &["id", column]);
            let err = CodeGenerator::new(&config).generate(&[widgets]).unwrap_err();
            assert!(
                matches!(err, CodegenError::ReservedColumn { column: ref c, .. } if c == column),
                "{}",
                column
            );
        }
        assert!(!dir.path().join("models").exists());
    }

    #[test]
    fn test_tables_sharing_a_class_are_rejected() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let generator = CodeGenerator::new(&config);

        let err = generator
            .generate(&[table("user", &["id"]), table("users", &["id"])])
            .unwrap_err();
        assert!(matches!(
            err,
            CodegenError::ClassCollision { ref table, ref class, .. } if table == "users" && class == "User"
        ));

        // a model named like another table's mapper
        let err = generator
            .check_tables(&[table("users", &["id"]), table("user_mappers", &["id"])])
            .unwrap_err();
        assert!(matches!(err, CodegenError::ClassCollision { ref class, .. } if class == "UserMapper"));

        // the shipped base class and runtime file
        let err = generator
            .check_tables(&[table("data_mappers", &["id"])])
            .unwrap_err();
        assert!(matches!(err, CodegenError::ClassCollision { ref class, .. } if class == "DataMapper"));

        assert!(!dir.path().join("models").exists());
    }

    #[test]
    fn test_prefix_avoids_base_class_collision() {
        let dir = TempDir::new().unwrap();
        let mut config = config(&dir);
        config.model_prefix = "Shop".to_string();

        CodeGenerator::new(&config)
            .check_tables(&[table("data_mappers", &["id"]), table("users", &["id"])])
            .unwrap();
    }

    #[test]
    fn test_runtime_base_guards_keyless_tables_and_compares_strictly() {
        let guard = "if (!count($this->primary_keys)) {";
        assert!(RUNTIME_BASE.contains(guard));
        // called from the clause builder and the select by key
        assert_eq!(RUNTIME_BASE.matches("$this->requirePrimaryKey();").count(), 2);

        // '007' == '7' holds in PHP, so changes are detected on strings
        assert!(RUNTIME_BASE.contains("(string) $current === (string) $stored"));
        assert!(!RUNTIME_BASE.contains("$current == $stored"));
    }
}
