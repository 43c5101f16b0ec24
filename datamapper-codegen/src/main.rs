//! CLI entry point for datamapper-codegen

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use datamapper_codegen::config::CodegenConfig;
use datamapper_codegen::{FileKind, GenerationReport};

#[derive(Parser)]
#[command(name = "datamapper-codegen")]
#[command(about = "Generate PHP model and data mapper classes from a MySQL schema")]
#[command(version)]
struct Cli {
    /// Path to configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// MySQL URL to introspect (overrides config)
    #[arg(short, long, conflicts_with = "schema")]
    database_url: Option<String>,

    /// Path to SQL schema file (overrides config)
    #[arg(short, long)]
    schema: Option<PathBuf>,

    /// Directory for model classes (overrides config)
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Directory for mapper classes (defaults to the model directory)
    #[arg(long)]
    mapper_dir: Option<PathBuf>,

    /// Prefix for model class names
    #[arg(long)]
    prefix: Option<String>,

    /// Class generated models extend
    #[arg(long)]
    model_extends: Option<String>,

    /// Replace existing model files
    #[arg(long)]
    overwrite_models: bool,

    /// Keep existing mapper files
    #[arg(long)]
    keep_mappers: bool,

    /// Lowercase generated file names
    #[arg(long)]
    no_translation: bool,

    /// Dry run - show what would be generated without writing files
    #[arg(long)]
    dry_run: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate models, mappers and the runtime base
    Generate,
    /// Generate only models
    Models,
    /// Generate only mappers and the runtime base
    Mappers,
    /// Inspect schema (show tables as the generator sees them)
    Inspect {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (before logging, so we can use config.log_level)
    let mut config = CodegenConfig::load(cli.config.as_deref())?;

    // Initialize logging
    // Priority: RUST_LOG env var > config.log_level > default (debug for dev, info for release)
    let default_level = if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    };
    let log_level = config.log_level.as_deref().unwrap_or(default_level);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .init();

    // Apply CLI overrides; a source given on the command line replaces the configured one
    if let Some(url) = cli.database_url {
        config.database_url = Some(url);
        config.schema_file = None;
    }
    if let Some(schema) = cli.schema {
        config.schema_file = Some(schema);
        config.database_url = None;
    }
    if let Some(dir) = cli.model_dir {
        config.model_dir = dir;
    }
    if let Some(dir) = cli.mapper_dir {
        config.mapper_dir = Some(dir);
    }
    if let Some(prefix) = cli.prefix {
        config.model_prefix = prefix;
    }
    if let Some(class) = cli.model_extends {
        config.model_extends = Some(class);
    }
    if cli.overwrite_models {
        config.overwrite_models = true;
    }
    if cli.keep_mappers {
        config.overwrite_mappers = false;
    }
    if cli.no_translation {
        config.translation = false;
    }
    if cli.dry_run {
        config.dry_run = true;
    }

    // Apply command-specific settings
    match &cli.command {
        Some(Commands::Models) => {
            config.generate_mappers = false;
        }
        Some(Commands::Mappers) => {
            config.generate_models = false;
        }
        Some(Commands::Inspect { json }) => {
            config.validate()?;
            return inspect_schema(&config, *json).await;
        }
        _ => {}
    }

    let report = datamapper_codegen::generate(&config).await?;

    if config.dry_run {
        println!("Dry run mode - would generate:");
    }
    print_report(&report);

    info!("Code generation completed successfully");
    Ok(())
}

fn print_report(report: &GenerationReport) {
    for file in &report.files {
        let label = match file.kind {
            FileKind::Model => "Model:  ",
            FileKind::Mapper => "Mapper: ",
            FileKind::Runtime => "Runtime:",
        };
        println!("  {} {} ({})", label, file.path.display(), file.outcome);
    }
}

async fn inspect_schema(config: &CodegenConfig, json: bool) -> Result<()> {
    let tables = datamapper_codegen::read_schema(config).await?;
    let tables = datamapper_codegen::filter_tables(
        tables,
        &config.include_tables,
        &config.exclude_tables,
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&tables)?);
        return Ok(());
    }

    println!("Read {} tables:\n", tables.len());
    for table in &tables {
        println!("Table: {}", table.name);
        println!("  Columns:");
        for col in &table.columns {
            let nullable = if col.nullable { "NULL" } else { "NOT NULL" };
            let key = col.key.as_str();
            println!(
                "    - {} {} {}{}{}",
                col.name,
                col.column_type,
                nullable,
                if key.is_empty() { String::new() } else { format!(" {}", key) },
                if col.extra.is_empty() { String::new() } else { format!(" {}", col.extra) },
            );
        }
        let keys = table.primary_keys();
        if !keys.is_empty() {
            println!("  Primary Key: {:?}", keys);
        }
        println!();
    }

    Ok(())
}
