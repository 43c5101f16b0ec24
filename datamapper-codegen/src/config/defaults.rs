//! Default configuration values - single source of truth

/// Default include tables pattern (all tables)
pub const INCLUDE_TABLES: &str = "*";

/// Default exclude tables pattern (none)
pub const EXCLUDE_TABLES: &str = "";

/// Default directory for model classes
pub const MODEL_DIR: &str = "./models";

/// Default prefix for model class names (none)
pub const MODEL_PREFIX: &str = "";

/// Base class every generated mapper extends
pub const MAPPER_EXTENDS: &str = "DataMapper";

/// Keep class-name casing in file names
pub const TRANSLATION: bool = true;

/// Models are hand-edited after generation, so they are kept by default
pub const OVERWRITE_MODELS: bool = false;

/// Mappers hold no user code and are regenerated by default
pub const OVERWRITE_MAPPERS: bool = true;

pub const GENERATE_MODELS: bool = true;

pub const GENERATE_MAPPERS: bool = true;

/// Whether to run in dry-run mode by default
pub const DRY_RUN: bool = false;

/// Config file looked up in the working directory (any extension config-rs knows)
pub const CONFIG_FILE: &str = "datamapper-codegen";

/// Prefix for environment overrides, e.g. `DATAMAPPER_CODEGEN_MODEL_DIR`
pub const ENV_PREFIX: &str = "DATAMAPPER_CODEGEN";

/// File name of the shipped runtime base class
pub const RUNTIME_FILE: &str = "datamapper.php";
