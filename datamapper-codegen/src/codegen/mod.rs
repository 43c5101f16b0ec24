//! Code generation module

mod code_generator;
mod mapper_generator;
mod model_generator;
mod naming;
mod type_resolver;
mod writer;

pub use code_generator::*;
pub use mapper_generator::render_mapper;
pub use model_generator::{render_model, RESERVED_PROPERTIES};
pub use naming::*;
pub use type_resolver::*;
pub use writer::*;

use crate::config::CodegenConfig;

/// Class-level settings shared by the model and mapper templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateOptions {
    pub model_prefix: String,
    pub model_extends: Option<String>,
    pub mapper_extends: String,
}

impl TemplateOptions {
    pub fn from_config(config: &CodegenConfig) -> Self {
        Self {
            model_prefix: config.model_prefix.clone(),
            model_extends: config.model_extends.clone().filter(|c| !c.is_empty()),
            mapper_extends: config.mapper_extends.clone(),
        }
    }

    /// Model class for a table, prefix included
    pub fn model_class(&self, table_name: &str) -> String {
        format!("{}{}", self.model_prefix, class_name(table_name))
    }
}
