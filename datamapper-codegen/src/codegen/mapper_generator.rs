//! Mapper generator - renders the table-bound subclass of the runtime mapper

use crate::schema::TableSchema;

use super::naming::mapper_class_name;
use super::TemplateOptions;

/// Render the mapper class for a table.
pub fn render_mapper(table: &TableSchema, options: &TemplateOptions) -> String {
    let model = options.model_class(&table.name);
    let class = mapper_class_name(&model);
    let width = model.len().max("mysqli".len());

    format!(
        r#"<?php
/**
 * Data mapper for table `{table}`
 *
 * Generated by datamapper-codegen. Regenerated whenever mappers are
 * overwritten; keep custom code in the model.
 */
class {class} extends {extends} {{

    /**
     * table the mapper reads and writes
     *
     * @var string
     */
    protected $table_name = {table_literal};

    /**
     * columns of the table, in table order
     *
     * @var array
     */
    protected $table_fields = {fields};

    /**
     * columns making up the primary key
     *
     * @var array
     */
    protected $primary_keys = {keys};

    /**
     * whether the database generates the primary key
     *
     * @var bool
     */
    protected $auto_primary_key = {auto};

    /**
     * constructor
     *
     * @param {connection_ty:<width$} $database_connection
     * @param {model:<width$} $model
     *
     * @access public
     * @return void
     */
    public function __construct($database_connection, $model) {{
        parent::__construct($database_connection, $model);
    }}
}}
"#,
        table = table.name,
        extends = options.mapper_extends,
        table_literal = php_string(&table.name),
        fields = php_array(&table.field_names()),
        keys = php_array(&table.primary_keys()),
        auto = if table.has_auto_primary_key() { "true" } else { "false" },
        connection_ty = "mysqli",
    )
}

/// Single-quoted PHP string literal.
pub(crate) fn php_string(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// PHP `array(...)` literal of strings.
pub(crate) fn php_array(values: &[&str]) -> String {
    let items = values
        .iter()
        .map(|v| php_string(v))
        .collect::<Vec<_>>()
        .join(", ");
    format!("array({})", items)
}
