//! Model generator - renders one PHP model class per table

use crate::schema::{ColumnInfo, TableSchema};

use super::naming::{accessor_name, foreign_key, mapper_class_name, ForeignKey};
use super::type_resolver::PhpType;
use super::TemplateOptions;

/// Property names the model itself uses
pub const RESERVED_PROPERTIES: &[&str] = &["db", "mapper"];

/// Render the model class for a table.
pub fn render_model(table: &TableSchema, options: &TemplateOptions) -> String {
    let class = options.model_class(&table.name);
    let relations = relations(table, options);

    let mut code = String::new();
    code.push_str(&render_header(table, &class, options));
    code.push_str(&render_properties(table, &relations));
    code.push_str(&render_constructor(table, &class, options));
    code.push_str(&render_io_methods(&class));

    for column in &table.columns {
        let relation = relations
            .iter()
            .find(|(name, _)| *name == column.name)
            .map(|(_, fk)| fk);
        code.push_str(&render_accessors(column, relation));
    }

    code.push_str("}\n");
    code
}

/// `*_id` columns that get a related-object accessor pair.
///
/// A relation is skipped when its cache property would collide with a
/// column or with the model's own properties.
fn relations<'a>(table: &'a TableSchema, options: &TemplateOptions) -> Vec<(&'a str, ForeignKey)> {
    table
        .columns
        .iter()
        .filter_map(|column| {
            let fk = foreign_key(&column.name, &options.model_prefix)?;
            let clashes = table.column(&fk.property).is_some()
                || RESERVED_PROPERTIES.contains(&fk.property.as_str());
            (!clashes).then_some((column.name.as_str(), fk))
        })
        .collect()
}

fn render_header(table: &TableSchema, class: &str, options: &TemplateOptions) -> String {
    let extends = options
        .model_extends
        .as_deref()
        .map(|base| format!(" extends {}", base))
        .unwrap_or_default();

    format!(
        r#"<?php
/**
 * Model for table `{table}`
 *
 * Generated by datamapper-codegen. Hand edits are kept unless models are
 * regenerated with overwriting enabled.
 */
class {class}{extends} {{
"#,
        table = table.name,
    )
}

fn render_properties(table: &TableSchema, relations: &[(&str, ForeignKey)]) -> String {
    let mut code = String::new();

    for column in &table.columns {
        code.push_str(&format!(
            r#"
    /**
     * column `{name}`
     *
     * @var {ty}
     */
    public ${name};
"#,
            name = column.name,
            ty = PhpType::resolve(&column.column_type),
        ));
    }

    for (_, fk) in relations {
        code.push_str(&format!(
            r#"
    /**
     * related {class}, loaded on first access
     *
     * @var {class}
     */
    protected ${property};
"#,
            class = fk.class,
            property = fk.property,
        ));
    }

    code.push_str(
        r#"
    /**
     * data mapper doing the actual database work
     *
     * @var DataMapper
     */
    protected $mapper;

    /**
     * database connection
     *
     * @var mysqli
     */
    protected $db;
"#,
    );
    code
}

fn render_constructor(table: &TableSchema, class: &str, options: &TemplateOptions) -> String {
    let mapper = mapper_class_name(class);
    let primary_keys = table.primary_keys();

    let mut params: Vec<(String, String)> = vec![
        ("mysqli".to_string(), "database_connection".to_string()),
        (mapper, "mapper".to_string()),
    ];
    for key in &primary_keys {
        let ty = table
            .column(key)
            .map(|c| PhpType::resolve(&c.column_type))
            .unwrap_or(PhpType::String);
        params.push((ty.to_string(), key.to_string()));
    }
    let width = params.iter().map(|(ty, _)| ty.len()).max().unwrap_or(0);

    let mut code = String::from("\n    /**\n     * constructor\n");
    if !primary_keys.is_empty() {
        code.push_str("     *\n     * Loads the row when every primary key value is given.\n");
    }
    code.push_str("     *\n");
    for (ty, name) in &params {
        code.push_str(&format!("     * @param {:<width$} ${}\n", ty, name, width = width));
    }
    code.push_str("     *\n");
    if !primary_keys.is_empty() {
        code.push_str("     * @throws Exception\n");
    }
    code.push_str("     * @access public\n     * @return void\n     */\n");

    let arg_list = params
        .iter()
        .map(|(_, name)| format!("${}", name))
        .collect::<Vec<_>>()
        .join(", ");
    let signature = params
        .iter()
        .enumerate()
        .map(|(i, (_, name))| {
            if i < 2 {
                format!("${}", name)
            } else {
                format!("${} = null", name)
            }
        })
        .collect::<Vec<_>>()
        .join(", ");

    code.push_str(&format!("    public function __construct({}) {{\n", signature));
    code.push_str("        $this->db     = $database_connection;\n");
    code.push_str("        $this->mapper = $mapper;\n");
    if options.model_extends.is_some() {
        code.push_str(&format!("        parent::__construct({});\n", arg_list));
    }
    if !primary_keys.is_empty() {
        let key_args: Vec<String> = primary_keys.iter().map(|k| format!("${}", k)).collect();
        let check = key_args
            .iter()
            .map(|k| format!("{} !== null", k))
            .collect::<Vec<_>>()
            .join(" && ");
        code.push_str(&format!("        if ({}) {{\n", check));
        code.push_str(&format!("            $this->load({});\n", key_args.join(", ")));
        code.push_str("        }\n");
    }
    code.push_str("    }\n");
    code
}

fn render_io_methods(class: &str) -> String {
    format!(
        r#"
    /**
     * stores the object through the mapper
     *
     * @access public
     * @return $this
     */
    public function save() {{
        $this->mapper->save($this);
        return $this;
    }}

    /**
     * fills the object through the mapper
     *
     * Accepts primary key values, values for every field, or an array of
     * either.
     *
     * @throws Exception
     * @access public
     * @return $this
     */
    public function load(/* args */) {{
        $args = func_get_args();
        array_unshift($args, $this);
        if (!call_user_func_array(array($this->mapper, 'load'), $args)) {{
            throw new Exception('Could not load {class}');
        }}
        return $this;
    }}

    /**
     * deletes the row through the mapper
     *
     * @access public
     * @return $this
     */
    public function delete() {{
        $this->mapper->delete($this);
        return $this;
    }}
"#
    )
}

/// Getter for every column; setters for non-key columns; related-object
/// accessors for `*_id` columns.
fn render_accessors(column: &ColumnInfo, relation: Option<&ForeignKey>) -> String {
    let accessor = accessor_name(&column.name);
    let ty = PhpType::resolve(&column.column_type);

    let mut code = render_getter(&column.name, &accessor, ty);
    if !column.is_primary_key() {
        code.push_str(&render_setter(&column.name, &accessor, ty));
    }
    if let Some(fk) = relation {
        code.push_str(&render_related_getter(&column.name, fk));
        if !column.is_primary_key() {
            code.push_str(&render_related_setter(&column.name, fk));
        }
    }
    code
}

fn render_getter(name: &str, accessor: &str, ty: PhpType) -> String {
    format!(
        r#"
    /**
     * returns {name}
     *
     * @access public
     * @return {ty}
     */
    public function get{accessor}() {{
        return $this->{name};
    }}
"#
    )
}

fn render_setter(name: &str, accessor: &str, ty: PhpType) -> String {
    format!(
        r#"
    /**
     * sets {name}
     *
     * @param {ty} ${name}
     *
     * @access public
     * @return $this
     */
    public function set{accessor}(${name}) {{
        $this->{name} = ${name};
        return $this;
    }}
"#
    )
}

fn render_related_getter(column: &str, fk: &ForeignKey) -> String {
    format!(
        r#"
    /**
     * returns the {class} referenced by {column}
     *
     * @access public
     * @return {class}|null
     */
    public function get{accessor}() {{
        if ($this->{property} === null && $this->{column} !== null) {{
            $mapper = new {mapper}($this->db, null);
            $this->{property} = new {class}($this->db, $mapper, $this->{column});
        }}
        return $this->{property};
    }}
"#,
        class = fk.class,
        accessor = fk.accessor,
        property = fk.property,
        mapper = mapper_class_name(&fk.class),
    )
}

fn render_related_setter(column: &str, fk: &ForeignKey) -> String {
    format!(
        r#"
    /**
     * points {column} at another {class}
     *
     * @param {class} ${property}
     *
     * @access public
     * @return $this
     */
    public function set{accessor}({class} ${property}) {{
        $this->{property} = ${property};
        $this->{column} = ${property}->getId();
        return $this;
    }}
"#,
        class = fk.class,
        accessor = fk.accessor,
        property = fk.property,
    )
}
