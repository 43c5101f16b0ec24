//! Runtime active-record mapper
//!
//! A [`DataMapper`] is bound to one table through a [`TableMapping`] and
//! moves data between a model ([`Record`]) and that table. It keeps a
//! snapshot of the row as last loaded or saved; `save` uses the snapshot to
//! pick INSERT or UPDATE and to send only the columns that changed.

use tracing::debug;

use crate::error::{Error, Result};
use crate::query::Query;
use crate::traits::{FromRow, Pool, Row};
use crate::value::Value;

/// Static description of the table a mapper works on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableMapping {
    table: String,
    fields: Vec<String>,
    primary_keys: Vec<String>,
    auto_primary_key: bool,
}

impl TableMapping {
    pub fn new(table: &str, fields: &[&str], primary_keys: &[&str], auto_primary_key: bool) -> Self {
        Self {
            table: table.to_string(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
            primary_keys: primary_keys.iter().map(|k| k.to_string()).collect(),
            auto_primary_key,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn primary_keys(&self) -> &[String] {
        &self.primary_keys
    }

    pub fn auto_primary_key(&self) -> bool {
        self.auto_primary_key
    }

    fn is_primary_key(&self, field: &str) -> bool {
        self.primary_keys.iter().any(|k| k == field)
    }
}

/// Column values of one row, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    values: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value stored for `column`, if any (a stored NULL is returned as `Some(Value::Null)`).
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Set a column, replacing any previous value.
    pub fn set(&mut self, column: &str, value: impl Into<Value>) {
        let value = value.into();
        match self.values.iter_mut().find(|(name, _)| name == column) {
            Some(slot) => slot.1 = value,
            None => self.values.push((column.to_string(), value)),
        }
    }

    /// Whether the column holds a non-NULL value.
    pub fn is_set(&self, column: &str) -> bool {
        self.get(column).is_some_and(|v| !v.is_null())
    }

    /// Whether the column is present at all, NULL included.
    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (column, value) in iter {
            record.set(&column.into(), value);
        }
        record
    }
}

impl Row for Record {
    fn get_value(&self, column: &str) -> Result<Value> {
        self.get(column)
            .cloned()
            .ok_or_else(|| Error::ColumnNotFound(column.to_string()))
    }

    fn columns(&self) -> Vec<&str> {
        self.values.iter().map(|(name, _)| name.as_str()).collect()
    }
}

impl FromRow for Record {
    fn from_row<R: Row>(row: &R) -> Result<Self> {
        let mut record = Record::new();
        for column in row.columns() {
            record.set(column, row.get_value(column)?);
        }
        Ok(record)
    }

    fn column_names() -> &'static [&'static str] {
        &[]
    }
}

/// Arguments accepted by [`DataMapper::load`].
#[derive(Debug, Clone, PartialEq)]
pub enum LoadArgs {
    /// Values in field order (fills the model) or in primary-key order (loads by key).
    Positional(Vec<Value>),
    /// Named values: every field (fills) or every primary key (loads by key).
    Named(Record),
}

/// Active-record mapper for one table.
#[derive(Debug, Clone)]
pub struct DataMapper {
    mapping: TableMapping,
    data: Option<Record>,
}

impl DataMapper {
    pub fn new(mapping: TableMapping) -> Self {
        Self {
            mapping,
            data: None,
        }
    }

    pub fn mapping(&self) -> &TableMapping {
        &self.mapping
    }

    /// The row as last loaded or saved.
    pub fn snapshot(&self) -> Option<&Record> {
        self.data.as_ref()
    }

    /// Populate `model` either directly from the arguments or by selecting
    /// the row whose primary key they carry.
    pub async fn load<P: Pool>(&mut self, pool: &P, model: &mut Record, args: LoadArgs) -> Result<()> {
        match args {
            LoadArgs::Positional(values) => {
                if values.len() == self.mapping.fields.len() {
                    let data = self.mapping.fields.iter().cloned().zip(values).collect();
                    self.fill(model, &data)
                } else if values.len() == self.mapping.primary_keys.len() {
                    let keys = self.mapping.primary_keys.iter().cloned().zip(values).collect();
                    self.load_from_db(pool, model, &keys).await
                } else {
                    Err(self.load_args_error())
                }
            }
            LoadArgs::Named(data) => {
                if self.mapping.fields.iter().all(|f| data.contains(f)) {
                    self.fill(model, &data)
                } else if self.mapping.primary_keys.iter().all(|k| data.is_set(k)) {
                    self.load_from_db(pool, model, &data).await
                } else {
                    Err(self.load_args_error())
                }
            }
        }
    }

    fn load_args_error(&self) -> Error {
        Error::LoadArgs {
            table: self.mapping.table.clone(),
        }
    }

    async fn load_from_db<P: Pool>(&mut self, pool: &P, model: &mut Record, keys: &Record) -> Result<()> {
        let query = self.select_by_keys(keys)?;
        debug!(table = %self.mapping.table, "loading row by primary key");
        let row: Option<Record> = query.fetch_optional(pool).await?;
        match row {
            Some(row) => self.fill(model, &row),
            None => Err(Error::NotFound {
                table: self.mapping.table.clone(),
            }),
        }
    }

    /// Build the SELECT for the row identified by the primary-key values in `keys`.
    pub fn select_by_keys(&self, keys: &Record) -> Result<Query> {
        self.require_primary_key()?;
        let mut conditions = Vec::with_capacity(self.mapping.primary_keys.len());
        let mut params = Vec::with_capacity(self.mapping.primary_keys.len());
        for key in &self.mapping.primary_keys {
            match keys.get(key) {
                Some(value) if !value.is_null() => {
                    conditions.push(format!("{} = ?", quote_ident(key)));
                    params.push(value.clone());
                }
                _ => {
                    return Err(Error::MissingField {
                        table: self.mapping.table.clone(),
                        field: key.clone(),
                    })
                }
            }
        }

        let sql = format!(
            "SELECT {} FROM {} WHERE {}",
            self.column_list(),
            quote_ident(&self.mapping.table),
            conditions.join(" AND ")
        );
        Ok(Query::with_params(sql, params))
    }

    fn column_list(&self) -> String {
        self.mapping
            .fields
            .iter()
            .map(|f| quote_ident(f))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Copy every mapped field from `data` into the model and the snapshot.
    fn fill(&mut self, model: &mut Record, data: &Record) -> Result<()> {
        let mut snapshot = Record::new();
        for field in &self.mapping.fields {
            let value = data.get(field).ok_or_else(|| Error::MissingField {
                table: self.mapping.table.clone(),
                field: field.clone(),
            })?;
            snapshot.set(field, value.clone());
        }
        for (field, value) in snapshot.iter() {
            model.set(field, value.clone());
        }
        self.data = Some(snapshot);
        Ok(())
    }

    /// Whether the next `save` inserts: the model was never loaded or saved,
    /// or the snapshot lacks part of the primary key.
    pub fn needs_insert(&self) -> bool {
        match &self.data {
            None => true,
            Some(data) => self.mapping.primary_keys.iter().any(|k| !data.is_set(k)),
        }
    }

    /// Insert or update the model, depending on [`needs_insert`](Self::needs_insert).
    pub async fn save<P: Pool>(&mut self, pool: &P, model: &mut Record) -> Result<()> {
        if self.needs_insert() {
            self.insert(pool, model).await
        } else {
            self.update(pool, model).await
        }
    }

    /// Non-key fields whose model value differs from the snapshot.
    ///
    /// A field cleared in the model (absent or NULL) while the snapshot holds
    /// a value becomes `NULL`; fields absent on both sides are left alone.
    pub fn changed_fields(&self, model: &Record) -> Vec<(String, Value)> {
        let empty = Record::new();
        let data = self.data.as_ref().unwrap_or(&empty);
        let mut changes = Vec::new();

        for field in &self.mapping.fields {
            if self.mapping.is_primary_key(field) {
                continue;
            }
            let current = model.get(field).filter(|v| !v.is_null());
            let stored = data.get(field).filter(|v| !v.is_null());
            match (current, stored) {
                (None, Some(_)) => changes.push((field.clone(), Value::Null)),
                (Some(new), Some(old)) if new != old => changes.push((field.clone(), new.clone())),
                (Some(new), None) => changes.push((field.clone(), new.clone())),
                _ => {}
            }
        }
        changes
    }

    /// Build the UPDATE for the current model, or `None` when nothing changed.
    pub fn update_statement(&self, model: &Record) -> Result<Option<Query>> {
        let changes = self.changed_fields(model);
        if changes.is_empty() {
            return Ok(None);
        }

        let (clause, key_params) = self.primary_key_clause()?;
        let assignments = changes
            .iter()
            .map(|(field, _)| format!("{} = ?", quote_ident(field)))
            .collect::<Vec<_>>()
            .join(", ");
        let mut params: Vec<Value> = changes.into_iter().map(|(_, value)| value).collect();
        params.extend(key_params);

        let sql = format!(
            "UPDATE {} SET {} WHERE {}",
            quote_ident(&self.mapping.table),
            assignments,
            clause
        );
        Ok(Some(Query::with_params(sql, params)))
    }

    async fn update<P: Pool>(&mut self, pool: &P, model: &Record) -> Result<()> {
        let Some(query) = self.update_statement(model)? else {
            debug!(table = %self.mapping.table, "no changed fields, skipping update");
            return Ok(());
        };
        let changes = self.changed_fields(model);
        query.execute(pool).await?;

        if let Some(data) = self.data.as_mut() {
            for (field, value) in changes {
                data.set(&field, value);
            }
        }
        Ok(())
    }

    /// Build the INSERT for the model together with the row it will store.
    ///
    /// Auto-generated keys are left out; other keys must be set in the model.
    /// Fields the model does not carry are written as NULL.
    pub fn insert_statement(&self, model: &Record) -> Result<(Query, Record)> {
        let mut stored = Record::new();
        for field in &self.mapping.fields {
            let is_key = self.mapping.is_primary_key(field);
            if is_key && self.mapping.auto_primary_key {
                continue;
            }
            if is_key && !model.is_set(field) {
                return Err(Error::MissingPrimaryKey {
                    table: self.mapping.table.clone(),
                    key: field.clone(),
                });
            }
            let value = model.get(field).cloned().unwrap_or(Value::Null);
            stored.set(field, value);
        }

        let columns = stored
            .iter()
            .map(|(field, _)| quote_ident(field))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = vec!["?"; stored.len()].join(", ");
        let params = stored.iter().map(|(_, value)| value.clone()).collect();

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(&self.mapping.table),
            columns,
            placeholders
        );
        Ok((Query::with_params(sql, params), stored))
    }

    async fn insert<P: Pool>(&mut self, pool: &P, model: &mut Record) -> Result<()> {
        let (query, mut stored) = self.insert_statement(model)?;
        let result = query.execute(pool).await?;

        if self.mapping.auto_primary_key {
            let id = result.last_insert_id.ok_or_else(|| {
                Error::Query(format!("no insert id returned for `{}`", self.mapping.table))
            })?;
            for key in &self.mapping.primary_keys {
                stored.set(key, id);
                model.set(key, id);
            }
        }
        debug!(table = %self.mapping.table, "inserted row");
        self.data = Some(stored);
        Ok(())
    }

    /// Delete the loaded row, then clear every mapped field of the model.
    pub async fn delete<P: Pool>(&mut self, pool: &P, model: &mut Record) -> Result<()> {
        let (clause, params) = self.primary_key_clause()?;
        let sql = format!(
            "DELETE FROM {} WHERE {} LIMIT 1",
            quote_ident(&self.mapping.table),
            clause
        );
        Query::with_params(sql, params).execute(pool).await?;

        for field in &self.mapping.fields {
            model.set(field, Value::Null);
        }
        self.data = None;
        Ok(())
    }

    fn require_primary_key(&self) -> Result<()> {
        if self.mapping.primary_keys.is_empty() {
            return Err(Error::NoPrimaryKey {
                table: self.mapping.table.clone(),
            });
        }
        Ok(())
    }

    /// WHERE clause matching the snapshot's primary key, with its bound values.
    pub fn primary_key_clause(&self) -> Result<(String, Vec<Value>)> {
        self.require_primary_key()?;
        let mut conditions = Vec::with_capacity(self.mapping.primary_keys.len());
        let mut params = Vec::with_capacity(self.mapping.primary_keys.len());
        for key in &self.mapping.primary_keys {
            let value = self
                .data
                .as_ref()
                .and_then(|data| data.get(key))
                .filter(|v| !v.is_null())
                .ok_or_else(|| Error::NotLoaded {
                    table: self.mapping.table.clone(),
                    key: key.clone(),
                })?;
            conditions.push(format!("{} = ?", quote_ident(key)));
            params.push(value.clone());
        }
        Ok((conditions.join(" AND "), params))
    }
}

/// Backtick-quote an identifier, doubling embedded backticks.
pub fn quote_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}
