//! Helpers for assembling parameterized SQL.
//!
//! The central piece is [`sql_for_partial_update`], which turns an ordered
//! set of changed fields into the `SET` portion of an `UPDATE` plus the
//! values to bind against it. Callers own the rest of the statement.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::models::error::{ModelError, ModelResult};

/// A scalar bind parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Fixed-point value, bound as `NUMERIC` so its scale survives storage.
    Decimal(Decimal),
}

impl SqlValue {
    /// Convert a JSON scalar. Arrays and objects have no column to land in.
    pub fn from_json(field: &str, value: &Value) -> ModelResult<Self> {
        Ok(match value {
            Value::Null => SqlValue::Null,
            Value::Bool(b) => SqlValue::Bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    SqlValue::Int(i)
                } else if let Some(f) = n.as_f64() {
                    SqlValue::Float(f)
                } else {
                    return Err(ModelError::bad_request(format!(
                        "Field '{}' holds an unsupported number: {}",
                        field, n
                    )));
                }
            }
            Value::String(s) => SqlValue::Text(s.clone()),
            Value::Array(_) | Value::Object(_) => {
                return Err(ModelError::bad_request(format!(
                    "Field '{}' must be a scalar value",
                    field
                )))
            }
        })
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        SqlValue::Int(value.into())
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int(value)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Float(value)
    }
}

impl From<Decimal> for SqlValue {
    fn from(value: Decimal) -> Self {
        SqlValue::Decimal(value)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(SqlValue::Null, Into::into)
    }
}

/// Changed fields for a partial update, kept in insertion order.
///
/// Order decides which placeholder each value binds to, so this is a
/// list rather than a hash map. Re-inserting a field replaces its value
/// without moving it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdatePayload {
    fields: Vec<(String, SqlValue)>,
}

impl UpdatePayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<SqlValue>) -> Option<SqlValue> {
        let field = field.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.fields.push((field, value));
                None
            }
        }
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn get(&self, field: &str) -> Option<&SqlValue> {
        self.fields.iter().find(|(name, _)| name == field).map(|(_, v)| v)
    }

    pub fn contains_key(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Build from a JSON object, keeping the object's key order.
    pub fn from_json(object: &Map<String, Value>) -> ModelResult<Self> {
        let mut payload = Self::new();
        for (field, value) in object {
            payload.insert(field.clone(), SqlValue::from_json(field, value)?);
        }
        Ok(payload)
    }
}

impl<K: Into<String>, V: Into<SqlValue>> FromIterator<(K, V)> for UpdatePayload {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut payload = Self::new();
        for (field, value) in iter {
            payload.insert(field, value);
        }
        payload
    }
}

impl IntoIterator for UpdatePayload {
    type Item = (String, SqlValue);
    type IntoIter = std::vec::IntoIter<(String, SqlValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

/// Application field name to storage column name.
#[derive(Debug, Clone, Default)]
pub struct ColumnMap {
    columns: HashMap<String, String>,
}

impl ColumnMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<String>, column: impl Into<String>) -> Self {
        self.columns.insert(field.into(), column.into());
        self
    }

    /// Fields without an entry are their own column name.
    pub fn column_for<'a>(&'a self, field: &'a str) -> &'a str {
        self.columns.get(field).map(String::as_str).unwrap_or(field)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SqlFragment {
    pub set_clause: String,
    pub values: Vec<SqlValue>,
}

/// Build the `SET` clause for updating only the fields in `payload`.
///
/// Produces `"col1"=$1, "col2"=$2, ...` in payload order together with the
/// matching bind values. Statement placeholders following the fragment
/// start at `values.len() + 1`.
///
/// ```
/// use jobly::helpers::sql::{sql_for_partial_update, ColumnMap, UpdatePayload};
///
/// let payload = UpdatePayload::new().with("firstName", "Aliya").with("age", 32);
/// let columns = ColumnMap::new().with("firstName", "first_name");
/// let fragment = sql_for_partial_update(payload, &columns).unwrap();
/// assert_eq!(fragment.set_clause, r#""first_name"=$1, "age"=$2"#);
/// ```
pub fn sql_for_partial_update(payload: UpdatePayload, columns: &ColumnMap) -> ModelResult<SqlFragment> {
    if payload.is_empty() {
        return Err(ModelError::bad_request("No data"));
    }

    let mut tokens = Vec::with_capacity(payload.len());
    let mut values = Vec::with_capacity(payload.len());
    for (field, value) in payload {
        values.push(value);
        tokens.push(format!(
            "{}={}",
            quote_identifier(columns.column_for(&field)),
            placeholder(values.len())
        ));
    }

    Ok(SqlFragment {
        set_clause: tokens.join(", "),
        values,
    })
}

/// Positional bind placeholder, 1-based.
pub fn placeholder(index: usize) -> String {
    format!("${}", index)
}

pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
