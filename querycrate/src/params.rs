//! Parameter bags and named-parameter binding
//!
//! Templates reference values by name (`@name`). Sea-ORM statements take positional values, so
//! [`bind`] rewrites each reference into the placeholder style of the connection's backend and
//! collects the values in order.

use std::collections::HashMap;
use std::fmt::Write as _;

use sea_orm::{DatabaseBackend, Statement};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::QueryError;

/// Convert any serializable value into a parameter value. Values that cannot be represented
/// (maps with non-string keys) become null, which leaves the criterion unset; the failure is
/// logged with `tracing::warn!`. Use [`ParameterBag::from_object`] to get the error instead.
#[must_use]
pub fn param_value<T: Serialize + ?Sized>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|error| {
        tracing::warn!(
            %error,
            value_type = std::any::type_name::<T>(),
            "Parameter value could not be serialized; binding NULL"
        );
        Value::Null
    })
}

/// Name → value mapping consulted when deciding which criteria to keep, and bound at execution.
///
/// # Example
///
/// ```rust
/// use querycrate::ParameterBag;
///
/// let bag = ParameterBag::new().with("table", "org").with("limit", &10);
/// assert!(bag.contains_key("table"));
/// assert!(!bag.contains_key("Table"));
/// assert!(bag.lookup("Table").is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterBag(HashMap<String, Value>);

impl ParameterBag {
    #[must_use]
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Builder-style insert
    #[must_use]
    pub fn with<T: Serialize + ?Sized>(mut self, name: impl Into<String>, value: &T) -> Self {
        self.0.insert(name.into(), param_value(value));
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(name.into(), value)
    }

    /// Exact (case-sensitive) lookup
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    #[must_use]
    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Lookup used for binding: exact match first, then case-insensitive.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.0.get(name).or_else(|| {
            self.0
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value)
        })
    }

    /// Build a bag from the fields of any value that serializes to a map (structs, maps).
    /// Null serializes to an empty bag; other shapes are rejected.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::Serialize` if the value fails to serialize or is not map-shaped.
    pub fn from_object<T: Serialize + ?Sized>(object: &T) -> Result<Self, QueryError> {
        match serde_json::to_value(object)? {
            Value::Object(fields) => Ok(Self(fields.into_iter().collect())),
            Value::Null => Ok(Self::new()),
            other => Err(QueryError::Serialize(<serde_json::Error as serde::ser::Error>::custom(
                format!("parameters must serialize to a map, got {other}"),
            ))),
        }
    }

    /// The entries that carry a usable value: nulls and empty strings count as absent.
    #[must_use]
    pub fn populated(&self) -> Self {
        self.0
            .iter()
            .filter(|(_, value)| !is_empty_value(value))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Copy every entry of `other` into this bag, replacing existing keys
    pub fn extend(&mut self, other: ParameterBag) {
        self.0.extend(other.0);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl From<HashMap<String, Value>> for ParameterBag {
    fn from(map: HashMap<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for ParameterBag {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// A `@name` reference found in SQL text. `start` is the byte offset of the `@`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ParameterRef<'a> {
    pub name: &'a str,
    pub start: usize,
    pub end: usize,
}

/// Scan SQL for `@name` references (`name` = `[A-Za-z][A-Za-z0-9_]*`).
/// Single-quoted literals, `--` and `/* */` comments and `@@system` variables are skipped.
pub(crate) fn parameter_refs(sql: &str) -> Vec<ParameterRef<'_>> {
    let bytes = sql.as_bytes();
    let mut refs = Vec::new();
    let mut in_literal = false;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\'' => {
                in_literal = !in_literal;
                i += 1;
            }
            b'-' if !in_literal && bytes.get(i + 1) == Some(&b'-') => {
                i = sql[i..].find('\n').map_or(bytes.len(), |offset| i + offset + 1);
            }
            b'/' if !in_literal && bytes.get(i + 1) == Some(&b'*') => {
                i = sql[i + 2..].find("*/").map_or(bytes.len(), |offset| i + 2 + offset + 2);
            }
            b'@' if !in_literal => {
                if bytes.get(i + 1) == Some(&b'@') {
                    i = scan_identifier(bytes, i + 2);
                } else if bytes.get(i + 1).is_some_and(u8::is_ascii_alphabetic) {
                    let end = scan_identifier(bytes, i + 1);
                    refs.push(ParameterRef {
                        name: &sql[i + 1..end],
                        start: i,
                        end,
                    });
                    i = end;
                } else {
                    i += 1;
                }
            }
            _ => i += 1,
        }
    }

    refs
}

fn scan_identifier(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
        i += 1;
    }
    i
}

/// Names of the parameters referenced by `sql`, in order of appearance (repeats included).
///
/// ```rust
/// let names = querycrate::parameter_names("SELECT * FROM [Item] WHERE [OrgId]=@orgId AND [Tag]='@x'");
/// assert_eq!(names, vec!["orgId"]);
/// ```
#[must_use]
pub fn parameter_names(sql: &str) -> Vec<&str> {
    parameter_refs(sql).into_iter().map(|r| r.name).collect()
}

/// Convert a parameter value into the value type Sea-ORM binds
fn to_db_value(value: &Value) -> sea_orm::Value {
    match value {
        Value::Null => sea_orm::Value::String(None),
        Value::Bool(b) => (*b).into(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.into()
            } else if let Some(u) = n.as_u64() {
                u.into()
            } else {
                n.as_f64().unwrap_or_default().into()
            }
        }
        Value::String(s) => s.clone().into(),
        other => other.to_string().into(),
    }
}

/// Rewrite the `@name` references of `sql` into positional placeholders for `backend` and
/// collect the bound values.
///
/// Postgres gets `$n`, reusing the index when a name repeats; MySQL and SQLite get one `?` per
/// reference.
///
/// # Errors
///
/// Returns `QueryError::UnboundParameter` when a referenced name has no entry in `parameters`.
pub fn bind(
    sql: &str,
    parameters: &ParameterBag,
    backend: DatabaseBackend,
) -> Result<Statement, QueryError> {
    let mut text = String::with_capacity(sql.len());
    let mut values = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut last = 0;

    for reference in parameter_refs(sql) {
        text.push_str(&sql[last..reference.start]);
        let value = parameters
            .lookup(reference.name)
            .ok_or_else(|| QueryError::UnboundParameter {
                name: reference.name.to_string(),
            })?;

        if backend == DatabaseBackend::Postgres {
            let key = reference.name.to_ascii_lowercase();
            let position = if let Some(position) = positions.get(&key) {
                *position
            } else {
                values.push(to_db_value(value));
                positions.insert(key, values.len());
                values.len()
            };
            let _ = write!(text, "${position}");
        } else {
            values.push(to_db_value(value));
            text.push('?');
        }
        last = reference.end;
    }
    text.push_str(&sql[last..]);

    tracing::debug!(sql = %text, values = values.len(), "Bound query statement");
    Ok(Statement::from_sql_and_values(backend, text, values))
}
