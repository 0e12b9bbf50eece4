use std::borrow::Cow;
use std::fmt;

use sea_orm::{DatabaseBackend, Statement};
use serde_json::Value;

use super::{ORDER_BY_TOKEN, QueryTemplate};
use crate::errors::QueryError;
use crate::params::{ParameterBag, bind};

/// A named ORDER BY expression the end user may pick by index, without ever sending SQL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOption {
    /// Display label, e.g. "Last Name"
    pub text: &'static str,
    /// SQL placed after `ORDER BY`, e.g. `[LastName] ASC`
    pub expression: &'static str,
}

impl SortOption {
    #[must_use]
    pub const fn new(text: &'static str, expression: &'static str) -> Self {
        Self { text, expression }
    }
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.expression)
    }
}

/// One optional WHERE term of a query object, built fresh for every resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Criterion {
    /// Field name; also the parameter name of the default expression
    pub name: &'static str,
    /// Current value, `Value::Null` when unset
    pub value: Value,
    /// Custom SQL fragment; `[name]=@name` when absent
    pub expression: Option<&'static str>,
    /// Sample value used by the query self-test
    pub test_value: Option<Value>,
}

impl Criterion {
    #[must_use]
    pub fn new(name: &'static str, value: Value) -> Self {
        Self {
            name,
            value,
            expression: None,
            test_value: None,
        }
    }

    #[must_use]
    pub fn with_expression(mut self, expression: &'static str) -> Self {
        self.expression = Some(expression);
        self
    }

    #[must_use]
    pub fn with_test_value(mut self, value: Value) -> Self {
        self.test_value = Some(value);
        self
    }

    #[must_use]
    pub fn is_set(&self) -> bool {
        !self.value.is_null()
    }

    /// The SQL fragment this criterion contributes when set
    #[must_use]
    pub fn sql(&self) -> Cow<'static, str> {
        self.expression.map_or_else(
            || Cow::Owned(format!("[{0}]=@{0}", self.name)),
            Cow::Borrowed,
        )
    }
}

/// Look up the ORDER BY expression for `index`.
///
/// # Errors
///
/// - `QueryError::NoSortOptions` when the query declares no sort options
/// - `QueryError::SortIndexOutOfRange` when `index` is past the end of the declared options
pub fn sort_expression<'a>(
    query: &str,
    sort_options: Option<&'a [SortOption]>,
    index: usize,
) -> Result<&'a str, QueryError> {
    let options = sort_options.ok_or_else(|| QueryError::no_sort_options(query))?;
    options
        .get(index)
        .map(|option| option.expression)
        .ok_or_else(|| QueryError::sort_index_out_of_range(query, index, options.len()))
}

/// Resolve the reserved tokens of `template`.
///
/// - `{orderBy}` becomes `ORDER BY <expression>` for `Some(index)` and disappears for `None`.
/// - `{where}` / `{andWhere}` become `WHERE ...` / `AND ...` joining the SQL of every set
///   criterion whose name is not already a parameter of the template, or disappear when no
///   criterion qualifies.
///
/// Templates without tokens come back unchanged.
///
/// # Errors
///
/// Fails with the errors of [`sort_expression`] when `{orderBy}` is present and an index is given.
pub fn resolve(
    query: &str,
    template: &QueryTemplate,
    sort_options: Option<&[SortOption]>,
    criteria: &[Criterion],
    sort_index: Option<usize>,
) -> Result<String, QueryError> {
    let mut sql = template.sql().to_string();

    if template.has_order_by() {
        let order_by = match sort_index {
            Some(index) => format!("ORDER BY {}", sort_expression(query, sort_options, index)?),
            None => String::new(),
        };
        sql = sql.replace(ORDER_BY_TOKEN, &order_by);
    } else if let Some(index) = sort_index {
        tracing::warn!(query, index, "Sort index ignored: template has no {{orderBy}} token");
    }

    if let Some(token) = template.where_token() {
        let terms: Vec<Cow<'static, str>> = criteria
            .iter()
            .filter(|criterion| criterion.is_set() && !template.embeds_parameter(criterion.name))
            .map(Criterion::sql)
            .collect();

        let clause = if terms.is_empty() {
            String::new()
        } else {
            format!("{} {}", token.keyword(), terms.join(" AND "))
        };
        sql = sql.replace(token.token(), &clause);
    }

    tracing::debug!(query, sql = %sql, "Resolved query template");
    Ok(sql)
}

/// SQL text produced for one invocation, with the parameters to bind alongside it
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedQuery {
    pub sql: String,
    pub parameters: ParameterBag,
}

impl ResolvedQuery {
    #[must_use]
    pub fn new(sql: String, parameters: ParameterBag) -> Self {
        Self { sql, parameters }
    }

    /// Bind the parameters for `backend`.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::UnboundParameter` when the SQL references a name missing from the bag.
    pub fn statement(&self, backend: DatabaseBackend) -> Result<Statement, QueryError> {
        bind(&self.sql, &self.parameters, backend)
    }
}
