//! # Query Templates
//!
//! A template is plain SQL with up to three reserved tokens:
//!
//! - `{orderBy}`: replaced by `ORDER BY <expression>` chosen by index from the query's declared
//!   [`SortOption`]s, or removed when no sort is requested
//! - `{where}`: replaced by `WHERE <term> AND <term> ...` built from the populated criteria
//! - `{andWhere}`: the same, prefixed with `AND` for templates that already have a WHERE clause
//!
//! Tokens are literal, case-sensitive substrings. Values never enter the SQL text: every term
//! references its value through a named parameter (`@name`) bound at execution.
//!
//! ```rust
//! use querycrate::{Criterion, QueryTemplate, resolve};
//! use serde_json::json;
//!
//! let template = QueryTemplate::new("SELECT * FROM [dbo].[Organization] {where}");
//! let criteria = [Criterion::new("Name", json!("sample"))
//!     .with_expression("[Name] LIKE '%' + @name + '%'")];
//!
//! let sql = resolve("AllOrgs", &template, None, &criteria, None).unwrap();
//! assert_eq!(sql, "SELECT * FROM [dbo].[Organization] WHERE [Name] LIKE '%' + @name + '%'");
//! ```

pub mod resolver;

use std::collections::HashSet;
use std::fmt::Write as _;

use crate::params::parameter_names;

pub use resolver::{Criterion, ResolvedQuery, SortOption, resolve, sort_expression};

pub const ORDER_BY_TOKEN: &str = "{orderBy}";
pub const WHERE_TOKEN: &str = "{where}";
pub const AND_WHERE_TOKEN: &str = "{andWhere}";

/// The criteria insertion token found in a template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhereToken {
    /// `{where}`: the template has no WHERE clause of its own
    Where,
    /// `{andWhere}`: the template already has a WHERE clause
    AndWhere,
}

impl WhereToken {
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Where => WHERE_TOKEN,
            Self::AndWhere => AND_WHERE_TOKEN,
        }
    }

    /// Keyword that introduces the generated terms
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Where => "WHERE",
            Self::AndWhere => "AND",
        }
    }
}

/// SQL template text together with the facts the resolver needs about it.
///
/// The facts are computed once when the template is built, not on every resolution. Query types
/// normally hold their template in a static via [`query_template!`](crate::query_template).
#[derive(Debug, Clone)]
pub struct QueryTemplate {
    sql: String,
    has_order_by: bool,
    where_token: Option<WhereToken>,
    embedded_parameters: HashSet<String>,
}

impl QueryTemplate {
    pub fn new(sql: impl Into<String>) -> Self {
        let sql = sql.into();
        let has_order_by = sql.contains(ORDER_BY_TOKEN);
        let where_token = if sql.contains(WHERE_TOKEN) {
            Some(WhereToken::Where)
        } else if sql.contains(AND_WHERE_TOKEN) {
            Some(WhereToken::AndWhere)
        } else {
            None
        };
        let embedded_parameters = parameter_names(&sql)
            .into_iter()
            .map(str::to_ascii_lowercase)
            .collect();

        Self {
            sql,
            has_order_by,
            where_token,
            embedded_parameters,
        }
    }

    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    #[must_use]
    pub fn has_order_by(&self) -> bool {
        self.has_order_by
    }

    /// `{where}` wins when a template carries both tokens
    #[must_use]
    pub fn where_token(&self) -> Option<WhereToken> {
        self.where_token
    }

    /// True when the template text itself references `@name` (case-insensitive). Such names are
    /// bound as plain parameters and never turned into criteria.
    #[must_use]
    pub fn embeds_parameter(&self, name: &str) -> bool {
        self.embedded_parameters.contains(&name.to_ascii_lowercase())
    }
}

/// Declare a template once per query type, lazily built on first use.
///
/// ```rust
/// fn template() -> &'static querycrate::QueryTemplate {
///     querycrate::query_template!("SELECT * FROM [Item] WHERE [OrganizationId]=@orgId {andWhere}")
/// }
///
/// assert!(template().embeds_parameter("OrgId"));
/// ```
#[macro_export]
macro_rules! query_template {
    ($sql:expr) => {{
        static TEMPLATE: ::std::sync::LazyLock<$crate::QueryTemplate> =
            ::std::sync::LazyLock::new(|| $crate::QueryTemplate::new($sql));
        &*TEMPLATE
    }};
}

/// Remove every reserved token from `sql`
#[must_use]
pub fn clear_tokens(sql: &str) -> String {
    [WHERE_TOKEN, AND_WHERE_TOKEN, ORDER_BY_TOKEN]
        .iter()
        .fold(sql.to_string(), |acc, token| acc.replace(token, ""))
}

/// Render a `CASE` expression that maps the stored values of an enum column to display labels.
///
/// ```rust
/// let sql = querycrate::case_expression("[Status]", &[(0, "Open"), (1, "Closed")]);
/// assert_eq!(sql, "CASE [Status] WHEN 0 THEN 'Open' WHEN 1 THEN 'Closed' END");
/// ```
#[must_use]
pub fn case_expression(expression: &str, variants: &[(i64, &str)]) -> String {
    let mut sql = format!("CASE {expression}");
    for (value, label) in variants {
        let label = label.replace('\'', "''");
        let _ = write!(sql, " WHEN {value} THEN '{label}'");
    }
    sql.push_str(" END");
    sql
}
