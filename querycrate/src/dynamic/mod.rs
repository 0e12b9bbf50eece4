//! # Dynamic WHERE Blocks
//!
//! The dynamic form writes the optional criteria inline in the SQL text:
//!
//! ```sql
//! SELECT * FROM [sys].[tables] where {{ [name]=@table }{ [column]=@column }}
//! ```
//!
//! Each `{ ... }` term references exactly one parameter. A term is kept when the parameter bag has
//! that exact key with a non-null value. Kept terms become `WHERE t1 AND t2 ...` (or `AND ...` for
//! an `andWhere {{ ... }}` block); when nothing is kept the whole block disappears.
//!
//! Blocks cannot nest. SQL without a block passes through unchanged, as does a block that never
//! closes.

mod scanner;

use std::collections::HashSet;

use sea_orm::{ConnectionTrait, FromQueryResult};
use serde::Serialize;
use serde_json::Value;

use crate::core::connection::{ConnectionProvider, acquire, release};
use crate::core::execute::{block_on, fetch_all};
use crate::errors::QueryError;
use crate::params::{ParameterBag, parameter_refs};
use crate::template::{ResolvedQuery, WhereToken};

/// One candidate criterion of a WHERE clause: a SQL fragment and the value of its single parameter
#[derive(Debug, Clone, PartialEq)]
pub struct WhereClauseTerm {
    pub value: Value,
    pub expression: String,
}

impl WhereClauseTerm {
    pub fn new(value: Value, expression: impl Into<String>) -> Self {
        Self {
            value,
            expression: expression.into(),
        }
    }

    /// The name (without `@`) of the one parameter the expression references.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::MalformedTerm` when the expression references no parameter or more
    /// than one distinct parameter.
    pub fn parameter_name(&self) -> Result<&str, QueryError> {
        single_parameter(&self.expression)
    }
}

fn single_parameter(expression: &str) -> Result<&str, QueryError> {
    let names: Vec<&str> = parameter_refs(expression).into_iter().map(|r| r.name).collect();
    let distinct: HashSet<&str> = names.iter().copied().collect();

    match (names.first(), distinct.len()) {
        (Some(name), 1) => Ok(*name),
        (_, found) => Err(QueryError::MalformedTerm {
            term: expression.to_string(),
            found,
        }),
    }
}

fn compose<'a>(keyword: WhereToken, expressions: impl IntoIterator<Item = &'a str>) -> String {
    let expressions: Vec<&str> = expressions.into_iter().collect();
    if expressions.is_empty() {
        String::new()
    } else {
        format!("{} {}", keyword.keyword(), expressions.join(" AND "))
    }
}

fn clause(keyword: WhereToken, terms: &[WhereClauseTerm]) -> Result<(String, ParameterBag), QueryError> {
    let mut bindings = ParameterBag::new();
    let mut included = Vec::new();

    for term in terms {
        let name = term.parameter_name()?;
        if !term.value.is_null() {
            bindings.insert(name, term.value.clone());
            included.push(term.expression.as_str());
        }
    }

    Ok((compose(keyword, included), bindings))
}

/// `WHERE t1 AND t2 ...` over the terms with a non-null value, and the bindings they need.
/// The fragment is empty when no term has a value.
///
/// # Errors
///
/// Returns `QueryError::MalformedTerm` for a term without exactly one parameter.
///
/// ```rust
/// use querycrate::{WhereClauseTerm, where_clause};
/// use serde_json::{Value, json};
///
/// let terms = [
///     WhereClauseTerm::new(json!("org"), "[name]=@table"),
///     WhereClauseTerm::new(Value::Null, "[column]=@column"),
/// ];
/// let (sql, bindings) = where_clause(&terms).unwrap();
/// assert_eq!(sql, "WHERE [name]=@table");
/// assert_eq!(bindings.get("table"), Some(&json!("org")));
/// assert!(!bindings.contains_key("column"));
/// ```
pub fn where_clause(terms: &[WhereClauseTerm]) -> Result<(String, ParameterBag), QueryError> {
    clause(WhereToken::Where, terms)
}

/// Same as [`where_clause`] with an `AND ` prefix, for queries that already have a WHERE clause.
///
/// # Errors
///
/// Returns `QueryError::MalformedTerm` for a term without exactly one parameter.
pub fn and_where_clause(terms: &[WhereClauseTerm]) -> Result<(String, ParameterBag), QueryError> {
    clause(WhereToken::AndWhere, terms)
}

/// Rewrite the first dynamic block of `sql` using the entries of `parameters`.
///
/// # Errors
///
/// Returns `QueryError::MalformedTerm` when a term of the block does not reference exactly one
/// parameter.
///
/// ```rust
/// use querycrate::{ParameterBag, build_query};
///
/// let sql = "SELECT * FROM [sys].[tables] where {{ [name]=@table }{ [column]=@column }}";
/// let parameters = ParameterBag::new().with("table", "org");
///
/// assert_eq!(build_query(sql, &parameters).unwrap(), "SELECT * FROM [sys].[tables] WHERE [name]=@table");
/// ```
pub fn build_query(sql: &str, parameters: &ParameterBag) -> Result<String, QueryError> {
    let Some(block) = scanner::scan(sql) else {
        return Ok(sql.to_string());
    };

    let mut kept = Vec::with_capacity(block.terms.len());
    for term in &block.terms {
        let name = single_parameter(term)?;
        if parameters.get(name).is_some_and(|value| !value.is_null()) {
            kept.push(*term);
        }
    }

    let rewritten = format!(
        "{}{}{}",
        &sql[..block.span.start],
        compose(block.keyword, kept.iter().copied()),
        &sql[block.span.end..]
    );
    tracing::debug!(
        terms = block.terms.len(),
        kept = kept.len(),
        sql = %rewritten,
        "Rewrote dynamic WHERE block"
    );
    Ok(rewritten)
}

/// [`build_query`] over the fields of a serializable object. Fields that serialize to null or to
/// an empty string count as absent.
///
/// # Errors
///
/// - `QueryError::Serialize` when `parameters` does not serialize to an object
/// - `QueryError::MalformedTerm` as for [`build_query`]
pub fn build_query_for<T: Serialize + ?Sized>(sql: &str, parameters: &T) -> Result<String, QueryError> {
    build_query(sql, &ParameterBag::from_object(parameters)?.populated())
}

/// Rewrite the dynamic block of `sql` and run it on `db` with `parameters` bound.
///
/// # Errors
///
/// Returns the errors of [`build_query`], a `QueryError::UnboundParameter` when the SQL outside
/// the block references a missing name, or the database error unchanged.
pub async fn dynamic_query<T, C>(db: &C, sql: &str, parameters: &ParameterBag) -> Result<Vec<T>, QueryError>
where
    T: FromQueryResult,
    C: ConnectionTrait,
{
    let resolved = ResolvedQuery::new(build_query(sql, parameters)?, parameters.clone());
    fetch_all(db, &resolved).await
}

/// [`dynamic_query`] with the parameters taken from the fields of a serializable object.
///
/// # Errors
///
/// As for [`dynamic_query`], plus `QueryError::Serialize` when `parameters` is not an object.
pub async fn dynamic_query_for<T, C, P>(db: &C, sql: &str, parameters: &P) -> Result<Vec<T>, QueryError>
where
    T: FromQueryResult,
    C: ConnectionTrait,
    P: Serialize + ?Sized,
{
    let bag = ParameterBag::from_object(parameters)?;
    let resolved = ResolvedQuery::new(build_query(sql, &bag.populated())?, bag);
    fetch_all(db, &resolved).await
}

/// [`dynamic_query`] for ad-hoc SQL with no row type: every row comes back as a JSON object keyed
/// by column name.
///
/// # Errors
///
/// As for [`dynamic_query`].
pub async fn dynamic_rows<C: ConnectionTrait>(
    db: &C,
    sql: &str,
    parameters: &ParameterBag,
) -> Result<Vec<Value>, QueryError> {
    dynamic_query::<Value, C>(db, sql, parameters).await
}

/// [`dynamic_rows`] with the parameters taken from the fields of a serializable object. Fields that
/// serialize to null are bound as SQL `NULL`.
///
/// # Errors
///
/// As for [`dynamic_query_for`].
pub async fn dynamic_rows_for<C, P>(db: &C, sql: &str, parameters: &P) -> Result<Vec<Value>, QueryError>
where
    C: ConnectionTrait,
    P: Serialize + ?Sized,
{
    dynamic_query_for::<Value, C, P>(db, sql, parameters).await
}

/// Blocking [`dynamic_query`] on a connection acquired from `provider` for this call only.
/// Must not be called from inside an async runtime.
///
/// # Errors
///
/// As for [`dynamic_query`], plus connection and runtime start-up failures.
pub fn dynamic_query_blocking<T, P>(provider: &P, sql: &str, parameters: &ParameterBag) -> Result<Vec<T>, QueryError>
where
    T: FromQueryResult,
    P: ConnectionProvider + ?Sized,
{
    block_on(async {
        let db = acquire(provider).await?;
        let rows = dynamic_query(&db, sql, parameters).await;
        release(db);
        rows
    })
}
