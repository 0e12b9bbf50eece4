//! SQL templates with optional criteria, indexed sort options and page windows, executed through
//! Sea-ORM.
//!
//! Two ways to write a query:
//!
//! - a query object implementing [`Query`] (usually `#[derive(Query)]`), whose template carries
//!   `{where}`/`{andWhere}`/`{orderBy}` tokens resolved from the object's fields, and
//! - raw SQL with an inline `where {{ ... }}` block, rewritten by [`build_query`] from a
//!   [`ParameterBag`].

pub mod core;
pub mod dynamic;
pub mod errors;
pub mod pagination;
pub mod params;
pub mod template;

#[cfg(feature = "derive")]
pub use querycrate_derive::Query; // Export the proc macro

pub use crate::core::{ConnectFn, ConnectionProvider, DatabaseUrl, Query};
pub use dynamic::{
    WhereClauseTerm, and_where_clause, build_query, build_query_for, dynamic_query,
    dynamic_query_blocking, dynamic_query_for, dynamic_rows, dynamic_rows_for, where_clause,
};
pub use errors::QueryError;
pub use pagination::build_paged;
pub use params::{ParameterBag, bind, param_value, parameter_names};
pub use template::{
    Criterion, QueryTemplate, ResolvedQuery, SortOption, WhereToken, case_expression, clear_tokens,
    resolve, sort_expression,
};

// Parameter values are `serde_json::Value`
pub use serde_json;
