//! # Error Handling for Query Templates
//!
//! Every fallible operation in this crate returns [`QueryError`]. The variants fall in two groups:
//!
//! - **Template errors** raised by the engine itself: a sort index used without declared sort
//!   options, a sort index out of range, a malformed dynamic term, a base query that cannot be
//!   paged, or a named parameter that has no value to bind.
//! - **Pass-through errors** from collaborators: database errors (`DbErr`) are wrapped unchanged,
//!   never reinterpreted.
//!
//! Self-test failures wrap the underlying cause with the query name and the case under test so
//! that a batch of self-tests can be diagnosed from the messages alone.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use querycrate::{Query, QueryError};
//!
//! match AllOrgs::default().execute_on(&db, Some(7)).await {
//!     Err(QueryError::SortIndexOutOfRange { index, len, .. }) => {
//!         eprintln!("sort {index} requested but only {len} options exist");
//!     }
//!     other => { /* ... */ }
//! }
//! ```

use sea_orm::DbErr;
use std::fmt;

/// Errors produced while resolving, binding or executing a query template
#[derive(Debug)]
pub enum QueryError {
    /// A sort index was supplied but the query declares no sort options
    NoSortOptions {
        /// Name of the query type
        query: String,
    },

    /// A sort index was outside the declared sort options
    SortIndexOutOfRange {
        /// Name of the query type
        query: String,
        /// Requested index
        index: usize,
        /// Number of declared sort options
        len: usize,
    },

    /// A dynamic WHERE term does not reference exactly one parameter
    MalformedTerm {
        /// Term text as written in the block
        term: String,
        /// Number of distinct parameters found in the term
        found: usize,
    },

    /// The SQL references a parameter that has no value in the parameter bag
    UnboundParameter {
        /// Parameter name without the `@` prefix
        name: String,
    },

    /// The base query handed to the page-window builder has no `SELECT` keyword
    MissingSelect,

    /// A self-test execution failed
    SelfTest {
        /// Name of the query type
        query: String,
        /// The case under test, e.g. `Sort option: [Name] ASC`
        context: String,
        /// Underlying failure
        source: Box<QueryError>,
    },

    /// A parameter object could not be converted into a parameter bag
    Serialize(serde_json::Error),

    /// The runtime behind a blocking call could not be started
    Runtime(std::io::Error),

    /// Error returned by the database layer, passed through unchanged
    Database(DbErr),
}

impl QueryError {
    pub(crate) fn no_sort_options(query: &str) -> Self {
        Self::NoSortOptions {
            query: query.to_string(),
        }
    }

    pub(crate) fn sort_index_out_of_range(query: &str, index: usize, len: usize) -> Self {
        Self::SortIndexOutOfRange {
            query: query.to_string(),
            index,
            len,
        }
    }

    pub(crate) fn self_test(query: &str, context: impl Into<String>, source: QueryError) -> Self {
        Self::SelfTest {
            query: query.to_string(),
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// Returns true for the errors raised by the template engine itself,
    /// as opposed to errors passed through from the database layer.
    #[must_use]
    pub fn is_template_error(&self) -> bool {
        match self {
            Self::NoSortOptions { .. }
            | Self::SortIndexOutOfRange { .. }
            | Self::MalformedTerm { .. }
            | Self::UnboundParameter { .. }
            | Self::MissingSelect => true,
            Self::SelfTest { source, .. } => source.is_template_error(),
            Self::Serialize(_) | Self::Runtime(_) | Self::Database(_) => false,
        }
    }

    /// Log the error through `tracing`. Only emits output if the application installed a subscriber.
    pub(crate) fn log(&self) {
        match self {
            Self::Database(internal) => {
                tracing::error!(error = ?internal, "Database error while executing query");
            }
            Self::SelfTest { query, context, source } => {
                tracing::error!(
                    query = %query,
                    context = %context,
                    error = %source,
                    "Query self-test failed"
                );
            }
            _ => {
                tracing::debug!(error = %self, "Query template error");
            }
        }
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSortOptions { query } => {
                write!(f, "no sort options are declared for query {query}")
            }
            Self::SortIndexOutOfRange { query, index, len } => write!(
                f,
                "sort index {index} is out of range of the {len} sort options declared for query {query}"
            ),
            Self::MalformedTerm { term, found } => write!(
                f,
                "dynamic WHERE term '{term}' must reference exactly one parameter, found {found}"
            ),
            Self::UnboundParameter { name } => {
                write!(f, "no value was supplied for parameter @{name}")
            }
            Self::MissingSelect => {
                write!(f, "the base query has no SELECT keyword to attach a row number to")
            }
            Self::SelfTest {
                query,
                context,
                source,
            } => write!(f, "Error in query {query}: {source} ({context})"),
            Self::Serialize(err) => write!(f, "could not build parameters: {err}"),
            Self::Runtime(err) => write!(f, "could not start a blocking runtime: {err}"),
            Self::Database(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for QueryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::SelfTest { source, .. } => Some(source.as_ref()),
            Self::Serialize(err) => Some(err),
            Self::Runtime(err) => Some(err),
            Self::Database(err) => Some(err),
            _ => None,
        }
    }
}

// ============================================================================
// Conversions from collaborator error types
// ============================================================================

impl From<DbErr> for QueryError {
    fn from(err: DbErr) -> Self {
        Self::Database(err)
    }
}

impl From<serde_json::Error> for QueryError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialize(err)
    }
}

impl From<std::io::Error> for QueryError {
    fn from(err: std::io::Error) -> Self {
        Self::Runtime(err)
    }
}
