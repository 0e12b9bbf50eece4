use std::future::Future;

use sea_orm::{ConnectionTrait, FromQueryResult};

use crate::errors::QueryError;
use crate::template::ResolvedQuery;

/// Run a resolved query and map every row
pub(crate) async fn fetch_all<T, C>(db: &C, query: &ResolvedQuery) -> Result<Vec<T>, QueryError>
where
    T: FromQueryResult,
    C: ConnectionTrait,
{
    let statement = query.statement(db.get_database_backend())?;
    T::find_by_statement(statement)
        .all(db)
        .await
        .map_err(QueryError::from)
        .inspect_err(QueryError::log)
}

/// Run a resolved query and map its first row, if any
pub(crate) async fn fetch_optional<T, C>(db: &C, query: &ResolvedQuery) -> Result<Option<T>, QueryError>
where
    T: FromQueryResult,
    C: ConnectionTrait,
{
    let statement = query.statement(db.get_database_backend())?;
    T::find_by_statement(statement)
        .one(db)
        .await
        .map_err(QueryError::from)
        .inspect_err(QueryError::log)
}

/// Drive `future` to completion on a private current-thread runtime.
///
/// Panics if called from inside a tokio runtime, like any nested `block_on`.
pub(crate) fn block_on<T>(future: impl Future<Output = Result<T, QueryError>>) -> Result<T, QueryError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(future)
}
