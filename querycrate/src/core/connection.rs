use std::future::Future;

use async_trait::async_trait;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr};

use crate::errors::QueryError;

/// Source of a connection for the calls that do not take one from the caller.
///
/// A connection obtained this way serves exactly one call and is dropped when that call returns,
/// fails or is cancelled.
#[async_trait]
pub trait ConnectionProvider: Send + Sync {
    async fn connect(&self) -> Result<DatabaseConnection, QueryError>;
}

/// Connect with `sea_orm::Database::connect` on every call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseUrl(pub String);

impl DatabaseUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }
}

#[async_trait]
impl ConnectionProvider for DatabaseUrl {
    async fn connect(&self) -> Result<DatabaseConnection, QueryError> {
        Ok(Database::connect(self.0.as_str()).await?)
    }
}

/// Hand out clones of an existing connection (a pool for the sqlx backends)
#[async_trait]
impl ConnectionProvider for DatabaseConnection {
    async fn connect(&self) -> Result<DatabaseConnection, QueryError> {
        Ok(self.clone())
    }
}

/// Wrap a closure that opens a connection.
///
/// ```rust,no_run
/// use querycrate::ConnectFn;
/// use sea_orm::Database;
///
/// let provider = ConnectFn(|| Database::connect("sqlite::memory:"));
/// ```
pub struct ConnectFn<F>(pub F);

#[async_trait]
impl<F, Fut> ConnectionProvider for ConnectFn<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<DatabaseConnection, DbErr>> + Send,
{
    async fn connect(&self) -> Result<DatabaseConnection, QueryError> {
        Ok((self.0)().await?)
    }
}

pub(crate) async fn acquire<P: ConnectionProvider + ?Sized>(
    provider: &P,
) -> Result<DatabaseConnection, QueryError> {
    let db = provider.connect().await.inspect_err(QueryError::log)?;
    tracing::trace!(backend = ?db.get_database_backend(), "Connection acquired");
    Ok(db)
}

pub(crate) fn release(db: DatabaseConnection) {
    drop(db);
    tracing::trace!("Connection released");
}
