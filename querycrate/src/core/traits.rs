use async_trait::async_trait;
use sea_orm::{ConnectionTrait, FromQueryResult};

use crate::core::connection::{ConnectionProvider, acquire, release};
use crate::core::execute::{block_on, fetch_all, fetch_optional};
use crate::errors::QueryError;
use crate::pagination::build_paged;
use crate::params::ParameterBag;
use crate::template::{Criterion, QueryTemplate, ResolvedQuery, SortOption, resolve, sort_expression};

/// A query object: one SQL template, the criteria that may be appended to it and the values bound
/// when it runs. Usually implemented with `#[derive(Query)]`.
///
/// Every execute method resolves the template afresh, so one value may be resolved and executed
/// from several tasks at once.
#[async_trait]
pub trait Query: Sized + Send + Sync {
    /// Row type produced by the query
    type Output: FromQueryResult + Send + Sync;

    /// Name used in error messages and logs
    const NAME: &'static str;

    fn template() -> &'static QueryTemplate;

    /// Sort options end users pick by index. `None` means the query declares none.
    #[must_use]
    fn sort_options() -> Option<&'static [SortOption]> {
        None
    }

    /// The optional criteria with their current values
    fn criteria(&self) -> Vec<Criterion>;

    /// Every value of the query by name, bound to the `@name` references of the resolved SQL
    fn parameters(&self) -> ParameterBag;

    /// Resolve the template for this invocation.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::NoSortOptions` or `QueryError::SortIndexOutOfRange` for a bad `sort_index`.
    fn resolve(&self, sort_index: Option<usize>) -> Result<ResolvedQuery, QueryError> {
        let sql = resolve(
            Self::NAME,
            Self::template(),
            Self::sort_options(),
            &self.criteria(),
            sort_index,
        )?;
        Ok(ResolvedQuery::new(sql, self.parameters()))
    }

    /// Resolve the criteria without ordering, then keep one page ordered by `order_by`.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::MissingSelect` when the template cannot be paged.
    fn resolve_paged(
        &self,
        order_by: &str,
        page_size: u64,
        page_number: u64,
    ) -> Result<ResolvedQuery, QueryError> {
        let base = self.resolve(None)?;
        let sql = build_paged(&base.sql, order_by, page_size, page_number)?;
        Ok(ResolvedQuery::new(sql, base.parameters))
    }

    /// ORDER BY expression of the declared sort option at `index`.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::NoSortOptions` or `QueryError::SortIndexOutOfRange`.
    fn sort_expression(index: usize) -> Result<&'static str, QueryError> {
        sort_expression(Self::NAME, Self::sort_options(), index)
    }

    // ------------------------------------------------------------------
    // Supplied connection
    // ------------------------------------------------------------------

    async fn execute_on<C: ConnectionTrait>(
        &self,
        db: &C,
        sort_index: Option<usize>,
    ) -> Result<Vec<Self::Output>, QueryError> {
        let query = self.resolve(sort_index).inspect_err(QueryError::log)?;
        fetch_all(db, &query).await
    }

    async fn execute_paged_on<C: ConnectionTrait>(
        &self,
        db: &C,
        order_by: &str,
        page_size: u64,
        page_number: u64,
    ) -> Result<Vec<Self::Output>, QueryError> {
        let query = self
            .resolve_paged(order_by, page_size, page_number)
            .inspect_err(QueryError::log)?;
        fetch_all(db, &query).await
    }

    async fn execute_sorted_page_on<C: ConnectionTrait>(
        &self,
        db: &C,
        sort_index: usize,
        page_size: u64,
        page_number: u64,
    ) -> Result<Vec<Self::Output>, QueryError> {
        let order_by = Self::sort_expression(sort_index).inspect_err(QueryError::log)?;
        self.execute_paged_on(db, order_by, page_size, page_number).await
    }

    async fn execute_single_on<C: ConnectionTrait>(
        &self,
        db: &C,
    ) -> Result<Option<Self::Output>, QueryError> {
        let query = self.resolve(None).inspect_err(QueryError::log)?;
        fetch_optional(db, &query).await
    }

    // ------------------------------------------------------------------
    // Connection acquired for the call
    // ------------------------------------------------------------------

    async fn execute<P: ConnectionProvider + ?Sized>(
        &self,
        provider: &P,
        sort_index: Option<usize>,
    ) -> Result<Vec<Self::Output>, QueryError> {
        let db = acquire(provider).await?;
        let rows = self.execute_on(&db, sort_index).await;
        release(db);
        rows
    }

    async fn execute_paged<P: ConnectionProvider + ?Sized>(
        &self,
        provider: &P,
        order_by: &str,
        page_size: u64,
        page_number: u64,
    ) -> Result<Vec<Self::Output>, QueryError> {
        let db = acquire(provider).await?;
        let rows = self
            .execute_paged_on(&db, order_by, page_size, page_number)
            .await;
        release(db);
        rows
    }

    async fn execute_sorted_page<P: ConnectionProvider + ?Sized>(
        &self,
        provider: &P,
        sort_index: usize,
        page_size: u64,
        page_number: u64,
    ) -> Result<Vec<Self::Output>, QueryError> {
        let db = acquire(provider).await?;
        let rows = self
            .execute_sorted_page_on(&db, sort_index, page_size, page_number)
            .await;
        release(db);
        rows
    }

    async fn execute_single<P: ConnectionProvider + ?Sized>(
        &self,
        provider: &P,
    ) -> Result<Option<Self::Output>, QueryError> {
        let db = acquire(provider).await?;
        let row = self.execute_single_on(&db).await;
        release(db);
        row
    }

    // ------------------------------------------------------------------
    // Blocking; must not be called from inside an async runtime
    // ------------------------------------------------------------------

    /// # Errors
    ///
    /// As for [`Query::execute`], plus `QueryError::Runtime` when the runtime cannot start.
    fn execute_blocking<P: ConnectionProvider + ?Sized>(
        &self,
        provider: &P,
        sort_index: Option<usize>,
    ) -> Result<Vec<Self::Output>, QueryError> {
        block_on(self.execute(provider, sort_index))
    }

    /// # Errors
    ///
    /// As for [`Query::execute_paged`], plus `QueryError::Runtime` when the runtime cannot start.
    fn execute_paged_blocking<P: ConnectionProvider + ?Sized>(
        &self,
        provider: &P,
        order_by: &str,
        page_size: u64,
        page_number: u64,
    ) -> Result<Vec<Self::Output>, QueryError> {
        block_on(self.execute_paged(provider, order_by, page_size, page_number))
    }

    /// # Errors
    ///
    /// As for [`Query::execute_sorted_page`], plus `QueryError::Runtime` when the runtime cannot start.
    fn execute_sorted_page_blocking<P: ConnectionProvider + ?Sized>(
        &self,
        provider: &P,
        sort_index: usize,
        page_size: u64,
        page_number: u64,
    ) -> Result<Vec<Self::Output>, QueryError> {
        block_on(self.execute_sorted_page(provider, sort_index, page_size, page_number))
    }

    /// # Errors
    ///
    /// As for [`Query::execute_single`], plus `QueryError::Runtime` when the runtime cannot start.
    fn execute_single_blocking<P: ConnectionProvider + ?Sized>(
        &self,
        provider: &P,
    ) -> Result<Option<Self::Output>, QueryError> {
        block_on(self.execute_single(provider))
    }

    // ------------------------------------------------------------------
    // Self-test
    // ------------------------------------------------------------------

    /// Execute the query against `db` in every configuration it declares: once with default
    /// values, once per sort option, and once per criterion that carries a test value.
    ///
    /// # Errors
    ///
    /// The first failure, wrapped in `QueryError::SelfTest` with the case that produced it.
    async fn self_test<C: ConnectionTrait>(db: &C) -> Result<(), QueryError>
    where
        Self: Default,
    {
        let query = Self::default();
        let criteria = query.criteria();
        let parameters = query.parameters();

        let run = |criteria: Vec<Criterion>, parameters: ParameterBag, sort_index: Option<usize>| async move {
            let sql = resolve(
                Self::NAME,
                Self::template(),
                Self::sort_options(),
                &criteria,
                sort_index,
            )?;
            fetch_all::<Self::Output, C>(db, &ResolvedQuery::new(sql, parameters)).await?;
            Ok::<(), QueryError>(())
        };
        let fail = |context: String, source: QueryError| {
            let err = QueryError::self_test(Self::NAME, context, source);
            err.log();
            err
        };

        run(criteria.clone(), parameters.clone(), None)
            .await
            .map_err(|e| fail("No arguments".to_string(), e))?;

        for (index, option) in Self::sort_options().unwrap_or_default().iter().enumerate() {
            run(criteria.clone(), parameters.clone(), Some(index))
                .await
                .map_err(|e| fail(format!("Sort option: {}", option.expression), e))?;
        }

        for (position, criterion) in criteria.iter().enumerate() {
            let Some(test_value) = &criterion.test_value else {
                continue;
            };
            let mut case_criteria = criteria.clone();
            case_criteria[position].value = test_value.clone();
            let mut case_parameters = parameters.clone();
            case_parameters.insert(criterion.name, test_value.clone());

            run(case_criteria, case_parameters, None)
                .await
                .map_err(|e| fail(format!("Field: {}", criterion.name), e))?;
        }

        tracing::debug!(query = Self::NAME, "Self-test passed");
        Ok(())
    }
}
