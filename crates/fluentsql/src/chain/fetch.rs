//! Typed fetch terminal.

use super::builder::StatementBuilder;
use crate::error::{FluentError, FluentResult};
use crate::executor::{self, BoundSql, ResultType, SqlExecutor};
use crate::page::DataPage;
use crate::row::FromRow;
use std::fmt;
use std::marker::PhantomData;

/// A finished SELECT whose rows map into `T`.
///
/// Every method without a suffix runs on the process-wide executor (see
/// [`bind`](crate::bind)); the `*_with` forms take one explicitly.
#[must_use = "a fetch does nothing until one of its methods is awaited"]
pub struct Fetch<T> {
    builder: StatementBuilder,
    _row: PhantomData<fn() -> T>,
}

impl<T> Clone for Fetch<T> {
    fn clone(&self) -> Self {
        Self::new(self.builder.clone())
    }
}

impl<T> fmt::Debug for Fetch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fetch")
            .field("row", &std::any::type_name::<T>())
            .field("builder", &self.builder)
            .finish()
    }
}

impl<T> Fetch<T> {
    pub(super) fn new(builder: StatementBuilder) -> Self {
        Self {
            builder,
            _row: PhantomData,
        }
    }
}

impl<T: FromRow> Fetch<T> {
    /// The row statement, with `T` as its result type.
    pub fn build(&self) -> FluentResult<BoundSql> {
        Ok(self.builder.build()?.with_result_type(ResultType::of::<T>()))
    }

    /// The `COUNT(1)` form of the statement.
    pub fn build_count(&self) -> FluentResult<BoundSql> {
        Ok(self
            .builder
            .build_count()?
            .with_result_type(ResultType::of::<u64>()))
    }

    /// The row statement restricted to one page.
    pub fn build_page(&self, page: &DataPage<T>) -> FluentResult<BoundSql> {
        page.validate()?;
        Ok(self
            .builder
            .build_paged(page.size, page.offset())?
            .with_result_type(ResultType::of::<T>()))
    }

    /// First row, or `None` when there is none.
    pub async fn one(&self) -> FluentResult<Option<T>> {
        let executor = executor::current()?;
        self.one_with(executor.as_ref()).await
    }

    pub async fn one_with(&self, executor: &dyn SqlExecutor) -> FluentResult<Option<T>> {
        let bound = self.build()?;
        bound.log();
        match executor.fetch_opt(bound.sql(), bound.parameters()).await {
            Ok(Some(row)) => T::from_row(&row).map(Some),
            Ok(None) => Ok(None),
            Err(err) if err.is_not_found() => {
                #[cfg(feature = "tracing")]
                tracing::trace!(error = %err, "no rows for single-row fetch");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Every row.
    pub async fn all(&self) -> FluentResult<Vec<T>> {
        let executor = executor::current()?;
        self.all_with(executor.as_ref()).await
    }

    pub async fn all_with(&self, executor: &dyn SqlExecutor) -> FluentResult<Vec<T>> {
        let bound = self.build()?;
        bound.log();
        fetch_rows(executor, &bound).await
    }

    /// Number of rows the statement matches, ignoring ORDER BY/LIMIT/OFFSET.
    pub async fn count(&self) -> FluentResult<u64> {
        let executor = executor::current()?;
        self.count_with(executor.as_ref()).await
    }

    pub async fn count_with(&self, executor: &dyn SqlExecutor) -> FluentResult<u64> {
        let bound = self.build_count()?;
        bound.log();
        let Some(row) = executor.fetch_opt(bound.sql(), bound.parameters()).await? else {
            return Ok(0);
        };
        let total = i64::from_row(&row)?;
        u64::try_from(total).map_err(|_| FluentError::decode("COUNT(1)", "negative row count"))
    }

    /// Fill `page` with its total and its slice of rows.
    ///
    /// The row query is skipped when the count is zero.
    pub async fn page(&self, page: DataPage<T>) -> FluentResult<DataPage<T>> {
        let executor = executor::current()?;
        self.page_with(executor.as_ref(), page).await
    }

    pub async fn page_with(
        &self,
        executor: &dyn SqlExecutor,
        mut page: DataPage<T>,
    ) -> FluentResult<DataPage<T>> {
        let bound = self.build_page(&page)?;
        page.total = self.count_with(executor).await?;
        page.list = if page.total == 0 {
            Vec::new()
        } else {
            bound.log();
            fetch_rows(executor, &bound).await?
        };
        Ok(page)
    }

    /// Run the statement and return the affected row count.
    pub async fn execute(&self) -> FluentResult<u64> {
        let executor = executor::current()?;
        self.execute_with(executor.as_ref()).await
    }

    pub async fn execute_with(&self, executor: &dyn SqlExecutor) -> FluentResult<u64> {
        let bound = self.build()?;
        bound.log();
        executor.execute(bound.sql(), bound.parameters()).await
    }
}

async fn fetch_rows<T: FromRow>(executor: &dyn SqlExecutor, bound: &BoundSql) -> FluentResult<Vec<T>> {
    executor
        .fetch_all(bound.sql(), bound.parameters())
        .await?
        .iter()
        .map(T::from_row)
        .collect()
}
