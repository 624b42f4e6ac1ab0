//! Execution seam.
//!
//! Rendering ends with an immutable [`BoundSql`]; running it is delegated to a
//! [`SqlExecutor`]. One executor can be bound process-wide with [`bind`], or
//! passed explicitly to the `*_with` methods.

use crate::error::{FluentError, FluentResult};
use crate::row::Row;
use crate::value::Value;
use async_trait::async_trait;
use std::fmt;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

/// Runs generic SQL (`?` placeholders, backtick identifiers).
///
/// Errors raised here are passed through to the caller unchanged. An
/// implementation may report "no rows" from `fetch_opt` either as `Ok(None)`
/// or as [`FluentError::NotFound`]; both surface as `None`.
#[async_trait]
pub trait SqlExecutor: Send + Sync {
    /// Run a query and return every row.
    async fn fetch_all(&self, sql: &str, params: &[Value]) -> FluentResult<Vec<Row>>;

    /// Run a query and return the first row, if any.
    async fn fetch_opt(&self, sql: &str, params: &[Value]) -> FluentResult<Option<Row>> {
        Ok(self.fetch_all(sql, params).await?.into_iter().next())
    }

    /// Run a statement and return the affected row count.
    async fn execute(&self, sql: &str, params: &[Value]) -> FluentResult<u64>;
}

#[async_trait]
impl<E: SqlExecutor + ?Sized> SqlExecutor for Arc<E> {
    async fn fetch_all(&self, sql: &str, params: &[Value]) -> FluentResult<Vec<Row>> {
        (**self).fetch_all(sql, params).await
    }

    async fn fetch_opt(&self, sql: &str, params: &[Value]) -> FluentResult<Option<Row>> {
        (**self).fetch_opt(sql, params).await
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> FluentResult<u64> {
        (**self).execute(sql, params).await
    }
}

// ==================== Global binding ====================

static EXECUTOR: LazyLock<RwLock<Option<Arc<dyn SqlExecutor>>>> =
    LazyLock::new(|| RwLock::new(None));

/// Bind the process-wide executor, replacing any previous one.
pub fn bind<E: SqlExecutor + 'static>(executor: E) {
    bind_shared(Arc::new(executor));
}

/// Bind an already shared executor.
pub fn bind_shared(executor: Arc<dyn SqlExecutor>) {
    let previous = EXECUTOR
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .replace(executor);

    #[cfg(feature = "tracing")]
    tracing::info!(replaced = previous.is_some(), "sql executor bound");
    #[cfg(not(feature = "tracing"))]
    let _ = previous;
}

/// Remove the process-wide executor.
pub fn unbind() -> Option<Arc<dyn SqlExecutor>> {
    EXECUTOR.write().unwrap_or_else(PoisonError::into_inner).take()
}

/// The bound executor, or a configuration error.
pub fn current() -> FluentResult<Arc<dyn SqlExecutor>> {
    EXECUTOR
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
        .ok_or_else(|| {
            FluentError::configuration("no executor bound; call fluentsql::bind() first")
        })
}

// ==================== Bound statement ====================

/// What rows of a statement are expected to map into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultType {
    /// The statement's primary entity, by type path.
    Entity(&'static str),
    /// A concrete Rust type, by `std::any::type_name`.
    Type(&'static str),
    /// Untyped rows (string tables, updates).
    Rows,
}

impl ResultType {
    pub fn of<T: ?Sized>() -> Self {
        ResultType::Type(std::any::type_name::<T>())
    }

    pub fn name(&self) -> &'static str {
        match self {
            ResultType::Entity(name) | ResultType::Type(name) => name,
            ResultType::Rows => "rows",
        }
    }
}

/// A fully rendered statement: SQL text, ordered parameters, result type.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundSql {
    sql: String,
    params: Vec<Value>,
    result_type: ResultType,
}

impl BoundSql {
    pub(crate) fn new(sql: String, params: Vec<Value>, result_type: ResultType) -> Self {
        Self {
            sql,
            params,
            result_type,
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Parameters in placeholder order.
    pub fn parameters(&self) -> &[Value] {
        &self.params
    }

    pub fn result_type(&self) -> ResultType {
        self.result_type
    }

    pub(crate) fn with_result_type(mut self, result_type: ResultType) -> Self {
        self.result_type = result_type;
        self
    }

    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.sql, self.params)
    }

    pub(crate) fn log(&self) {
        #[cfg(feature = "tracing")]
        {
            let cfg = crate::config::config();
            if cfg.log_statements {
                tracing::debug!(
                    target: "fluentsql.sql",
                    sql = %crate::config::truncate_for_log(&self.sql, cfg.max_logged_sql_length),
                    params = self.params.len(),
                    result_type = self.result_type.name(),
                    "executing statement"
                );
            }
        }
    }
}

impl fmt::Display for BoundSql {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}
