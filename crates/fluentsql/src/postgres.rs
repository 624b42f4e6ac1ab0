//! [`SqlExecutor`] over tokio-postgres.
//!
//! Rendered statements use the generic dialect (`?` placeholders, backtick
//! identifiers); [`to_postgres_sql`] rewrites them before they reach the
//! server.
//!
//! ```ignore
//! let (client, connection) = tokio_postgres::connect(&url, NoTls).await?;
//! tokio::spawn(connection);
//! fluentsql::bind(PgExecutor::new(client));
//! ```

use crate::error::{FluentError, FluentResult};
use crate::executor::SqlExecutor;
use crate::row::Row;
use crate::value::Value;
use async_trait::async_trait;
use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::error::Error;
use std::sync::Arc;
use tokio_postgres::types::{FromSql, IsNull, ToSql, Type, to_sql_checked};
use uuid::Uuid;

#[cfg(feature = "pool")]
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};

// ==================== Dialect ====================

/// Rewrite generic SQL for PostgreSQL.
///
/// - `?` becomes `$1`, `$2`, ... in order of appearance
/// - `` `ident` `` becomes `"ident"` (doubled backticks unescape, embedded
///   double quotes are doubled)
/// - single-quoted literals are copied untouched
pub fn to_postgres_sql(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len() + 8);
    let mut chars = sql.chars().peekable();
    let mut index = 0usize;
    let mut in_literal = false;
    let mut in_ident = false;

    while let Some(ch) = chars.next() {
        if in_literal {
            out.push(ch);
            if ch == '\'' {
                in_literal = false;
            }
            continue;
        }
        if in_ident {
            match ch {
                '`' if chars.peek() == Some(&'`') => {
                    chars.next();
                    out.push('`');
                }
                '`' => {
                    out.push('"');
                    in_ident = false;
                }
                '"' => out.push_str("\"\""),
                _ => out.push(ch),
            }
            continue;
        }
        match ch {
            '\'' => {
                in_literal = true;
                out.push(ch);
            }
            '`' => {
                in_ident = true;
                out.push('"');
            }
            '?' => {
                index += 1;
                out.push('$');
                out.push_str(&index.to_string());
            }
            _ => out.push(ch),
        }
    }
    out
}

// ==================== Parameters ====================

impl ToSql for Value {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(b) => b.to_sql_checked(ty, out),
            Value::SmallInt(n) => integer_to_sql((*n).into(), ty, out),
            Value::Int(n) => integer_to_sql((*n).into(), ty, out),
            Value::BigInt(n) => integer_to_sql(*n, ty, out),
            Value::Float(f) if *ty == Type::FLOAT8 => f64::from(*f).to_sql_checked(ty, out),
            Value::Float(f) => f.to_sql_checked(ty, out),
            Value::Double(f) => f.to_sql_checked(ty, out),
            Value::Text(s) => s.to_sql_checked(ty, out),
            Value::Bytes(b) => b.to_sql_checked(ty, out),
            Value::Uuid(u) => u.to_sql_checked(ty, out),
            Value::Date(d) => d.to_sql_checked(ty, out),
            Value::DateTime(dt) => dt.to_sql_checked(ty, out),
            Value::Timestamp(ts) => ts.to_sql_checked(ty, out),
            Value::Json(j) => j.to_sql_checked(ty, out),
        }
    }

    // Checked per variant in `to_sql`.
    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

/// Integers are narrowed (checked) to whatever the server inferred.
fn integer_to_sql(
    n: i64,
    ty: &Type,
    out: &mut BytesMut,
) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
    match *ty {
        Type::INT2 => i16::try_from(n)?.to_sql(ty, out),
        Type::INT4 => i32::try_from(n)?.to_sql(ty, out),
        Type::OID => u32::try_from(n)?.to_sql(ty, out),
        Type::FLOAT8 => (n as f64).to_sql(ty, out),
        _ => n.to_sql_checked(ty, out),
    }
}

// ==================== Rows ====================

fn get<'a, T: FromSql<'a>>(row: &'a tokio_postgres::Row, idx: usize) -> FluentResult<Option<T>> {
    row.try_get::<_, Option<T>>(idx).map_err(|e| {
        let column = row.columns().get(idx).map(|c| c.name()).unwrap_or_default();
        FluentError::decode(column, e.to_string())
    })
}

fn decode_value(row: &tokio_postgres::Row, idx: usize, ty: &Type) -> FluentResult<Value> {
    let value = match *ty {
        Type::BOOL => get::<bool>(row, idx)?.map(Value::Bool),
        Type::INT2 => get::<i16>(row, idx)?.map(Value::SmallInt),
        Type::INT4 => get::<i32>(row, idx)?.map(Value::Int),
        Type::INT8 => get::<i64>(row, idx)?.map(Value::BigInt),
        Type::OID => get::<u32>(row, idx)?.map(|n| Value::BigInt(n.into())),
        Type::FLOAT4 => get::<f32>(row, idx)?.map(Value::Float),
        Type::FLOAT8 => get::<f64>(row, idx)?.map(Value::Double),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN => {
            get::<String>(row, idx)?.map(Value::Text)
        }
        Type::BYTEA => get::<Vec<u8>>(row, idx)?.map(Value::Bytes),
        Type::UUID => get::<Uuid>(row, idx)?.map(Value::Uuid),
        Type::DATE => get::<NaiveDate>(row, idx)?.map(Value::Date),
        Type::TIMESTAMP => get::<NaiveDateTime>(row, idx)?.map(Value::DateTime),
        Type::TIMESTAMPTZ => get::<DateTime<Utc>>(row, idx)?.map(Value::Timestamp),
        Type::JSON | Type::JSONB => get::<serde_json::Value>(row, idx)?.map(Value::Json),
        _ => {
            let column = row.columns().get(idx).map(|c| c.name()).unwrap_or_default();
            return Err(FluentError::decode(
                column,
                format!("unsupported column type {ty}"),
            ));
        }
    };
    Ok(value.unwrap_or(Value::Null))
}

fn decode_rows(rows: &[tokio_postgres::Row]) -> FluentResult<Vec<Row>> {
    let Some(first) = rows.first() else {
        return Ok(Vec::new());
    };
    let columns: Arc<[String]> = first
        .columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect();

    rows.iter()
        .map(|row| {
            let values = row
                .columns()
                .iter()
                .enumerate()
                .map(|(idx, column)| decode_value(row, idx, column.type_()))
                .collect::<FluentResult<Vec<_>>>()?;
            Ok(Row::new(Arc::clone(&columns), values))
        })
        .collect()
}

// ==================== Executor ====================

enum Backend {
    Client(tokio_postgres::Client),
    #[cfg(feature = "pool")]
    Pool(Pool),
}

/// Executes rendered statements on PostgreSQL.
pub struct PgExecutor {
    backend: Backend,
}

impl std::fmt::Debug for PgExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let backend = match &self.backend {
            Backend::Client(_) => "client",
            #[cfg(feature = "pool")]
            Backend::Pool(_) => "pool",
        };
        f.debug_struct("PgExecutor").field("backend", &backend).finish()
    }
}

impl PgExecutor {
    /// Run on a single connected client.
    pub fn new(client: tokio_postgres::Client) -> Self {
        Self {
            backend: Backend::Client(client),
        }
    }

    /// Run on connections checked out of `pool`, one per statement.
    #[cfg(feature = "pool")]
    pub fn from_pool(pool: Pool) -> Self {
        Self {
            backend: Backend::Pool(pool),
        }
    }

    /// Build a `NoTls` pool for `database_url` and run on it.
    #[cfg(feature = "pool")]
    pub fn connect_pool(database_url: &str, max_size: usize) -> FluentResult<Self> {
        let pg_config: tokio_postgres::Config = database_url
            .parse()
            .map_err(|e: tokio_postgres::Error| FluentError::configuration(e.to_string()))?;
        let manager = Manager::from_config(
            pg_config,
            tokio_postgres::NoTls,
            ManagerConfig {
                recycling_method: RecyclingMethod::Fast,
            },
        );
        let pool = Pool::builder(manager)
            .max_size(max_size)
            .build()
            .map_err(|e| FluentError::Pool(e.to_string()))?;
        Ok(Self::from_pool(pool))
    }

    async fn query(&self, sql: &str, params: &[Value]) -> FluentResult<Vec<tokio_postgres::Row>> {
        let sql = to_postgres_sql(sql);
        let params: Vec<&(dyn ToSql + Sync)> =
            params.iter().map(|v| v as &(dyn ToSql + Sync)).collect();
        match &self.backend {
            Backend::Client(client) => Ok(client.query(sql.as_str(), &params).await?),
            #[cfg(feature = "pool")]
            Backend::Pool(pool) => {
                let client = pool.get().await?;
                Ok(client.query(sql.as_str(), &params).await?)
            }
        }
    }
}

#[async_trait]
impl SqlExecutor for PgExecutor {
    async fn fetch_all(&self, sql: &str, params: &[Value]) -> FluentResult<Vec<Row>> {
        let rows = self.query(sql, params).await?;
        decode_rows(&rows)
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> FluentResult<u64> {
        let sql = to_postgres_sql(sql);
        let params: Vec<&(dyn ToSql + Sync)> =
            params.iter().map(|v| v as &(dyn ToSql + Sync)).collect();
        match &self.backend {
            Backend::Client(client) => Ok(client.execute(sql.as_str(), &params).await?),
            #[cfg(feature = "pool")]
            Backend::Pool(pool) => {
                let client = pool.get().await?;
                Ok(client.execute(sql.as_str(), &params).await?)
            }
        }
    }
}
