//! Row mapping traits and utilities

use crate::error::{FluentError, FluentResult};
use crate::value::Value;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// One result row: column labels plus values, in select-list order.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    /// Build a row. Extra values beyond the column list are dropped.
    pub fn new(columns: Arc<[String]>, mut values: Vec<Value>) -> Self {
        values.truncate(columns.len());
        Self { columns, values }
    }

    /// Build a row from `(label, value)` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let (columns, values): (Vec<String>, Vec<Value>) = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .unzip();
        Self {
            columns: columns.into(),
            values,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw value by column label.
    pub fn get(&self, column: &str) -> Option<&Value> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.values.get(idx)
    }

    /// Raw value by position.
    pub fn get_index(&self, idx: usize) -> Option<&Value> {
        self.values.get(idx)
    }

    /// Typed value by column label.
    pub fn try_get<T: FromValue>(&self, column: &str) -> FluentResult<T> {
        let value = self
            .get(column)
            .ok_or_else(|| FluentError::decode(column, "column not present in row"))?;
        T::from_value(value).map_err(|message| FluentError::decode(column, message))
    }

    /// Typed value by the first label that is present.
    ///
    /// Used by `#[derive(FromRow)]` to accept either the property name or the
    /// physical column name.
    pub fn try_get_any<T: FromValue>(&self, columns: &[&str]) -> FluentResult<T> {
        for column in columns {
            if self.get(column).is_some() {
                return self.try_get(column);
            }
        }
        let label = columns.first().copied().unwrap_or_default();
        T::from_value(&Value::Null).map_err(|_| FluentError::decode(label, "column not present in row"))
    }

    /// Typed value by position.
    pub fn try_get_index<T: FromValue>(&self, idx: usize) -> FluentResult<T> {
        let label = self
            .columns
            .get(idx)
            .cloned()
            .unwrap_or_else(|| format!("#{idx}"));
        let value = self
            .values
            .get(idx)
            .ok_or_else(|| FluentError::decode(&label, "column index out of range"))?;
        T::from_value(value).map_err(|message| FluentError::decode(label, message))
    }
}

/// Conversion from a decoded [`Value`] into a Rust type.
pub trait FromValue: Sized {
    /// Convert, returning a human-readable message on mismatch.
    fn from_value(value: &Value) -> Result<Self, String>;
}

fn mismatch<T>(expected: &str, value: &Value) -> Result<T, String> {
    Err(format!("expected {expected}, found {}", value.type_name()))
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self, String> {
        Ok(value.clone())
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Bool(b) => Ok(*b),
            // some drivers report TINYINT(1)-style flags
            Value::SmallInt(n) => Ok(*n != 0),
            Value::Int(n) => Ok(*n != 0),
            other => mismatch("bool", other),
        }
    }
}

macro_rules! impl_from_value_int {
    ($($ty:ty),*) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: &Value) -> Result<Self, String> {
                    let wide: i64 = match value {
                        Value::SmallInt(n) => (*n).into(),
                        Value::Int(n) => (*n).into(),
                        Value::BigInt(n) => *n,
                        other => return mismatch(stringify!($ty), other),
                    };
                    <$ty>::try_from(wide)
                        .map_err(|_| format!("{wide} out of range for {}", stringify!($ty)))
                }
            }
        )*
    };
}

impl_from_value_int!(i16, i32, i64, u32, u64);

impl FromValue for f32 {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Float(f) => Ok(*f),
            other => mismatch("f32", other),
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Float(f) => Ok((*f).into()),
            Value::Double(f) => Ok(*f),
            other => mismatch("f64", other),
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Text(s) => Ok(s.clone()),
            other => mismatch("text", other),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Bytes(b) => Ok(b.clone()),
            other => mismatch("bytes", other),
        }
    }
}

impl FromValue for Uuid {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Uuid(u) => Ok(*u),
            Value::Text(s) => Uuid::parse_str(s).map_err(|e| e.to_string()),
            other => mismatch("uuid", other),
        }
    }
}

impl FromValue for NaiveDate {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Date(d) => Ok(*d),
            other => mismatch("date", other),
        }
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::DateTime(dt) => Ok(*dt),
            Value::Timestamp(ts) => Ok(ts.naive_utc()),
            other => mismatch("datetime", other),
        }
    }
}

impl FromValue for DateTime<Utc> {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Timestamp(ts) => Ok(*ts),
            Value::DateTime(dt) => Ok(dt.and_utc()),
            other => mismatch("timestamp", other),
        }
    }
}

impl FromValue for serde_json::Value {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Json(j) => Ok(j.clone()),
            Value::Text(s) => serde_json::from_str(s).map_err(|e| e.to_string()),
            other => mismatch("json", other),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

/// Trait for converting a result row into a Rust value.
///
/// Scalars read the first column (so `COUNT(1)` maps to `i64`); structs
/// should use `#[derive(FromRow)]`.
///
/// # Example
///
/// ```ignore
/// use fluentsql::FromRow;
///
/// #[derive(FromRow)]
/// struct Tenant {
///     id: i64,
///     name: String,
///     remark: Option<String>,
/// }
/// ```
pub trait FromRow: Sized {
    /// Convert a row into Self
    fn from_row(row: &Row) -> FluentResult<Self>;
}

impl FromRow for Row {
    fn from_row(row: &Row) -> FluentResult<Self> {
        Ok(row.clone())
    }
}

macro_rules! impl_from_row_scalar {
    ($($ty:ty),*) => {
        $(
            impl FromRow for $ty {
                fn from_row(row: &Row) -> FluentResult<Self> {
                    row.try_get_index(0)
                }
            }
        )*
    };
}

impl_from_row_scalar!(
    bool,
    i16,
    i32,
    i64,
    u32,
    u64,
    f32,
    f64,
    String,
    Uuid,
    NaiveDate,
    NaiveDateTime,
    DateTime<Utc>,
    serde_json::Value
);
