//! Convenient imports for typical `fluentsql` usage.
//!
//! ```ignore
//! use fluentsql::prelude::*;
//! ```

pub use crate::{
    DataPage, Entity, Field, FluentError, FluentResult, FromRow, Query, Row, SelectItem,
    SqlExecutor, Value, as_alias, asc, count, count_all, desc, select, select_all, update,
    update_table, where_,
};

#[cfg(feature = "postgres")]
pub use crate::PgExecutor;
