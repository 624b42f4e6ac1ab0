//! # fluentsql
//!
//! Fluent, typed construction of parameterized SELECT/UPDATE statements.
//!
//! ## Features
//!
//! - **Typed field references**: `#[derive(Entity)]` generates one [`Field`]
//!   constant per property; table and column names are resolved (and cached)
//!   from static metadata, never from strings scattered over call sites
//! - **Optional filters without branching**: conditions whose operand is
//!   absent (`None`, empty text) are skipped, and an empty `WHERE` disappears
//! - **Positional parameters**: placeholders and parameters are emitted in the
//!   same pass, so their order always agrees
//! - **Scoped aliases**: every render gets its own alias context, so
//!   concurrent builds never share state
//! - **Pluggable execution**: statements run through a [`SqlExecutor`]; a
//!   PostgreSQL adapter ships behind the `postgres` feature
//!
//! ## Example
//!
//! ```ignore
//! use fluentsql::prelude::*;
//!
//! #[derive(Debug, Entity, FromRow)]
//! #[fluent(table = "saas_tenant")]
//! struct Tenant {
//!     id: i64,
//!     name: String,
//!     enable: bool,
//! }
//!
//! fluentsql::bind(executor);
//!
//! let page = select([Tenant::ID, Tenant::NAME, Tenant::ENABLE])
//!     .from::<Tenant>()
//!     .matching(where_(Tenant::ENABLE).eq(true).and(Tenant::NAME).like(keyword))
//!     .order([desc(Tenant::ID)])
//!     .fetch::<Tenant>()
//!     .page(DataPage::new(2, 10)?)
//!     .await?;
//!
//! update::<Tenant>()
//!     .set(Tenant::NAME, "acme")
//!     .then()
//!     .matching(where_(Tenant::ID).eq(7))
//!     .execute()
//!     .await?;
//! ```

pub mod alias;
mod cache;
pub mod chain;
pub mod config;
pub mod entity;
pub mod error;
pub mod executor;
pub mod ident;
pub mod order;
pub mod page;
pub mod prelude;
pub mod query;
pub mod resolver;
pub mod row;
pub mod segment;
pub mod select;
pub mod update;
pub mod value;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use alias::{AliasContext, TableKey};
pub use chain::state::{
    Assigned, Conditioned, Filtered, Grouped, Handle, Having, Joined, Ordered, Piece, Selected,
    Updating,
};
pub use chain::{Fetch, SqlChain, select, select_all, update, update_table};
pub use config::{FluentConfig, config, configure};
pub use entity::{
    Entity, EntityDescriptor, EntityRegistration, Field, FieldDescriptor, find_entity,
    registered_entities,
};
pub use error::{BoxError, FluentError, FluentResult};
pub use executor::{BoundSql, ResultType, SqlExecutor, bind, bind_shared, current, unbind};
pub use order::{Direction, Order, asc, desc};
pub use page::DataPage;
pub use query::{Column, Condition, ConditionBuilder, Operand, Operator, Query, where_};
pub use resolver::{EntityMeta, metadata, warm_up};
pub use row::{FromRow, FromValue, Row};
pub use segment::{BuildSession, Conjunction, JoinKind, Parameterized};
pub use select::{
    AggregateFn, Aggregation, SelectItem, all, as_alias, avg, count, count_all, max, min, names,
    raw, sum,
};
pub use update::UpdateSet;
pub use value::Value;

#[cfg(feature = "postgres")]
pub use postgres::{PgExecutor, to_postgres_sql};

#[cfg(feature = "derive")]
pub use fluentsql_derive::{Entity, FromRow};

// Re-export inventory for use by derive macros
pub use inventory;
