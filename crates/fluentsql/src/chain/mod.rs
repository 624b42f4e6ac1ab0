//! Fluent statement chain.
//!
//! Each chained call appends segments to a [`StatementBuilder`] and moves
//! the chain to a narrower state, so out-of-order calls do not compile:
//!
//! ```ignore
//! use fluentsql::prelude::*;
//!
//! let tenants = select([Tenant::ID, Tenant::NAME])
//!     .from::<Tenant>()
//!     .matching(where_(Tenant::ENABLE).eq(true).and(Tenant::NAME).like(keyword))
//!     .order([desc(Tenant::ID)])
//!     .fetch::<Tenant>()
//!     .all()
//!     .await?;
//! ```
//!
//! Rendering never mutates the chain. Every [`build`](SqlChain::build) opens
//! a fresh [`BuildSession`](crate::BuildSession), replays the alias
//! registrations recorded by the chain, renders, and flushes.

mod builder;
mod fetch;
pub mod state;


pub(crate) use builder::TableRef;
pub use fetch::Fetch;

use crate::entity::Entity;
use crate::error::FluentResult;
use crate::executor::{self, BoundSql, SqlExecutor};
use crate::order::Order;
use crate::query::{Column, Query};
use crate::row::FromRow;
use crate::segment::{Deferred, JoinKind, Segment};
use crate::select::SelectItem;
use crate::update::UpdateSet;
use crate::value::Value;
use builder::StatementBuilder;
use state::*;
use std::marker::PhantomData;

/// A statement under construction, in state `S`.
#[must_use = "a chain does nothing until it is built or executed"]
#[derive(Debug, Clone)]
pub struct SqlChain<S> {
    builder: StatementBuilder,
    _state: PhantomData<S>,
}

impl<S> SqlChain<S> {
    fn with(builder: StatementBuilder) -> Self {
        Self {
            builder,
            _state: PhantomData,
        }
    }

    fn into_state<N>(self) -> SqlChain<N> {
        SqlChain::with(self.builder)
    }
}

// ==================== Entry points ====================

/// Start a SELECT with the given select list.
///
/// An empty list renders `*`.
pub fn select<I>(items: I) -> SqlChain<Selected>
where
    I: IntoIterator,
    I::Item: Into<SelectItem>,
{
    let mut builder = StatementBuilder::new();
    builder.concat_str("SELECT");
    builder.add_selection(items.into_iter().map(Into::into));
    SqlChain::with(builder)
}

/// `SELECT *`
pub fn select_all() -> SqlChain<Selected> {
    select(std::iter::empty::<SelectItem>())
}

/// Start an UPDATE of `E`'s table.
pub fn update<E: Entity>() -> SqlChain<Updating> {
    SqlChain::updating(TableRef::entity(E::DESCRIPTOR, None))
}

/// Start an UPDATE of a table given by name.
pub fn update_table(table: &str) -> SqlChain<Updating> {
    SqlChain::updating(TableRef::named(table, None))
}

// ==================== SELECT ====================

impl SqlChain<Selected> {
    /// `FROM` the table of `E`, with a generated alias.
    pub fn from<E: Entity>(self) -> SqlChain<Handle> {
        self.from_ref(TableRef::entity(E::DESCRIPTOR, None))
    }

    /// `FROM` the table of `E` under an explicit alias.
    pub fn from_as<E: Entity>(self, alias: &str) -> SqlChain<Handle> {
        self.from_ref(TableRef::entity(E::DESCRIPTOR, Some(alias)))
    }

    /// `FROM` a table given by name. Rows are untyped until
    /// [`fetch`](SqlChain::fetch) names a type.
    pub fn from_table(self, table: &str) -> SqlChain<Handle> {
        self.from_ref(TableRef::named(table, None))
    }

    pub fn from_table_as(self, table: &str, alias: &str) -> SqlChain<Handle> {
        self.from_ref(TableRef::named(table, Some(alias)))
    }

    fn from_ref(mut self, table: TableRef) -> SqlChain<Handle> {
        self.builder.from(table);
        self.into_state()
    }
}

impl SqlChain<Handle> {
    fn join_ref(mut self, kind: JoinKind, table: TableRef) -> SqlChain<Joined> {
        self.builder.join(kind, table);
        self.into_state()
    }

    /// `INNER JOIN` the table of `E`.
    pub fn join<E: Entity>(self) -> SqlChain<Joined> {
        self.join_ref(JoinKind::Inner, TableRef::entity(E::DESCRIPTOR, None))
    }

    pub fn join_as<E: Entity>(self, alias: &str) -> SqlChain<Joined> {
        self.join_ref(JoinKind::Inner, TableRef::entity(E::DESCRIPTOR, Some(alias)))
    }

    pub fn join_table(self, table: &str, alias: Option<&str>) -> SqlChain<Joined> {
        self.join_ref(JoinKind::Inner, TableRef::named(table, alias))
    }

    /// `LEFT JOIN` the table of `E`.
    pub fn left_join<E: Entity>(self) -> SqlChain<Joined> {
        self.join_ref(JoinKind::Left, TableRef::entity(E::DESCRIPTOR, None))
    }

    pub fn left_join_as<E: Entity>(self, alias: &str) -> SqlChain<Joined> {
        self.join_ref(JoinKind::Left, TableRef::entity(E::DESCRIPTOR, Some(alias)))
    }

    pub fn left_join_table(self, table: &str, alias: Option<&str>) -> SqlChain<Joined> {
        self.join_ref(JoinKind::Left, TableRef::named(table, alias))
    }

    /// `RIGHT JOIN` the table of `E`.
    pub fn right_join<E: Entity>(self) -> SqlChain<Joined> {
        self.join_ref(JoinKind::Right, TableRef::entity(E::DESCRIPTOR, None))
    }

    pub fn right_join_as<E: Entity>(self, alias: &str) -> SqlChain<Joined> {
        self.join_ref(JoinKind::Right, TableRef::entity(E::DESCRIPTOR, Some(alias)))
    }

    pub fn right_join_table(self, table: &str, alias: Option<&str>) -> SqlChain<Joined> {
        self.join_ref(JoinKind::Right, TableRef::named(table, alias))
    }

    /// `WHERE <query>`; the keyword is omitted when the query is empty.
    pub fn matching(mut self, query: Query) -> SqlChain<Filtered> {
        self.builder.clause("WHERE", query);
        self.into_state()
    }
}

impl SqlChain<Joined> {
    /// `ON <query>`; omitted when the query is empty.
    pub fn on(mut self, query: Query) -> SqlChain<Handle> {
        self.builder.clause("ON", query);
        self.into_state()
    }

    /// Continue without a join condition.
    pub fn then(self) -> SqlChain<Handle> {
        self.into_state()
    }
}

impl<S: Groupable> SqlChain<S> {
    /// `GROUP BY col, ...`; an empty list emits nothing.
    pub fn group_by<I>(mut self, columns: I) -> SqlChain<Grouped>
    where
        I: IntoIterator,
        I::Item: Into<Column>,
    {
        let columns: Vec<Column> = columns.into_iter().map(Into::into).collect();
        if !columns.is_empty() {
            self.builder
                .concat(Segment::Lazy(Deferred::GroupBy(columns)));
        }
        self.into_state()
    }
}

impl SqlChain<Grouped> {
    /// `HAVING <query>`; omitted when the query is empty.
    pub fn having(mut self, query: Query) -> SqlChain<Having> {
        self.builder.clause("HAVING", query);
        self.into_state()
    }
}

impl<S: Orderable> SqlChain<S> {
    /// `ORDER BY a ASC, b DESC`; an empty list emits nothing.
    pub fn order<I>(mut self, orders: I) -> SqlChain<Ordered>
    where
        I: IntoIterator<Item = Order>,
    {
        let orders: Vec<Order> = orders.into_iter().collect();
        if !orders.is_empty() {
            self.builder
                .concat(Segment::Lazy(Deferred::OrderBy(orders)));
        }
        self.into_state()
    }
}

impl<S: Limitable> SqlChain<S> {
    /// `LIMIT n`. A negative count fails when the statement is built.
    pub fn limit(mut self, n: i64) -> SqlChain<Piece> {
        self.builder.limit(n);
        self.into_state()
    }

    /// `OFFSET n`. A negative offset fails when the statement is built.
    pub fn offset(mut self, n: i64) -> SqlChain<Piece> {
        self.builder.offset(n);
        self.into_state()
    }
}

impl<S: Fetchable> SqlChain<S> {
    /// Map result rows into `T`.
    pub fn fetch<T: FromRow>(self) -> Fetch<T> {
        Fetch::new(self.builder)
    }
}

// ==================== UPDATE ====================

impl SqlChain<Updating> {
    fn updating(table: TableRef) -> Self {
        let mut builder = StatementBuilder::new();
        builder.begin_update(table);
        Self::with(builder)
    }

    fn map_set(mut self, f: impl FnOnce(UpdateSet) -> UpdateSet) -> Self {
        self.builder.map_assignments(f);
        self
    }

    /// `col = ?`; skipped when the value is absent.
    pub fn set(self, target: impl Into<Column>, value: impl Into<Value>) -> Self {
        let value = value.into();
        let target = target.into();
        self.map_set(|set| set.set(target, value))
    }

    /// `col = NULL`
    pub fn set_null(self, target: impl Into<Column>) -> Self {
        let target = target.into();
        self.map_set(|set| set.set_null(target))
    }

    /// `col = other_col`, no parameter bound.
    pub fn set_field(self, target: impl Into<Column>, source: impl Into<Column>) -> Self {
        let (target, source) = (target.into(), source.into());
        self.map_set(|set| set.set_field(target, source))
    }

    /// Finish the SET list.
    pub fn then(mut self) -> SqlChain<Assigned> {
        self.builder.finish_update();
        self.into_state()
    }
}

impl SqlChain<Assigned> {
    /// `WHERE <query>`; the keyword is omitted when the query is empty.
    pub fn matching(mut self, query: Query) -> SqlChain<Conditioned> {
        self.builder.clause("WHERE", query);
        self.into_state()
    }
}

// ==================== Rendering and execution ====================

impl<S: Executable> SqlChain<S> {
    /// Render SQL text, parameters and result type.
    pub fn build(&self) -> FluentResult<BoundSql> {
        self.builder.build()
    }

    /// Render SQL text only.
    pub fn to_sql(&self) -> FluentResult<String> {
        self.build().map(|bound| bound.into_parts().0)
    }

    /// Run on the bound executor and return the affected row count.
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
