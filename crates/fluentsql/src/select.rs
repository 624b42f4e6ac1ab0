//! Select-list items.

use crate::entity::{Entity, EntityDescriptor, Field};
use crate::error::FluentResult;
use crate::ident::quote;
use crate::query::Column;
use crate::resolver;
use crate::segment::BuildSession;

/// One entry of a select list.
#[derive(Debug, Clone)]
pub enum SelectItem {
    /// `col AS property` (or the registered column alias).
    Field(Field),
    /// Field with an output alias; the alias is registered for the build.
    Aliased(Field, String),
    /// Column reference without `AS`.
    Name(Field),
    /// Every declared field of an entity.
    All(&'static EntityDescriptor),
    Aggregate(Aggregation),
    /// Verbatim SQL.
    Raw(String),
}

impl SelectItem {
    pub(crate) fn render_into(
        &self,
        session: &mut BuildSession,
        out: &mut Vec<String>,
    ) -> FluentResult<()> {
        match self {
            SelectItem::Field(field) | SelectItem::Aliased(field, _) => {
                out.push(resolver::to_select(field, session.aliases())?);
            }
            SelectItem::Name(field) => out.push(resolver::to_name(field, session.aliases())?),
            SelectItem::All(descriptor) => {
                for f in descriptor.fields {
                    let field = Field::new(*descriptor, f.property);
                    out.push(resolver::to_select(&field, session.aliases())?);
                }
            }
            SelectItem::Aggregate(agg) => out.push(agg.render(session)?),
            SelectItem::Raw(sql) => out.push(sql.clone()),
        }
        Ok(())
    }
}

impl From<Field> for SelectItem {
    fn from(f: Field) -> Self {
        SelectItem::Field(f)
    }
}

impl From<Aggregation> for SelectItem {
    fn from(a: Aggregation) -> Self {
        SelectItem::Aggregate(a)
    }
}

/// Select `field` under an explicit output name.
pub fn as_alias(field: Field, alias: impl Into<String>) -> SelectItem {
    SelectItem::Aliased(field, alias.into())
}

/// Select the bare column reference, without `AS`.
pub fn names(field: Field) -> SelectItem {
    SelectItem::Name(field)
}

/// Select every declared field of `E`.
pub fn all<E: Entity>() -> SelectItem {
    SelectItem::All(E::DESCRIPTOR)
}

/// Verbatim select expression.
pub fn raw(sql: impl Into<String>) -> SelectItem {
    SelectItem::Raw(sql.into())
}

// ==================== Aggregations ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFn {
    Count,
    Sum,
    Max,
    Min,
    Avg,
}

impl AggregateFn {
    fn as_str(self) -> &'static str {
        match self {
            AggregateFn::Count => "COUNT",
            AggregateFn::Sum => "SUM",
            AggregateFn::Max => "MAX",
            AggregateFn::Min => "MIN",
            AggregateFn::Avg => "AVG",
        }
    }
}

/// `FUNC(column) [AS alias]`
#[derive(Debug, Clone)]
pub struct Aggregation {
    func: AggregateFn,
    /// `None` aggregates over `1` (`COUNT(1)`).
    target: Option<Column>,
    alias: Option<String>,
}

impl Aggregation {
    pub fn new(func: AggregateFn, target: Option<Column>) -> Self {
        Self {
            func,
            target,
            alias: None,
        }
    }

    /// Output name for the aggregate.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    fn render(&self, session: &BuildSession) -> FluentResult<String> {
        let arg = match &self.target {
            Some(column) => column.render(session)?,
            None => "1".to_string(),
        };
        let mut sql = format!("{}({})", self.func.as_str(), arg);
        if let Some(alias) = &self.alias {
            sql.push_str(" AS ");
            sql.push_str(&quote(alias));
        }
        Ok(sql)
    }
}

/// `COUNT(column)`
pub fn count(target: impl Into<Column>) -> Aggregation {
    Aggregation::new(AggregateFn::Count, Some(target.into()))
}

/// `COUNT(1)`
pub fn count_all() -> Aggregation {
    Aggregation::new(AggregateFn::Count, None)
}

/// `SUM(column)`
pub fn sum(target: impl Into<Column>) -> Aggregation {
    Aggregation::new(AggregateFn::Sum, Some(target.into()))
}

/// `MAX(column)`
pub fn max(target: impl Into<Column>) -> Aggregation {
    Aggregation::new(AggregateFn::Max, Some(target.into()))
}

/// `MIN(column)`
pub fn min(target: impl Into<Column>) -> Aggregation {
    Aggregation::new(AggregateFn::Min, Some(target.into()))
}

/// `AVG(column)`
pub fn avg(target: impl Into<Column>) -> Aggregation {
    Aggregation::new(AggregateFn::Avg, Some(target.into()))
}
