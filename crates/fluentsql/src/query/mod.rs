//! Condition/query expression tree.
//!
//! A [`Query`] is an AND/OR chain of [`Condition`]s and nested queries.
//! Conditions are created through [`ConditionBuilder`], which is consumed by
//! exactly one operator call and hands the query back:
//!
//! ```ignore
//! use fluentsql::where_;
//!
//! let q = where_(Tenant::ENABLE).eq(true)
//!     .and(Tenant::NAME).like(keyword)     // skipped when `keyword` is empty
//!     .or("o.order_type").in_([1, 2, 3]);
//! ```

mod condition;
mod template;

#[cfg(test)]
mod tests;

pub use condition::{Condition, Operand, Operator};

use crate::entity::Field;
use crate::error::FluentResult;
use crate::resolver;
use crate::segment::{BuildSession, Conjunction, Parameterized, Segment, SegmentList};
use crate::value::Value;

/// Target of a condition, ordering or grouping: a typed field or a raw
/// column string.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Field(Field),
    /// `column`, `table.column` or `alias.column`.
    Raw(String),
}

impl Column {
    /// Render the column, alias-qualified where possible.
    pub(crate) fn render(&self, session: &BuildSession) -> FluentResult<String> {
        match self {
            Column::Field(field) => resolver::to_name(field, session.aliases()),
            Column::Raw(raw) => Ok(session.aliases().qualify_column(raw)),
        }
    }
}

impl From<Field> for Column {
    fn from(f: Field) -> Self {
        Column::Field(f)
    }
}

impl From<&str> for Column {
    fn from(s: &str) -> Self {
        Column::Raw(s.to_string())
    }
}

impl From<String> for Column {
    fn from(s: String) -> Self {
        Column::Raw(s)
    }
}

/// Start a query with its first condition.
pub fn where_(target: impl Into<Column>) -> ConditionBuilder {
    Query::new().and(target)
}

/// An AND/OR chain of conditions and sub-queries.
///
/// Empty members are never appended, so AND/OR only ever appear between two
/// rendered members.
#[derive(Debug, Clone, Default)]
pub struct Query {
    members: SegmentList,
    len: usize,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of non-empty members.
    pub fn len(&self) -> usize {
        self.len
    }

    /// `true` when nothing was ever appended (or everything appended was empty).
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    // ==================== Conditions ====================

    /// AND a new condition on `target`.
    pub fn and(self, target: impl Into<Column>) -> ConditionBuilder {
        ConditionBuilder::new(self, Conjunction::And, target.into())
    }

    /// OR a new condition on `target`.
    pub fn or(self, target: impl Into<Column>) -> ConditionBuilder {
        ConditionBuilder::new(self, Conjunction::Or, target.into())
    }

    /// AND a completed condition. Empty conditions are ignored.
    pub fn and_condition(self, condition: Condition) -> Self {
        self.push_condition(Conjunction::And, condition)
    }

    /// OR a completed condition. Empty conditions are ignored.
    pub fn or_condition(self, condition: Condition) -> Self {
        self.push_condition(Conjunction::Or, condition)
    }

    // ==================== Sub-queries ====================

    /// AND a nested query. Empty queries are ignored.
    pub fn and_query(self, query: Query) -> Self {
        self.push_query(Conjunction::And, query)
    }

    /// OR a nested query. Empty queries are ignored.
    pub fn or_query(self, query: Query) -> Self {
        self.push_query(Conjunction::Or, query)
    }

    fn push_condition(self, conj: Conjunction, condition: Condition) -> Self {
        if condition.is_empty() {
            return self;
        }
        self.push(conj, Segment::Condition(condition))
    }

    fn push_query(self, conj: Conjunction, query: Query) -> Self {
        if query.is_empty() {
            return self;
        }
        let grouped = query.len > 1;
        self.push(conj, Segment::Query { query, grouped })
    }

    fn push(mut self, conj: Conjunction, member: Segment) -> Self {
        self.members.concat(Segment::Concat(conj)).concat(member);
        self.len += 1;
        self
    }

    /// Render the chain, or `None` when the query has no members.
    pub fn render(&self, session: &mut BuildSession) -> FluentResult<Option<String>> {
        if self.members.is_empty() {
            return Ok(None);
        }
        self.members.render(session).map(Some)
    }
}

impl Parameterized for Query {
    fn parameters(&self) -> Option<Vec<Value>> {
        if self.len == 0 {
            return None;
        }
        let mut params = Vec::new();
        for member in self.members.iter() {
            if let Some(values) = member.parameters() {
                params.extend(values);
            }
        }
        Some(params)
    }
}

/// A condition waiting for its operator.
///
/// Every operator method consumes the builder and returns the owning query.
#[must_use = "a condition is only added once an operator is applied"]
#[derive(Debug)]
pub struct ConditionBuilder {
    query: Query,
    conj: Conjunction,
    target: Column,
}

impl ConditionBuilder {
    fn new(query: Query, conj: Conjunction, target: Column) -> Self {
        Self {
            query,
            conj,
            target,
        }
    }

    fn finish(self, operator: Operator, operand: Operand) -> Query {
        let condition = Condition::new(self.target, operator, operand);
        self.query.push_condition(self.conj, condition)
    }

    fn list<I, V>(values: I) -> Operand
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Operand::List(values.into_iter().map(Into::into).collect())
    }

    /// `column = ?`
    pub fn eq(self, value: impl Into<Value>) -> Query {
        self.finish(Operator::Eq, Operand::Value(value.into()))
    }

    /// `column = other_column`, no parameter bound.
    pub fn eq_field(self, other: impl Into<Column>) -> Query {
        self.finish(Operator::Eq, Operand::Column(other.into()))
    }

    /// `column != ?`
    pub fn ne(self, value: impl Into<Value>) -> Query {
        self.finish(Operator::Ne, Operand::Value(value.into()))
    }

    /// `column > ?`
    pub fn gt(self, value: impl Into<Value>) -> Query {
        self.finish(Operator::Gt, Operand::Value(value.into()))
    }

    /// `column >= ?`
    pub fn gte(self, value: impl Into<Value>) -> Query {
        self.finish(Operator::Gte, Operand::Value(value.into()))
    }

    /// `column < ?`
    pub fn lt(self, value: impl Into<Value>) -> Query {
        self.finish(Operator::Lt, Operand::Value(value.into()))
    }

    /// `column <= ?`
    pub fn lte(self, value: impl Into<Value>) -> Query {
        self.finish(Operator::Lte, Operand::Value(value.into()))
    }

    /// Contains `value`.
    pub fn like(self, value: impl Into<Value>) -> Query {
        self.finish(Operator::Like, Operand::Value(value.into()))
    }

    /// Starts with `value`.
    pub fn like_left(self, value: impl Into<Value>) -> Query {
        self.finish(Operator::LikeLeft, Operand::Value(value.into()))
    }

    /// Ends with `value`.
    pub fn like_right(self, value: impl Into<Value>) -> Query {
        self.finish(Operator::LikeRight, Operand::Value(value.into()))
    }

    /// `column IN (?, ...)`; an empty collection renders `1 = 0`.
    pub fn in_<I, V>(self, values: I) -> Query
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.finish(Operator::In, Self::list(values))
    }

    /// Like [`in_`](Self::in_), but `None` leaves the condition out.
    pub fn in_opt<I, V>(self, values: Option<I>) -> Query
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let operand = values.map_or(Operand::Absent, Self::list);
        self.finish(Operator::In, operand)
    }

    /// `column NOT IN (?, ...)`; an empty collection renders `1 = 1`.
    pub fn not_in<I, V>(self, values: I) -> Query
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.finish(Operator::NotIn, Self::list(values))
    }

    /// Like [`not_in`](Self::not_in), but `None` leaves the condition out.
    pub fn not_in_opt<I, V>(self, values: Option<I>) -> Query
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let operand = values.map_or(Operand::Absent, Self::list);
        self.finish(Operator::NotIn, operand)
    }

    /// `column BETWEEN ? AND ?`; left out if either bound is absent.
    pub fn between(self, low: impl Into<Value>, high: impl Into<Value>) -> Query {
        self.finish(Operator::Between, Operand::Range(low.into(), high.into()))
    }

    /// `column IS NULL`
    pub fn is_null(self) -> Query {
        self.finish(Operator::IsNull, Operand::Unary)
    }

    /// `column IS NOT NULL`
    pub fn not_null(self) -> Query {
        self.finish(Operator::NotNull, Operand::Unary)
    }
}
