//! Segment composition.
//!
//! A statement is an ordered list of [`Segment`]s. Each segment renders to an
//! optional piece of SQL text; rendered pieces are joined with a single space
//! and `None` is skipped. Bound parameters are pushed into the
//! [`BuildSession`] while rendering, so placeholder order and parameter order
//! can never diverge.

use crate::alias::AliasContext;
use crate::chain::TableRef;
use crate::error::FluentResult;
use crate::order::Order;
use crate::query::{Column, Condition, Query};
use crate::select::SelectItem;
use crate::update::UpdateSet;
use crate::value::Value;
use std::borrow::Cow;

// ==================== Parameter policy ====================

/// Three-valued parameter policy shared by conditions, queries and SET lists.
///
/// - `None`: empty, the owning clause is omitted entirely.
/// - `Some(vec![])`: present but binds nothing (null checks, column compares).
/// - `Some(values)`: present and binds `values` in order.
pub trait Parameterized {
    fn parameters(&self) -> Option<Vec<Value>>;

    fn is_empty(&self) -> bool {
        self.parameters().is_none()
    }
}

// ==================== Build session ====================

/// How the session renders selection and paging clauses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum RenderMode {
    #[default]
    Full,
    /// `COUNT(1)` selection, no ORDER BY/LIMIT/OFFSET.
    Count,
    /// Full selection, no ORDER BY/LIMIT/OFFSET.
    Unpaged,
}

/// Scope of one top-level render.
///
/// Owns the alias context and the parameter sink. The alias context is
/// flushed exactly once, when the session is dropped, including on the error
/// path.
#[derive(Debug, Default)]
pub struct BuildSession {
    aliases: AliasContext,
    params: Vec<Value>,
    mode: RenderMode,
}

impl BuildSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// A session that renders the select list as `COUNT(1)` and drops
    /// ordering and paging clauses.
    pub(crate) fn counting() -> Self {
        Self::with_mode(RenderMode::Count)
    }

    /// A session that keeps the select list but drops ordering and paging
    /// clauses; the body of a wrapped count.
    pub(crate) fn unpaged() -> Self {
        Self::with_mode(RenderMode::Unpaged)
    }

    fn with_mode(mode: RenderMode) -> Self {
        Self {
            aliases: AliasContext::new(),
            params: Vec::new(),
            mode,
        }
    }

    pub fn aliases(&self) -> &AliasContext {
        &self.aliases
    }

    pub fn aliases_mut(&mut self) -> &mut AliasContext {
        &mut self.aliases
    }

    /// Parameters bound so far, in placeholder order.
    pub fn params(&self) -> &[Value] {
        &self.params
    }

    pub(crate) fn push_param(&mut self, value: Value) {
        self.params.push(value);
    }

    pub(crate) fn take_params(&mut self) -> Vec<Value> {
        std::mem::take(&mut self.params)
    }

    pub(crate) fn is_counting(&self) -> bool {
        self.mode == RenderMode::Count
    }

    fn drops_paging(&self) -> bool {
        self.mode != RenderMode::Full
    }
}

impl Drop for BuildSession {
    fn drop(&mut self) {
        #[cfg(feature = "tracing")]
        tracing::trace!(
            tables = self.aliases.table_count(),
            "flushing alias context"
        );
        self.aliases.flush();
    }
}

// ==================== Segments ====================

/// AND/OR glue between two members.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conjunction {
    And,
    Or,
}

impl Conjunction {
    pub fn as_str(self) -> &'static str {
        match self {
            Conjunction::And => "AND",
            Conjunction::Or => "OR",
        }
    }
}

/// Join keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
}

impl JoinKind {
    pub fn as_str(self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
        }
    }
}

/// Text whose rendering depends on the session.
#[derive(Debug, Clone)]
pub(crate) enum Deferred {
    /// Select list, or `COUNT(1)` in a counting session.
    Selection(Vec<SelectItem>),
    /// Quoted table name followed by its quoted alias.
    Table(TableRef),
    /// Quoted table name only (UPDATE target).
    TableName(TableRef),
    GroupBy(Vec<Column>),
    OrderBy(Vec<Order>),
    Limit(u64),
    Offset(u64),
}

impl Deferred {
    fn render(&self, session: &mut BuildSession) -> FluentResult<Option<String>> {
        match self {
            Deferred::Selection(items) => {
                if session.is_counting() {
                    return Ok(Some("COUNT(1)".to_string()));
                }
                if items.is_empty() {
                    return Ok(Some("*".to_string()));
                }
                let mut parts = Vec::with_capacity(items.len());
                for item in items {
                    item.render_into(session, &mut parts)?;
                }
                Ok(Some(parts.join(", ")))
            }
            Deferred::Table(table) => table.render_declaration(session).map(Some),
            Deferred::TableName(table) => table.render_name().map(Some),
            Deferred::GroupBy(columns) => {
                let mut parts = Vec::with_capacity(columns.len());
                for column in columns {
                    parts.push(column.render(session)?);
                }
                Ok(Some(format!("GROUP BY {}", parts.join(", "))))
            }
            Deferred::OrderBy(orders) => {
                if session.drops_paging() {
                    return Ok(None);
                }
                let mut parts = Vec::with_capacity(orders.len());
                for order in orders {
                    parts.push(order.render(session)?);
                }
                Ok(Some(format!("ORDER BY {}", parts.join(", "))))
            }
            Deferred::Limit(n) if !session.drops_paging() => Ok(Some(format!("LIMIT {n}"))),
            Deferred::Offset(n) if !session.drops_paging() => Ok(Some(format!("OFFSET {n}"))),
            Deferred::Limit(_) | Deferred::Offset(_) => Ok(None),
        }
    }
}

/// One renderable unit of a statement.
#[derive(Debug, Clone)]
pub(crate) enum Segment {
    Static(Cow<'static, str>),
    Lazy(Deferred),
    Join(JoinKind),
    /// AND/OR glue; never kept as the first segment of a list.
    Concat(Conjunction),
    Condition(Condition),
    /// Nested query, parenthesized when `grouped`.
    Query { query: Query, grouped: bool },
    Assignments(UpdateSet),
}

impl Segment {
    pub(crate) fn render(&self, session: &mut BuildSession) -> FluentResult<Option<String>> {
        match self {
            Segment::Static(text) => Ok(Some(text.to_string())),
            Segment::Lazy(deferred) => deferred.render(session),
            Segment::Join(kind) => Ok(Some(kind.as_str().to_string())),
            Segment::Concat(conj) => Ok(Some(conj.as_str().to_string())),
            Segment::Condition(condition) => condition.render(session),
            Segment::Query { query, grouped } => Ok(query
                .render(session)?
                .map(|text| if *grouped { format!("({text})") } else { text })),
            Segment::Assignments(set) => set.render(session),
        }
    }

    pub(crate) fn parameters(&self) -> Option<Vec<Value>> {
        match self {
            Segment::Condition(condition) => condition.parameters(),
            Segment::Query { query, .. } => query.parameters(),
            Segment::Assignments(set) => set.parameters(),
            _ => Some(Vec::new()),
        }
    }
}

/// Ordered segment container.
#[derive(Debug, Clone, Default)]
pub(crate) struct SegmentList {
    segments: Vec<Segment>,
}

impl SegmentList {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Append a segment; a leading AND/OR is dropped.
    pub(crate) fn concat(&mut self, segment: Segment) -> &mut Self {
        if matches!(segment, Segment::Concat(_)) && self.segments.is_empty() {
            return self;
        }
        self.segments.push(segment);
        self
    }

    /// Append literal text.
    pub(crate) fn concat_str(&mut self, text: &'static str) -> &mut Self {
        self.concat(Segment::Static(Cow::Borrowed(text)))
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Drop every LIMIT/OFFSET segment.
    pub(crate) fn strip_paging(&mut self) {
        self.segments.retain(|segment| {
            !matches!(
                segment,
                Segment::Lazy(Deferred::Limit(_) | Deferred::Offset(_))
            )
        });
    }

    pub(crate) fn has_group_by(&self) -> bool {
        self.segments
            .iter()
            .any(|segment| matches!(segment, Segment::Lazy(Deferred::GroupBy(_))))
    }

    pub(crate) fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.segments.iter()
    }

    /// Render every segment and join the non-empty pieces with one space.
    pub(crate) fn render(&self, session: &mut BuildSession) -> FluentResult<String> {
        let mut out = String::new();
        for segment in &self.segments {
            let Some(text) = segment.render(session)? else {
                continue;
            };
            if text.is_empty() {
                continue;
            }
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(&text);
        }
        Ok(out)
    }
}
