//! Single `<column> <operator> <operand>` comparisons.

use super::Column;
use super::template;
use crate::error::FluentResult;
use crate::segment::{BuildSession, Parameterized};
use crate::value::Value;

/// Comparison operators and their SQL templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    /// Contains: `LIKE CONCAT('%', ?, '%')`
    Like,
    /// Starts with: `LIKE CONCAT(?, '%')`
    LikeLeft,
    /// Ends with: `LIKE CONCAT('%', ?)`
    LikeRight,
    In,
    NotIn,
    IsNull,
    NotNull,
    Between,
}

impl Operator {
    pub const ALL: [Operator; 14] = [
        Operator::Eq,
        Operator::Ne,
        Operator::Gt,
        Operator::Gte,
        Operator::Lt,
        Operator::Lte,
        Operator::Like,
        Operator::LikeLeft,
        Operator::LikeRight,
        Operator::In,
        Operator::NotIn,
        Operator::IsNull,
        Operator::NotNull,
        Operator::Between,
    ];

    /// SQL template for this operator.
    pub fn template(self) -> &'static str {
        match self {
            Operator::Eq => "{column} = ?",
            Operator::Ne => "{column} != ?",
            Operator::Gt => "{column} > ?",
            Operator::Gte => "{column} >= ?",
            Operator::Lt => "{column} < ?",
            Operator::Lte => "{column} <= ?",
            Operator::Like => "{column} LIKE CONCAT('%', ?, '%')",
            Operator::LikeLeft => "{column} LIKE CONCAT(?, '%')",
            Operator::LikeRight => "{column} LIKE CONCAT('%', ?)",
            Operator::In => "{column} IN ({?})",
            Operator::NotIn => "{column} NOT IN ({?})",
            Operator::IsNull => "{column} IS NULL",
            Operator::NotNull => "{column} IS NOT NULL",
            Operator::Between => "{column} BETWEEN ? AND ?",
        }
    }
}

/// Right-hand side of a condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Operators without a right-hand side (`IS NULL`).
    Unary,
    /// Nothing to compare against; the condition is empty.
    Absent,
    Value(Value),
    Range(Value, Value),
    List(Vec<Value>),
    /// Column-to-column comparison; inlined, never bound.
    Column(Column),
}

impl From<Value> for Operand {
    fn from(v: Value) -> Self {
        Operand::Value(v)
    }
}

impl From<Column> for Operand {
    fn from(c: Column) -> Self {
        Operand::Column(c)
    }
}

/// A single comparison.
///
/// Absent operands make the condition empty; an empty condition is never
/// rendered and its owning query skips it.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    target: Column,
    operator: Operator,
    operand: Operand,
}

impl Condition {
    pub fn new(target: impl Into<Column>, operator: Operator, operand: impl Into<Operand>) -> Self {
        Self {
            target: target.into(),
            operator,
            operand: operand.into(),
        }
    }

    pub fn target(&self) -> &Column {
        &self.target
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn operand(&self) -> &Operand {
        &self.operand
    }

    pub(crate) fn render(&self, session: &mut BuildSession) -> FluentResult<Option<String>> {
        let Some(params) = self.parameters() else {
            return Ok(None);
        };

        // Empty lists would be `IN ()`; render a constant predicate instead.
        if let Operand::List(values) = &self.operand {
            if values.is_empty() {
                match self.operator {
                    Operator::In => return Ok(Some("1 = 0".to_string())),
                    Operator::NotIn => return Ok(Some("1 = 1".to_string())),
                    _ => {}
                }
            }
        }

        let column = self.target.render(session)?;
        let template = template::compiled(self.operator)?;
        let text = match &self.operand {
            Operand::Column(other) => {
                let other = other.render(session)?;
                template.apply_inline(&column, &other)?
            }
            _ => template.apply(&column, params, session)?,
        };
        Ok(Some(text))
    }
}

impl Parameterized for Condition {
    fn parameters(&self) -> Option<Vec<Value>> {
        match &self.operand {
            Operand::Unary | Operand::Column(_) => Some(Vec::new()),
            Operand::Absent => None,
            Operand::Value(v) if v.is_absent() => None,
            Operand::Value(v) => Some(vec![v.clone()]),
            Operand::Range(lo, hi) if lo.is_absent() || hi.is_absent() => None,
            Operand::Range(lo, hi) => Some(vec![lo.clone(), hi.clone()]),
            Operand::List(values) => Some(values.clone()),
        }
    }
}
