//! SET list for UPDATE statements.

use crate::error::FluentResult;
use crate::query::Column;
use crate::segment::{BuildSession, Parameterized};
use crate::value::Value;

#[derive(Debug, Clone)]
enum Source {
    Value(Value),
    Column(Column),
}

#[derive(Debug, Clone)]
struct Assignment {
    target: Column,
    source: Source,
}

/// Ordered `column = ?` / `column = other` assignments.
///
/// Assignments whose value is absent are skipped: "nothing to set", not
/// "set to NULL". Use [`set_null`](Self::set_null) to write an explicit NULL.
#[derive(Debug, Clone, Default)]
pub struct UpdateSet {
    assignments: Vec<Assignment>,
}

impl UpdateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// `target = ?`, skipped when `value` is absent.
    pub fn set(mut self, target: impl Into<Column>, value: impl Into<Value>) -> Self {
        let value = value.into();
        if value.is_absent() {
            return self;
        }
        self.assignments.push(Assignment {
            target: target.into(),
            source: Source::Value(value),
        });
        self
    }

    /// `target = NULL`, bound as a parameter.
    pub fn set_null(mut self, target: impl Into<Column>) -> Self {
        self.assignments.push(Assignment {
            target: target.into(),
            source: Source::Value(Value::Null),
        });
        self
    }

    /// `target = source_column`, nothing bound.
    pub fn set_field(mut self, target: impl Into<Column>, source: impl Into<Column>) -> Self {
        self.assignments.push(Assignment {
            target: target.into(),
            source: Source::Column(source.into()),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub(crate) fn render(&self, session: &mut BuildSession) -> FluentResult<Option<String>> {
        if self.assignments.is_empty() {
            return Ok(None);
        }
        let mut parts = Vec::with_capacity(self.assignments.len());
        for assignment in &self.assignments {
            let target = assignment.target.render(session)?;
            match &assignment.source {
                Source::Value(value) => {
                    session.push_param(value.clone());
                    parts.push(format!("{target} = ?"));
                }
                Source::Column(column) => {
                    let source = column.render(session)?;
                    parts.push(format!("{target} = {source}"));
                }
            }
        }
        Ok(Some(parts.join(", ")))
    }
}

impl Parameterized for UpdateSet {
    fn parameters(&self) -> Option<Vec<Value>> {
        if self.assignments.is_empty() {
            return None;
        }
        Some(
            self.assignments
                .iter()
                .filter_map(|a| match &a.source {
                    Source::Value(v) => Some(v.clone()),
                    Source::Column(_) => None,
                })
                .collect(),
        )
    }
}
