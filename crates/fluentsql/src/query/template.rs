//! Condition template compiler.
//!
//! Templates are tiny: `{column}` is the target column, `?` is one bound
//! parameter and `{?}` expands to one placeholder per collection element.
//! Each operator's template is parsed once and reused.

use super::condition::Operator;
use crate::error::{FluentError, FluentResult};
use crate::segment::BuildSession;
use crate::value::Value;
use std::collections::HashMap;
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Part {
    Text(&'static str),
    Column,
    Param,
    Params,
}

/// A parsed condition template.
#[derive(Debug, Clone)]
pub(crate) struct Template {
    source: &'static str,
    parts: Vec<Part>,
    fixed: usize,
    variadic: bool,
}

impl Template {
    pub(crate) fn parse(source: &'static str) -> Self {
        let mut parts = Vec::new();
        let mut start = 0;
        let mut i = 0;

        while i < source.len() {
            let rest = &source[i..];
            let (part, width) = if rest.starts_with("{column}") {
                (Part::Column, "{column}".len())
            } else if rest.starts_with("{?}") {
                (Part::Params, "{?}".len())
            } else if rest.starts_with('?') {
                (Part::Param, 1)
            } else {
                i += rest.chars().next().map_or(1, char::len_utf8);
                continue;
            };
            if start < i {
                parts.push(Part::Text(&source[start..i]));
            }
            parts.push(part);
            i += width;
            start = i;
        }
        if start < source.len() {
            parts.push(Part::Text(&source[start..]));
        }

        let fixed = parts.iter().filter(|p| **p == Part::Param).count();
        let variadic = parts.contains(&Part::Params);
        Self {
            source,
            parts,
            fixed,
            variadic,
        }
    }

    /// Render with bound parameters, pushing them into the session in
    /// placeholder order.
    pub(crate) fn apply(
        &self,
        column: &str,
        params: Vec<Value>,
        session: &mut BuildSession,
    ) -> FluentResult<String> {
        let arity_ok = if self.variadic {
            self.fixed == 0 && !params.is_empty()
        } else {
            params.len() == self.fixed
        };
        if !arity_ok {
            return Err(FluentError::validation(format!(
                "template '{}' cannot bind {} parameter(s)",
                self.source,
                params.len()
            )));
        }

        let mut params = params.into_iter();
        let mut out = String::with_capacity(self.source.len() + column.len());
        for part in &self.parts {
            match part {
                Part::Text(text) => out.push_str(text),
                Part::Column => out.push_str(column),
                Part::Param => {
                    out.push('?');
                    if let Some(value) = params.next() {
                        session.push_param(value);
                    }
                }
                Part::Params => {
                    for (i, value) in params.by_ref().enumerate() {
                        if i > 0 {
                            out.push_str(", ");
                        }
                        out.push('?');
                        session.push_param(value);
                    }
                }
            }
        }
        Ok(out)
    }

    /// Render with another column substituted for the single placeholder.
    pub(crate) fn apply_inline(&self, column: &str, other: &str) -> FluentResult<String> {
        if self.variadic || self.fixed != 1 {
            return Err(FluentError::validation(format!(
                "template '{}' cannot compare against a column",
                self.source
            )));
        }
        let mut out = String::with_capacity(self.source.len() + column.len() + other.len());
        for part in &self.parts {
            match part {
                Part::Text(text) => out.push_str(text),
                Part::Column => out.push_str(column),
                Part::Param | Part::Params => out.push_str(other),
            }
        }
        Ok(out)
    }
}

static TEMPLATES: LazyLock<HashMap<Operator, Template>> = LazyLock::new(|| {
    Operator::ALL
        .iter()
        .map(|op| (*op, Template::parse(op.template())))
        .collect()
});

/// Compiled template for an operator.
pub(crate) fn compiled(op: Operator) -> FluentResult<&'static Template> {
    TEMPLATES
        .get(&op)
        .ok_or_else(|| FluentError::validation(format!("no template for operator {op:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_splits_parts() {
        let t = Template::parse("{column} BETWEEN ? AND ?");
        assert_eq!(
            t.parts,
            vec![
                Part::Column,
                Part::Text(" BETWEEN "),
                Part::Param,
                Part::Text(" AND "),
                Part::Param,
            ]
        );
        assert_eq!(t.fixed, 2);
        assert!(!t.variadic);
    }

    #[test]
    fn variadic_expands_to_collection_size() {
        let t = Template::parse("{column} IN ({?})");
        let mut session = BuildSession::new();
        let sql = t
            .apply("`x`", vec![1.into(), 2.into(), 3.into()], &mut session)
            .unwrap();
        assert_eq!(sql, "`x` IN (?, ?, ?)");
        assert_eq!(session.params().len(), 3);
    }

    #[test]
    fn arity_mismatch_is_validation_error() {
        let t = Template::parse("{column} = ?");
        let mut session = BuildSession::new();
        let err = t
            .apply("`x`", vec![1.into(), 2.into()], &mut session)
            .unwrap_err();
        assert!(err.is_validation());
        assert!(session.params().is_empty());
    }

    #[test]
    fn inline_replaces_placeholder() {
        let t = Template::parse("{column} = ?");
        assert_eq!(t.apply_inline("t1.`a`", "t2.`b`").unwrap(), "t1.`a` = t2.`b`");
    }

    #[test]
    fn inline_rejects_variadic() {
        let t = Template::parse("{column} IN ({?})");
        assert!(t.apply_inline("a", "b").unwrap_err().is_validation());
    }

    #[test]
    fn every_operator_compiles() {
        for op in Operator::ALL {
            assert!(compiled(op).is_ok());
        }
    }

    #[test]
    fn like_keeps_literal_text() {
        let t = Template::parse("{column} LIKE CONCAT('%', ?, '%')");
        let mut session = BuildSession::new();
        let sql = t.apply("`name`", vec!["ab".into()], &mut session).unwrap();
        assert_eq!(sql, "`name` LIKE CONCAT('%', ?, '%')");
    }
}
