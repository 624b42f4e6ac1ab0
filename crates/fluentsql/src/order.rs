//! ORDER BY items.

use crate::error::FluentResult;
use crate::query::Column;
use crate::segment::BuildSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// One ordering term.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    target: Column,
    direction: Direction,
}

impl Order {
    pub fn new(target: impl Into<Column>, direction: Direction) -> Self {
        Self {
            target: target.into(),
            direction,
        }
    }

    pub(crate) fn render(&self, session: &BuildSession) -> FluentResult<String> {
        let column = self.target.render(session)?;
        Ok(match self.direction {
            Direction::Asc => format!("{column} ASC"),
            Direction::Desc => format!("{column} DESC"),
        })
    }
}

/// Ascending order on `target`.
pub fn asc(target: impl Into<Column>) -> Order {
    Order::new(target, Direction::Asc)
}

/// Descending order on `target`.
pub fn desc(target: impl Into<Column>) -> Order {
    Order::new(target, Direction::Desc)
}
