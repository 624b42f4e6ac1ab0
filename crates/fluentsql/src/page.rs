//! Page request/response.

use crate::error::{FluentError, FluentResult};
use serde::{Deserialize, Serialize};

/// A page request that is filled in with results.
///
/// `page` is 1-based. The request half (`page`, `size`) is set by the caller;
/// `total` and `list` are filled in by [`Fetch::page`](crate::Fetch::page).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPage<T> {
    pub page: u64,
    pub size: u64,
    pub total: u64,
    pub list: Vec<T>,
}

impl<T> Default for DataPage<T> {
    fn default() -> Self {
        Self {
            page: 1,
            size: 10,
            total: 0,
            list: Vec::new(),
        }
    }
}

impl<T> DataPage<T> {
    /// A request for `page` (1-based) of `size` rows.
    pub fn new(page: u64, size: u64) -> FluentResult<Self> {
        let request = Self {
            page,
            size,
            ..Self::default()
        };
        request.validate()?;
        Ok(request)
    }

    pub(crate) fn validate(&self) -> FluentResult<()> {
        if self.page == 0 {
            return Err(FluentError::validation("page numbers start at 1"));
        }
        if self.size == 0 {
            return Err(FluentError::validation("page size must be positive"));
        }
        Ok(())
    }

    /// Rows skipped before this page: `(page - 1) * size`.
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.size)
    }

    /// Number of pages needed for `total` rows.
    pub fn pages(&self) -> u64 {
        if self.size == 0 {
            return 0;
        }
        self.total.div_ceil(self.size)
    }

    pub fn has_next(&self) -> bool {
        self.page < self.pages()
    }

    /// Convert the rows, keeping the paging metadata.
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> DataPage<U> {
        DataPage {
            page: self.page,
            size: self.size,
            total: self.total,
            list: self.list.into_iter().map(f).collect(),
        }
    }
}
