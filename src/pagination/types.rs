//! Pagination types
//!
//! Defines the page contract shared by the blocking and async clients.

use crate::error::{Error, Result};
use crate::model::ApiResponse;
use serde::Serialize;
use std::fmt;
use std::num::NonZeroU32;

/// Page size used when the caller does not ask for one
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Largest page size the service accepts unless configured otherwise
pub const MAX_PAGE_SIZE: u32 = 1000;

/// A page size checked against the service maximum
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct PageSize(NonZeroU32);

impl PageSize {
    /// Validate a requested page size
    ///
    /// Sizes outside `1..=max` are rejected, never clamped.
    pub fn new(value: u32, max: u32) -> Result<Self> {
        let size = NonZeroU32::new(value)
            .ok_or_else(|| Error::invalid_argument("page_size", "must be at least 1"))?;
        if value > max {
            return Err(Error::invalid_argument(
                "page_size",
                format!("{value} exceeds the service maximum of {max}"),
            ));
        }
        Ok(Self(size))
    }

    /// The size as a plain integer
    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque continuation token issued by the service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    /// Wrap a token; empty tokens are not cursors
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.is_empty() {
            None
        } else {
            Some(Self(token))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One page of results
///
/// Holds at most `page_size` records. `cursor` is present exactly when the
/// service has more records after this page.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    records: Vec<T>,
    page_size: PageSize,
    cursor: Option<Cursor>,
    total: Option<u64>,
}

impl<T> Page<T> {
    /// Build a page, enforcing the page size bound
    pub fn new(
        records: Vec<T>,
        page_size: PageSize,
        cursor: Option<Cursor>,
        total: Option<u64>,
    ) -> Result<Self> {
        if records.len() > page_size.get() as usize {
            return Err(Error::decode(format!(
                "service returned {} records for page size {page_size}",
                records.len()
            )));
        }
        Ok(Self {
            records,
            page_size,
            cursor,
            total,
        })
    }

    /// Build a page from a search response envelope
    pub fn from_response(response: ApiResponse<Vec<T>>, page_size: PageSize) -> Result<Self> {
        let has_more = response.has_more;
        let total = response.total;
        let raw_cursor = response.cursor.clone();
        let records = response.into_data()?;

        let cursor = if has_more {
            let cursor = raw_cursor
                .and_then(Cursor::new)
                .ok_or_else(|| Error::decode("has_more is set but no cursor was returned"))?;
            Some(cursor)
        } else {
            None
        };

        Self::new(records, page_size, cursor, total)
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn into_records(self) -> Vec<T> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Page size this page was requested with
    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    /// Cursor for the next page, `None` on the last page
    pub fn cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }

    pub fn is_last(&self) -> bool {
        self.cursor.is_none()
    }

    /// Total matching records, when the service reports it
    pub fn total(&self) -> Option<u64> {
        self.total
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

/// Tracks progress through one traversal
#[derive(Debug, Clone, Default)]
pub struct PaginationState {
    /// Pages fetched so far
    pub pages: u32,
    /// Cursor to send with the next request
    pub cursor: Option<Cursor>,
    /// Total records fetched so far
    pub total_fetched: u64,
    /// Is pagination complete?
    pub done: bool,
}

impl PaginationState {
    /// Create a new pagination state
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume a traversal from a known cursor
    pub fn from_cursor(cursor: Cursor) -> Self {
        Self {
            cursor: Some(cursor),
            ..Self::default()
        }
    }

    /// Mark pagination as complete
    pub fn mark_done(&mut self) {
        self.done = true;
    }

    /// Record a fetched page and move to its cursor
    ///
    /// A page handing back the cursor it was requested with would loop
    /// forever, so it is rejected and the traversal ends.
    pub fn advance<T>(&mut self, page: &Page<T>) -> Result<()> {
        self.pages += 1;
        self.total_fetched += page.len() as u64;

        match page.cursor() {
            Some(next) if self.cursor.as_ref() == Some(next) => {
                self.mark_done();
                Err(Error::decode(format!(
                    "service returned cursor '{next}' twice in a row"
                )))
            }
            Some(next) => {
                self.cursor = Some(next.clone());
                Ok(())
            }
            None => {
                self.cursor = None;
                self.mark_done();
                Ok(())
            }
        }
    }
}
