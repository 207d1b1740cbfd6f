//! Pagination module
//!
//! # Overview
//!
//! The service pages search results with an opaque cursor. A request carries
//! a page size and, after the first page, the cursor from the previous
//! response. The last page carries no cursor.
//!
//! [`page_stream`] turns any [`PageSource`] into a lazy stream of pages; the
//! blocking client drives the same [`PaginationState`] from an iterator.

mod traversal;
mod types;

pub use traversal::{collect_records, page_stream, PageSource};
pub use types::{Cursor, Page, PageSize, PaginationState, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
