// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # HinatureDB Client
//!
//! Blocking and async clients for the HinatureDB record service.
//!
//! ## Features
//!
//! - **Cursor Pagination**: Fetch one page at a time, or walk every page lazily
//! - **Blocking and Async**: Identical requests and results from both clients
//! - **Password Grant Auth**: Tokens fetched once and refreshed before expiry
//! - **Retries**: Transient failures retried with exponential backoff
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use hinaturedb_client::{AsyncClient, ClientConfig, RecordQuery, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = ClientConfig::new("https://db.example.org").with_password("alice", "secret");
//!     let client = AsyncClient::new(&config)?;
//!
//!     let query = RecordQuery::new().taxon("12345");
//!     let mut page = client.get_records(&query, 100, None).await?;
//!     loop {
//!         for record in page.records() {
//!             println!("{:?}", record.external_id());
//!         }
//!         let Some(cursor) = page.cursor().cloned() else { break };
//!         page = client.get_records(&query, 100, Some(&cursor)).await?;
//!     }
//!
//!     client.close().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │          BlockingClient  ──drives──▶  AsyncClient             │
//! │  get_records(query, page_size, cursor) → Page<Record>         │
//! └───────────────────────────────────────────────────────────────┘
//!                                │
//! ┌────────────┬─────────────────┴──────┬─────────────────────────┐
//! │   Session  │      Pagination        │        Model            │
//! ├────────────┼────────────────────────┼─────────────────────────┤
//! │ HttpClient │ PageSize (validated)   │ RecordQuery             │
//! │ Retry      │ Cursor (opaque)        │ ApiResponse envelope    │
//! │ Auth token │ page_stream / iterator │ Record, Dataset         │
//! └────────────┴────────────────────────┴─────────────────────────┘
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the client
pub mod error;

/// Common types and type aliases
pub mod types;

/// Authentication
pub mod auth;

/// HTTP client with retry and rate limiting
pub mod http;

/// Records, queries and the response envelope
pub mod model;

/// Page types and cursor traversal
pub mod pagination;

/// Blocking and async clients
pub mod client;

/// Client configuration
pub mod config;

/// Tracing subscriber setup
pub mod logging;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use client::{AsyncClient, BlockingClient, BlockingPages, Session};
pub use config::ClientConfig;
pub use model::{Dataset, Location, Record, RecordQuery};
pub use pagination::{Cursor, Page, PageSize, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
