//! Record service clients
//!
//! - [`AsyncClient`]: `async` API, cheap to clone, clones share one [`Session`]
//! - [`BlockingClient`]: same operations, blocking the calling thread
//!
//! Both send identical requests and decode responses the same way; the
//! blocking client drives an [`AsyncClient`] on a private runtime.

mod async_client;
mod blocking;
mod session;

pub use async_client::AsyncClient;
pub use blocking::{BlockingClient, BlockingPages};
pub use session::Session;

/// Service endpoint paths, relative to the server root
pub mod endpoints {
    pub const TOKEN: &str = "/api/v1/token";
    pub const RECORDS_SEARCH: &str = "/api/v1/records/search";
    pub const RECORD: &str = "/api/v1/record";
    pub const RECORD_BATCH: &str = "/api/v1/record_batch";
    pub const RECORDS_BATCH_UPDATE: &str = "/api/v1/records/batch";
    pub const DATASETS: &str = "/api/v1/datasets";
}
