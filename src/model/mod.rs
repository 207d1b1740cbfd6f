//! Data model for the record service
//!
//! Records stay schema-open (a JSON object) because their attribute set is
//! owned by the service. Everything the client itself interprets, such as
//! the response envelope, query fields and datasets, is a typed struct so
//! malformed responses fail with a decode error instead of being accepted.

mod envelope;
mod query;
mod record;

pub use envelope::ApiResponse;
pub use query::{Location, RecordQuery};
pub use record::{Dataset, Record};

pub(crate) use query::SearchRequest;

#[cfg(test)]
mod tests;
