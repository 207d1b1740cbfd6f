//! CLI module
//!
//! Command-line interface for the record service.
//!
//! # Commands
//!
//! - `records` - Search records, one page or all pages
//! - `record` - Look up one record by external id
//! - `dataset` - Look up a dataset by name
//! - `create` - Create records from a JSON file
//! - `update` - Update records from a JSON file
//! - `token` - Check credentials

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat, RecordFilter};
pub use runner::Runner;
