//! CLI commands and argument parsing

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

/// HinatureDB record service CLI
#[derive(Parser, Debug)]
#[command(name = "hinaturedb")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML or JSON); defaults to HINATUREDB_* environment variables
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search records, one page or every page
    Records {
        #[command(flatten)]
        filter: RecordFilter,

        /// Records per page
        #[arg(short, long)]
        page_size: Option<u32>,

        /// Continue from the cursor printed with a previous page
        #[arg(long, conflicts_with = "all")]
        cursor: Option<String>,

        /// Follow cursors until the last page
        #[arg(long)]
        all: bool,

        /// Stop after this many records
        #[arg(long, requires = "all")]
        max_records: Option<usize>,
    },

    /// Look up one record by external id
    Record {
        /// Dataset id
        #[arg(long)]
        dataset: Uuid,

        /// External id of the record
        external_id: String,

        /// Allow partial external id matches
        #[arg(long)]
        partial: bool,
    },

    /// Look up a dataset by name
    Dataset {
        /// Dataset name
        name: String,

        /// Print only the dataset id
        #[arg(long)]
        id_only: bool,
    },

    /// Create records from a JSON file holding an array of records
    Create {
        /// Records file
        file: PathBuf,
    },

    /// Update records from a JSON file
    ///
    /// With --id the file holds one record; otherwise it holds an array of
    /// updates sent as a single batch.
    Update {
        /// Updates file
        file: PathBuf,

        /// Id of the record to replace
        #[arg(long)]
        id: Option<Uuid>,
    },

    /// Check that the configured credentials are accepted
    Token,
}

/// Search filters shared by record commands
#[derive(Args, Debug, Clone, Default)]
pub struct RecordFilter {
    /// Taxon id
    #[arg(long)]
    pub taxon: Option<String>,

    /// Dataset id
    #[arg(long)]
    pub dataset: Option<Uuid>,

    /// External id (repeatable)
    #[arg(long = "external-id")]
    pub external_ids: Vec<String>,

    /// Kingdom name
    #[arg(long)]
    pub kingdom: Option<String>,

    /// Only records updated at or after this unix timestamp
    #[arg(long)]
    pub updated_after: Option<i64>,

    /// Only records updated at or before this unix timestamp
    #[arg(long)]
    pub updated_before: Option<i64>,

    /// Include geometries
    #[arg(long)]
    pub geom: bool,

    /// Return records in patch form
    #[arg(long)]
    pub patch: bool,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}
