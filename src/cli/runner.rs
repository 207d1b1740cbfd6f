//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat, RecordFilter};
use crate::client::AsyncClient;
use crate::config::ClientConfig;
use crate::error::{Error, Result, ResultExt};
use crate::logging;
use crate::model::{Record, RecordQuery};
use crate::pagination::{Cursor, Page};
use crate::types::{JsonValue, LogLevel};
use futures::TryStreamExt;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tracing::{debug, info};
use uuid::Uuid;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let config = self.load_config()?;
        let level = if self.cli.verbose {
            LogLevel::Debug
        } else {
            config.log_level
        };
        logging::init(level);

        let client = AsyncClient::new(&config)?;
        let result = match &self.cli.command {
            Commands::Records {
                filter,
                page_size,
                cursor,
                all,
                max_records,
            } => {
                let query = build_query(filter);
                let page_size = page_size.unwrap_or(config.default_page_size);
                if *all {
                    self.all_records(&client, &query, page_size, *max_records)
                        .await
                } else {
                    self.records_page(&client, &query, page_size, cursor.as_deref())
                        .await
                }
            }
            Commands::Record {
                dataset,
                external_id,
                partial,
            } => self.record(&client, *dataset, external_id, !partial).await,
            Commands::Dataset { name, id_only } => self.dataset(&client, name, *id_only).await,
            Commands::Create { file } => self.create(&client, file).await,
            Commands::Update { file, id } => self.update(&client, file, *id).await,
            Commands::Token => self.token(&client).await,
        };

        client.close().await;
        result
    }

    /// Load configuration from `--config`, or from the environment
    fn load_config(&self) -> Result<ClientConfig> {
        match &self.cli.config {
            Some(path) => ClientConfig::from_file(path),
            None => ClientConfig::from_env(),
        }
    }

    /// Print one page and the cursor to continue from
    async fn records_page(
        &self,
        client: &AsyncClient,
        query: &RecordQuery,
        page_size: u32,
        cursor: Option<&str>,
    ) -> Result<()> {
        let cursor = cursor.and_then(Cursor::new);
        let page = client.get_records(query, page_size, cursor.as_ref()).await?;
        self.output_page(&page);
        Ok(())
    }

    /// Print every record, page by page
    async fn all_records(
        &self,
        client: &AsyncClient,
        query: &RecordQuery,
        page_size: u32,
        max_records: Option<usize>,
    ) -> Result<()> {
        let mut pages = Box::pin(client.pages(query, page_size)?);
        let mut emitted = 0usize;

        while let Some(page) = pages.try_next().await? {
            let remaining = max_records.map_or(usize::MAX, |max| max - emitted);
            let last = page.is_last();

            for record in page.records().iter().take(remaining) {
                self.output_record(record);
                emitted += 1;
            }

            if last || max_records.is_some_and(|max| emitted >= max) {
                break;
            }
        }

        info!("Fetched {emitted} records");
        Ok(())
    }

    async fn record(
        &self,
        client: &AsyncClient,
        dataset: Uuid,
        external_id: &str,
        exact: bool,
    ) -> Result<()> {
        match client.get_record(dataset, external_id, exact).await? {
            Some(record) => {
                self.output_record(&record);
                Ok(())
            }
            None => Err(Error::not_found(format!("Record '{external_id}'"))),
        }
    }

    async fn dataset(&self, client: &AsyncClient, name: &str, id_only: bool) -> Result<()> {
        let dataset = client.get_dataset_by_name(name).await?;
        if id_only {
            println!("{}", dataset.id);
        } else {
            self.output_message(&json!({
                "type": "DATASET",
                "dataset": dataset,
            }));
        }
        Ok(())
    }

    async fn create(&self, client: &AsyncClient, file: &Path) -> Result<()> {
        let records: Vec<Record> = read_json_file(file)?;
        debug!("Creating {} records from {}", records.len(), file.display());

        let ids = client.create_records(&records).await?;
        self.output_message(&json!({
            "type": "CREATED",
            "ids": ids,
        }));
        Ok(())
    }

    async fn update(&self, client: &AsyncClient, file: &Path, id: Option<Uuid>) -> Result<()> {
        let ids = match id {
            Some(id) => {
                let record: Record = read_json_file(file)?;
                vec![client.update_record(id, &record).await?]
            }
            None => {
                let updates: Vec<JsonValue> = read_json_file(file)?;
                client.batch_update_records(&updates).await?
            }
        };

        self.output_message(&json!({
            "type": "UPDATED",
            "ids": ids,
        }));
        Ok(())
    }

    /// Check credentials
    async fn token(&self, client: &AsyncClient) -> Result<()> {
        let (status, message) = match client.token().await {
            Ok(Some(_)) => ("SUCCEEDED", "Credentials accepted".to_string()),
            Ok(None) => ("SUCCEEDED", "No credentials configured".to_string()),
            Err(e) => ("FAILED", format!("Authentication failed: {e}")),
        };

        self.output_message(&json!({
            "type": "CONNECTION_STATUS",
            "connectionStatus": {
                "status": status,
                "message": message
            }
        }));
        Ok(())
    }

    fn output_page(&self, page: &Page<Record>) {
        for record in page.records() {
            self.output_record(record);
        }
        self.output_message(&page_message(page));
    }

    fn output_record(&self, record: &Record) {
        self.output_message(&json!({
            "type": "RECORD",
            "record": {
                "data": record,
                "emitted_at": chrono::Utc::now().timestamp_millis()
            }
        }));
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        println!("{}", render(msg, self.cli.format));
    }
}

/// Build a search query from command-line filters
fn build_query(filter: &RecordFilter) -> RecordQuery {
    let mut query = RecordQuery::new()
        .external_ids(filter.external_ids.iter().cloned())
        .updated_between(filter.updated_after, filter.updated_before)
        .with_geometry(filter.geom)
        .as_patch(filter.patch);

    if let Some(taxon) = &filter.taxon {
        query = query.taxon(taxon.clone());
    }
    if let Some(dataset) = filter.dataset {
        query = query.dataset(dataset);
    }
    if let Some(kingdom) = &filter.kingdom {
        query = query.kingdom(kingdom.clone());
    }
    query
}

/// Summary emitted after a page's records
fn page_message(page: &Page<Record>) -> Value {
    json!({
        "type": "PAGE",
        "page": {
            "records": page.len(),
            "page_size": page.page_size(),
            "cursor": page.cursor(),
            "total": page.total()
        }
    })
}

fn render(msg: &Value, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => serde_json::to_string(msg).unwrap_or_default(),
        OutputFormat::Pretty => serde_json::to_string_pretty(msg).unwrap_or_default(),
    }
}

fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
}
