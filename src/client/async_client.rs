//! Async record client

use super::endpoints;
use super::session::Session;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::http::RequestConfig;
use crate::model::{ApiResponse, Dataset, Record, RecordQuery, SearchRequest};
use crate::pagination::{collect_records, page_stream, Cursor, Page, PageSize, PageSource};
use crate::types::JsonValue;
use async_trait::async_trait;
use futures::Stream;
use reqwest::Method;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error};
use uuid::Uuid;

/// Service message for a lookup that matched nothing
const RECORD_NOT_FOUND: &str = "Record not found";

/// Async client for the record service
///
/// Clones share the same [`Session`], so they can be handed to concurrent
/// tasks. Dropping a pending call cancels it without affecting other calls.
#[derive(Debug, Clone)]
pub struct AsyncClient {
    session: Arc<Session>,
}

impl AsyncClient {
    /// Open a session and wrap it in a client
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Ok(Self::from_session(Session::new(config)?))
    }

    pub fn from_session(session: Session) -> Self {
        Self {
            session: Arc::new(session),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Fetch one page of records matching `query`
    ///
    /// `page_size` is checked before anything is sent. Pass the cursor of the
    /// previous page to continue a traversal; the returned page carries no
    /// cursor once the result set is exhausted.
    pub async fn get_records(
        &self,
        query: &RecordQuery,
        page_size: u32,
        cursor: Option<&Cursor>,
    ) -> Result<Page<Record>> {
        let page_size = self.session.page_size(page_size)?;
        self.search(query, page_size, cursor).await
    }

    /// Lazily fetch every page of `query`
    pub fn pages<'a>(
        &'a self,
        query: &'a RecordQuery,
        page_size: u32,
    ) -> Result<impl Stream<Item = Result<Page<Record>>> + Send + 'a> {
        let page_size = self.session.page_size(page_size)?;
        Ok(page_stream(self, query, page_size))
    }

    /// Fetch every record matching `query`
    ///
    /// Lookups by external id use one page per id list; other queries use
    /// the session's default page size.
    pub async fn get_all_records(&self, query: &RecordQuery) -> Result<Vec<Record>> {
        let size = query.suggested_page_size(
            self.session.default_page_size().get(),
            self.session.max_page_size(),
        );
        collect_records(self, query, self.session.page_size(size)?).await
    }

    /// Look up one record by its external id within a dataset
    ///
    /// Returns `None` when the service reports no such record.
    pub async fn get_record(
        &self,
        dataset_id: Uuid,
        external_id: &str,
        exact: bool,
    ) -> Result<Option<Record>> {
        let url = self.session.endpoint(endpoints::RECORD)?;
        let request = RequestConfig::new()
            .query("dataset_id", dataset_id.to_string())
            .query("external_id", external_id)
            .query("exact", exact.to_string())
            .no_store();

        let response: ApiResponse<Record> = self
            .session
            .http()
            .request_json(Method::GET, &url, request)
            .await?;

        if !response.success && response.message() == RECORD_NOT_FOUND {
            debug!("No record '{external_id}' in dataset {dataset_id}");
            return Ok(None);
        }
        response.into_data().map(Some)
    }

    /// Create records, returning their new ids in order
    pub async fn create_records(&self, records: &[Record]) -> Result<Vec<Uuid>> {
        let url = self.session.endpoint(endpoints::RECORD_BATCH)?;
        let request = RequestConfig::new().json(serde_json::to_value(records)?);

        let response: ApiResponse<Vec<Uuid>> = self
            .session
            .http()
            .request_json(Method::POST, &url, request)
            .await?;

        let ids = response.into_data()?;
        debug!("Created {} records", ids.len());
        Ok(ids)
    }

    /// Apply a batch of record updates, returning the ids that were updated
    pub async fn batch_update_records(&self, updates: &[JsonValue]) -> Result<Vec<Uuid>> {
        let url = self.session.endpoint(endpoints::RECORDS_BATCH_UPDATE)?;
        let request = RequestConfig::new().json(json!({ "updates": updates }));

        let response: ApiResponse<Vec<Uuid>> = match self
            .session
            .http()
            .request_json(Method::PUT, &url, request)
            .await
        {
            Ok(response) => response,
            Err(Error::HttpStatus { status, body }) => {
                error!("HTTP error {status} for {url}: {body}");
                return Err(Error::HttpStatus { status, body });
            }
            Err(e) => return Err(e),
        };

        response.into_data()
    }

    /// Replace a single record
    pub async fn update_record(&self, record_id: Uuid, record: &Record) -> Result<Uuid> {
        let url = self
            .session
            .endpoint(&format!("{}/{record_id}", endpoints::RECORD))?;
        let request = RequestConfig::new().json(serde_json::to_value(record)?);

        let response: ApiResponse<Uuid> = self
            .session
            .http()
            .request_json(Method::PUT, &url, request)
            .await?;

        response.into_data()
    }

    /// Find a dataset by its exact name
    pub async fn get_dataset_by_name(&self, name: &str) -> Result<Dataset> {
        let url = self.session.endpoint(endpoints::DATASETS)?;
        let request = RequestConfig::new()
            .query("page", "0")
            .query("page_size", "1")
            .query("name", name);

        let response: ApiResponse<Vec<Dataset>> = self
            .session
            .http()
            .request_json(Method::GET, &url, request)
            .await?;

        response
            .into_data()?
            .into_iter()
            .next()
            .ok_or_else(|| Error::not_found(format!("Dataset '{name}'")))
    }

    /// Id of the dataset called `name`
    pub async fn get_dataset_id(&self, name: &str) -> Result<Uuid> {
        self.get_dataset_by_name(name).await.map(|dataset| dataset.id)
    }

    /// Current access token, fetching one if the session uses the password grant
    pub async fn token(&self) -> Result<Option<String>> {
        match self.session.http().authenticator() {
            Some(auth) => auth.token().await,
            None => Ok(None),
        }
    }

    /// End this handle's use of the session
    ///
    /// The cached token is dropped; pooled connections close once the last
    /// clone of this client is gone.
    pub async fn close(self) {
        self.session.close().await;
    }

    async fn search(
        &self,
        query: &RecordQuery,
        page_size: PageSize,
        cursor: Option<&Cursor>,
    ) -> Result<Page<Record>> {
        let url = self.session.endpoint(endpoints::RECORDS_SEARCH)?;
        let body = serde_json::to_value(SearchRequest {
            query,
            page_size: page_size.get(),
            cursor: cursor.map(Cursor::as_str),
        })?;

        debug!(
            "Fetching records from {url} (page_size={page_size}, cursor={:?})",
            cursor.map(Cursor::as_str)
        );

        let response: ApiResponse<Vec<Record>> = self
            .session
            .http()
            .request_json(Method::POST, &url, RequestConfig::new().no_store().json(body))
            .await?;

        Page::from_response(response, page_size)
    }
}

#[async_trait]
impl PageSource for AsyncClient {
    async fn fetch_page(
        &self,
        query: &RecordQuery,
        page_size: PageSize,
        cursor: Option<&Cursor>,
    ) -> Result<Page<Record>> {
        let page_size = self.session.page_size(page_size.get())?;
        self.search(query, page_size, cursor).await
    }
}
