//! Blocking record client

use super::async_client::AsyncClient;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::model::{Dataset, Record, RecordQuery};
use crate::pagination::{Cursor, Page, PageSize, PageSource, PaginationState};
use crate::types::JsonValue;
use std::time::Duration;
use tokio::runtime::{Builder, Runtime};
use uuid::Uuid;

/// How long `close` waits for in-flight connection tasks
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

/// Blocking client for the record service
///
/// Every call runs the matching [`AsyncClient`] operation to completion on a
/// runtime owned by this client, so requests and decoding are identical for
/// both. Must not be used from inside an async context; use [`AsyncClient`]
/// there.
#[derive(Debug)]
pub struct BlockingClient {
    inner: AsyncClient,
    runtime: Runtime,
}

impl BlockingClient {
    /// Open a session and start the client's runtime
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("hinaturedb-blocking")
            .enable_all()
            .build()?;
        let inner = {
            let _guard = runtime.enter();
            AsyncClient::new(config)?
        };
        Ok(Self { inner, runtime })
    }

    /// The async client this one drives
    pub fn as_async(&self) -> &AsyncClient {
        &self.inner
    }

    /// Fetch one page of records matching `query`
    ///
    /// See [`AsyncClient::get_records`].
    pub fn get_records(
        &self,
        query: &RecordQuery,
        page_size: u32,
        cursor: Option<&Cursor>,
    ) -> Result<Page<Record>> {
        self.runtime
            .block_on(self.inner.get_records(query, page_size, cursor))
    }

    /// Iterate over every page of `query`, fetching each on demand
    pub fn pages<'a>(&'a self, query: &'a RecordQuery, page_size: u32) -> Result<BlockingPages<'a>> {
        let page_size = self.inner.session().page_size(page_size)?;
        Ok(BlockingPages {
            client: self,
            query,
            page_size,
            state: PaginationState::new(),
        })
    }

    pub fn get_all_records(&self, query: &RecordQuery) -> Result<Vec<Record>> {
        self.runtime.block_on(self.inner.get_all_records(query))
    }

    pub fn get_record(
        &self,
        dataset_id: Uuid,
        external_id: &str,
        exact: bool,
    ) -> Result<Option<Record>> {
        self.runtime
            .block_on(self.inner.get_record(dataset_id, external_id, exact))
    }

    pub fn create_records(&self, records: &[Record]) -> Result<Vec<Uuid>> {
        self.runtime.block_on(self.inner.create_records(records))
    }

    pub fn batch_update_records(&self, updates: &[JsonValue]) -> Result<Vec<Uuid>> {
        self.runtime.block_on(self.inner.batch_update_records(updates))
    }

    pub fn update_record(&self, record_id: Uuid, record: &Record) -> Result<Uuid> {
        self.runtime
            .block_on(self.inner.update_record(record_id, record))
    }

    pub fn get_dataset_by_name(&self, name: &str) -> Result<Dataset> {
        self.runtime.block_on(self.inner.get_dataset_by_name(name))
    }

    pub fn get_dataset_id(&self, name: &str) -> Result<Uuid> {
        self.runtime.block_on(self.inner.get_dataset_id(name))
    }

    pub fn token(&self) -> Result<Option<String>> {
        self.runtime.block_on(self.inner.token())
    }

    /// Close the session and stop the runtime
    pub fn close(self) {
        let Self { inner, runtime } = self;
        runtime.block_on(inner.close());
        runtime.shutdown_timeout(SHUTDOWN_TIMEOUT);
    }
}

/// Pages of one traversal, fetched as the iterator is advanced
///
/// Ends after the last page, or after the first error.
#[derive(Debug)]
pub struct BlockingPages<'a> {
    client: &'a BlockingClient,
    query: &'a RecordQuery,
    page_size: PageSize,
    state: PaginationState,
}

impl BlockingPages<'_> {
    /// Progress so far
    pub fn state(&self) -> &PaginationState {
        &self.state
    }
}

impl Iterator for BlockingPages<'_> {
    type Item = Result<Page<Record>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state.done {
            return None;
        }

        let fetched = self.client.runtime.block_on(self.client.inner.fetch_page(
            self.query,
            self.page_size,
            self.state.cursor.as_ref(),
        ));

        let page = match fetched {
            Ok(page) => page,
            Err(e) => {
                self.state.mark_done();
                return Some(Err(e));
            }
        };

        Some(self.state.advance(&page).map(|()| page))
    }
}
