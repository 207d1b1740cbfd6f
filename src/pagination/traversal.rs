//! Cursor traversal over a page source

use super::types::{Cursor, Page, PageSize, PaginationState};
use crate::error::Result;
use crate::model::{Record, RecordQuery};
use async_trait::async_trait;
use futures::{stream, Stream, TryStreamExt};

/// Anything that can fetch one page of search results
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch the page starting at `cursor`, or the first page when `None`
    async fn fetch_page(
        &self,
        query: &RecordQuery,
        page_size: PageSize,
        cursor: Option<&Cursor>,
    ) -> Result<Page<Record>>;
}

/// Lazily walk every page of `query`, in cursor order
///
/// Each page is requested only when the previous one has been consumed.
/// The stream ends after the page without a cursor, or after yielding the
/// first error. Calling this again restarts from the first page.
pub fn page_stream<'a, S>(
    source: &'a S,
    query: &'a RecordQuery,
    page_size: PageSize,
) -> impl Stream<Item = Result<Page<Record>>> + Send + 'a
where
    S: PageSource + ?Sized,
{
    stream::try_unfold(PaginationState::new(), move |state| {
        next_page(source, query, page_size, state)
    })
}

async fn next_page<S>(
    source: &S,
    query: &RecordQuery,
    page_size: PageSize,
    mut state: PaginationState,
) -> Result<Option<(Page<Record>, PaginationState)>>
where
    S: PageSource + ?Sized,
{
    if state.done {
        return Ok(None);
    }
    let page = source
        .fetch_page(query, page_size, state.cursor.as_ref())
        .await?;
    state.advance(&page)?;
    Ok(Some((page, state)))
}

/// Walk every page and collect the records
pub async fn collect_records<S>(
    source: &S,
    query: &RecordQuery,
    page_size: PageSize,
) -> Result<Vec<Record>>
where
    S: PageSource + ?Sized,
{
    page_stream(source, query, page_size)
        .try_fold(Vec::new(), |mut records, page| async move {
            records.extend(page);
            Ok(records)
        })
        .await
}
