//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: config file → session → paged requests → records

use futures::TryStreamExt;
use hinaturedb_client::{
    AsyncClient, BlockingClient, ClientConfig, Cursor, Error, Page, Record, RecordQuery,
};
use serde_json::{json, Value};
use std::io::Write;
use tempfile::NamedTempFile;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Pages through a fixed list of observations, using opaque string cursors
struct Observations {
    ids: Vec<String>,
}

impl Observations {
    fn new(count: usize) -> Self {
        Self {
            ids: (0..count).map(|i| format!("obs-{i:04}")).collect(),
        }
    }
}

impl Respond for Observations {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = serde_json::from_slice(&request.body).unwrap();
        let page_size = body["page_size"].as_u64().unwrap() as usize;
        // Cursor is the last id of the previous page
        let start = match body["cursor"].as_str() {
            Some(after) => self.ids.iter().position(|id| id == after).unwrap() + 1,
            None => 0,
        };
        let end = (start + page_size).min(self.ids.len());
        let has_more = end < self.ids.len();

        let data: Vec<Value> = self.ids[start..end]
            .iter()
            .map(|id| json!({"externalID": id, "taxonID": "t-42"}))
            .collect();

        ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "",
            "data": data,
            "has_more": has_more,
            "cursor": if has_more { Value::from(self.ids[end - 1].clone()) } else { Value::Null },
            "total": self.ids.len()
        }))
    }
}

async fn mount_service(server: &MockServer, count: usize) {
    Mock::given(method("POST"))
        .and(path("/api/v1/token"))
        .and(body_string_contains("grant_type=password"))
        .and(body_string_contains("username=field-team"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "abc123",
            "token_type": "bearer",
            "expires_in": 1800
        })))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/records/search"))
        .and(header("authorization", "Bearer abc123"))
        .and(body_partial_json(json!({"taxonID": "t-42"})))
        .respond_with(Observations::new(count))
        .mount(server)
        .await;
}

fn yaml_config(server: &MockServer) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    writeln!(
        file,
        "url: {}\nusername: field-team\npassword: hunter2\ndefault_page_size: 25\ninitial_backoff_ms: 10\nmax_backoff_ms: 20",
        server.uri()
    )
    .unwrap();
    file
}

// ============================================================================
// Async Client
// ============================================================================

#[tokio::test]
async fn test_async_traversal_from_config_file() {
    let server = MockServer::start().await;
    mount_service(&server, 60).await;

    let file = yaml_config(&server);
    let config = ClientConfig::from_file(file.path()).unwrap();
    let client = AsyncClient::new(&config).unwrap();
    let query = RecordQuery::new().taxon("t-42");

    let pages: Vec<Page<Record>> = client.pages(&query, 25).unwrap().try_collect().await.unwrap();

    let sizes: Vec<usize> = pages.iter().map(Page::len).collect();
    assert_eq!(sizes, vec![25, 25, 10]);
    assert_eq!(pages[0].cursor().map(Cursor::as_str), Some("obs-0024"));
    assert_eq!(pages[0].total(), Some(60));

    let all = client.get_all_records(&query).await.unwrap();
    let ids: Vec<&str> = all.iter().filter_map(Record::external_id).collect();
    assert_eq!(ids.len(), 60);
    assert_eq!(ids.first(), Some(&"obs-0000"));
    assert_eq!(ids.last(), Some(&"obs-0059"));

    client.close().await;
}

#[tokio::test]
async fn test_async_manual_cursor_loop() {
    let server = MockServer::start().await;
    mount_service(&server, 7).await;

    let config = ClientConfig::new(server.uri()).with_password("field-team", "hunter2");
    let client = AsyncClient::new(&config).unwrap();
    let query = RecordQuery::new().taxon("t-42");

    let mut seen = Vec::new();
    let mut cursor: Option<Cursor> = None;
    loop {
        let page = client.get_records(&query, 3, cursor.as_ref()).await.unwrap();
        seen.extend(page.records().iter().filter_map(|r| r.external_id().map(String::from)));
        match page.cursor() {
            Some(next) => cursor = Some(next.clone()),
            None => break,
        }
    }

    assert_eq!(seen.len(), 7);
    assert_eq!(seen[6], "obs-0006");
}

// ============================================================================
// Blocking Client
// ============================================================================

#[test]
fn test_blocking_traversal_from_env_lookup() {
    let server = tokio_test::block_on(MockServer::start());
    tokio_test::block_on(mount_service(&server, 12));

    let uri = server.uri();
    let config = ClientConfig::from_lookup(|key| match key {
        "HINATUREDB_URL" => Some(uri.clone()),
        "HINATUREDB_USERNAME" => Some("field-team".to_string()),
        "HINATUREDB_PASSWORD" => Some("hunter2".to_string()),
        "HINATUREDB_PAGE_SIZE" => Some("5".to_string()),
        _ => None,
    })
    .unwrap();

    let client = BlockingClient::new(&config).unwrap();
    let query = RecordQuery::new().taxon("t-42");

    let mut pages = client.pages(&query, 5).unwrap();
    let first = pages.next().unwrap().unwrap();
    assert_eq!(first.len(), 5);
    assert_eq!(pages.state().pages, 1);

    let rest: Vec<Page<Record>> = pages.collect::<hinaturedb_client::Result<_>>().unwrap();
    assert_eq!(rest.iter().map(Page::len).collect::<Vec<_>>(), vec![5, 2]);

    // default page size of 5 from the environment
    let all = client.get_all_records(&query).unwrap();
    assert_eq!(all.len(), 12);

    client.close();
}

#[test]
fn test_blocking_rejects_page_size_before_connecting() {
    // Nothing listens here; validation must fail first
    let config = ClientConfig::new("http://127.0.0.1:1").with_token("t");
    let client = BlockingClient::new(&config).unwrap();

    let err = client.get_records(&RecordQuery::new(), 0, None).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { .. }));
    assert!(client.pages(&RecordQuery::new(), 5000).is_err());
}

// ============================================================================
// Writes and Lookups
// ============================================================================

#[tokio::test]
async fn test_create_then_fetch_record() {
    let server = MockServer::start().await;
    let dataset_id = Uuid::new_v4();
    let record_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/api/v1/datasets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [{"id": dataset_id, "name": "herbarium"}]
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/record_batch"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [record_id]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/record"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"id": record_id, "externalID": "obs-1", "datasetID": dataset_id}
        })))
        .mount(&server)
        .await;

    let client = AsyncClient::new(&ClientConfig::new(server.uri()).with_token("t")).unwrap();

    let dataset = client.get_dataset_id("herbarium").await.unwrap();
    let record = Record::new()
        .with("externalID", "obs-1")
        .with("datasetID", dataset.to_string());

    let ids = client.create_records(&[record]).await.unwrap();
    assert_eq!(ids, vec![record_id]);

    let fetched = client.get_record(dataset, "obs-1", true).await.unwrap().unwrap();
    assert_eq!(fetched.id(), Some(record_id));
    assert_eq!(fetched.dataset_id(), Some(dataset_id));
}
