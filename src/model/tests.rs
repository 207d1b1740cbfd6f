//! Tests for the model module

use super::*;
use crate::error::Error;
use pretty_assertions::assert_eq;
use serde_json::json;
use uuid::Uuid;

// ============================================================================
// Record Tests
// ============================================================================

#[test]
fn test_record_accessors() {
    let id = Uuid::new_v4();
    let dataset = Uuid::new_v4();
    let record: Record = serde_json::from_value(json!({
        "id": id.to_string(),
        "externalID": "obs-17",
        "datasetID": dataset.to_string(),
        "scientificName": "Parus major"
    }))
    .unwrap();

    assert_eq!(record.id(), Some(id));
    assert_eq!(record.external_id(), Some("obs-17"));
    assert_eq!(record.dataset_id(), Some(dataset));
    assert_eq!(record.get("scientificName"), Some(&json!("Parus major")));
    assert_eq!(record.get("missing"), None);
}

#[test]
fn test_record_ignores_unparseable_ids() {
    let record = Record::new().with("id", "not-a-uuid").with("externalID", 17);
    assert_eq!(record.id(), None);
    assert_eq!(record.external_id(), None);
}

#[test]
fn test_record_serializes_transparently() {
    let record = Record::new().with("externalID", "a").with("count", 3);
    assert_eq!(
        serde_json::to_value(&record).unwrap(),
        json!({"externalID": "a", "count": 3})
    );
}

#[test]
fn test_record_rejects_non_object() {
    assert!(serde_json::from_value::<Record>(json!([1, 2])).is_err());
    assert!(matches!(
        Record::try_from(json!("text")),
        Err(Error::Decode { .. })
    ));
    assert!(Record::try_from(json!({"a": 1})).is_ok());
}

#[test]
fn test_dataset_keeps_extra_fields() {
    let id = Uuid::new_v4();
    let dataset: Dataset = serde_json::from_value(json!({
        "id": id.to_string(),
        "name": "birds",
        "license": "CC-BY"
    }))
    .unwrap();

    assert_eq!(dataset.id, id);
    assert_eq!(dataset.name, "birds");
    assert_eq!(dataset.extra.get("license"), Some(&json!("CC-BY")));
}

#[test]
fn test_dataset_requires_id() {
    let result = serde_json::from_value::<Dataset>(json!({"name": "birds"}));
    assert!(result.is_err());
}

// ============================================================================
// Query Tests
// ============================================================================

#[test]
fn test_empty_query_serializes_flags_only() {
    let value = serde_json::to_value(RecordQuery::new()).unwrap();
    assert_eq!(value, json!({"geom": false, "patch": false}));
}

#[test]
fn test_query_uses_service_field_names() {
    let dataset = Uuid::new_v4();
    let query = RecordQuery::new()
        .taxon("2492462")
        .dataset(dataset)
        .external_ids(["a", "b"])
        .kingdom("Animalia")
        .location(Location::Raw("POINT(24.9 60.1)".to_string()), Some(500))
        .updated_between(Some(10), Some(20))
        .with_geometry(true)
        .as_patch(true);

    let value = serde_json::to_value(&query).unwrap();
    assert_eq!(
        value,
        json!({
            "taxonID": "2492462",
            "datasetID": dataset.to_string(),
            "externalIDs": ["a", "b"],
            "kingdom": "Animalia",
            "location": "POINT(24.9 60.1)",
            "distance": 500,
            "update_min": 10,
            "update_max": 20,
            "geom": true,
            "patch": true
        })
    );
}

#[test]
fn test_geobuf_location_is_base64() {
    let query = RecordQuery::new().location(Location::Geobuf(vec![0x0a, 0x01, 0xff]), None);
    let value = serde_json::to_value(&query).unwrap();
    assert_eq!(value["location"], json!("CgH/"));
    assert!(value.get("distance").is_none());
}

#[test]
fn test_zero_bounds_are_left_out() {
    let query = RecordQuery::new()
        .location(Location::Raw("POINT(0 0)".to_string()), Some(0))
        .updated_between(Some(0), Some(0));

    let value = serde_json::to_value(&query).unwrap();
    assert_eq!(
        value,
        json!({"location": "POINT(0 0)", "geom": false, "patch": false})
    );

    let value = serde_json::to_value(RecordQuery::new().updated_between(Some(0), Some(-1))).unwrap();
    assert!(value.get("update_min").is_none());
    assert_eq!(value["update_max"], json!(-1));
}

#[test]
fn test_search_request_flattens_query() {
    let query = RecordQuery::new().kingdom("Fungi");

    let first = serde_json::to_value(SearchRequest {
        query: &query,
        page_size: 100,
        cursor: None,
    })
    .unwrap();
    assert_eq!(
        first,
        json!({"kingdom": "Fungi", "geom": false, "patch": false, "page_size": 100})
    );

    let next = serde_json::to_value(SearchRequest {
        query: &query,
        page_size: 100,
        cursor: Some("c1"),
    })
    .unwrap();
    assert_eq!(next["cursor"], json!("c1"));
}

#[test]
fn test_suggested_page_size() {
    assert_eq!(RecordQuery::new().suggested_page_size(50, 1000), 50);

    let by_ids = RecordQuery::new().external_ids(["a", "b", "c"]);
    assert_eq!(by_ids.suggested_page_size(50, 1000), 3);
    assert_eq!(by_ids.suggested_page_size(50, 2), 2);
}

// ============================================================================
// Envelope Tests
// ============================================================================

#[test]
fn test_envelope_success() {
    let response: ApiResponse<Vec<Record>> = serde_json::from_value(json!({
        "success": true,
        "data": [{"externalID": "a"}],
        "has_more": true,
        "cursor": "c1",
        "total": 250
    }))
    .unwrap();

    assert!(response.has_more);
    assert_eq!(response.cursor.as_deref(), Some("c1"));
    assert_eq!(response.total, Some(250));
    assert_eq!(response.into_data().unwrap().len(), 1);
}

#[test]
fn test_envelope_failure_carries_message() {
    let response: ApiResponse<Vec<Record>> = serde_json::from_value(json!({
        "success": false,
        "message": "Invalid taxon",
        "data": null
    }))
    .unwrap();

    assert_eq!(response.message(), "Invalid taxon");
    match response.into_data() {
        Err(Error::Service { message }) => assert_eq!(message, "Invalid taxon"),
        other => panic!("Expected Service error, got {other:?}"),
    }
}

#[test]
fn test_envelope_success_without_data() {
    let response: ApiResponse<Vec<Uuid>> =
        serde_json::from_value(json!({"success": true})).unwrap();
    assert!(!response.has_more);
    assert!(matches!(response.into_data(), Err(Error::Decode { .. })));
}

#[test]
fn test_envelope_requires_success_flag() {
    let result = serde_json::from_value::<ApiResponse<Vec<Record>>>(json!({"data": []}));
    assert!(result.is_err());
}

#[test]
fn test_envelope_rejects_wrong_data_shape() {
    let result = serde_json::from_value::<ApiResponse<Vec<Record>>>(json!({
        "success": true,
        "data": {"not": "a list"}
    }));
    assert!(result.is_err());
}
