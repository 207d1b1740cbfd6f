//! Record and dataset types

use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single record as stored by the service
///
/// Only the identifying fields have accessors; every other attribute is
/// reached through [`Record::get`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(JsonObject);

impl Record {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Get an attribute
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.0.get(key)
    }

    /// Set an attribute, returning the previous value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Option<JsonValue> {
        self.0.insert(key.into(), value.into())
    }

    /// Builder-style attribute setter
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Service-assigned record id
    pub fn id(&self) -> Option<Uuid> {
        self.uuid_field("id")
    }

    /// Id of the record in its source dataset
    pub fn external_id(&self) -> Option<&str> {
        self.0.get("externalID").and_then(JsonValue::as_str)
    }

    /// Dataset the record belongs to
    pub fn dataset_id(&self) -> Option<Uuid> {
        self.uuid_field("datasetID")
    }

    /// Borrow the underlying attribute map
    pub fn as_map(&self) -> &JsonObject {
        &self.0
    }

    /// Consume into the underlying attribute map
    pub fn into_map(self) -> JsonObject {
        self.0
    }

    fn uuid_field(&self, key: &str) -> Option<Uuid> {
        self.0
            .get(key)
            .and_then(JsonValue::as_str)
            .and_then(|s| Uuid::parse_str(s).ok())
    }
}

impl From<JsonObject> for Record {
    fn from(map: JsonObject) -> Self {
        Self(map)
    }
}

impl TryFrom<JsonValue> for Record {
    type Error = Error;

    fn try_from(value: JsonValue) -> Result<Self> {
        match value {
            JsonValue::Object(map) => Ok(Self(map)),
            other => Err(Error::decode(format!(
                "record must be a JSON object, got {other}"
            ))),
        }
    }
}

/// A dataset known to the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Dataset id
    pub id: Uuid,
    /// Unique dataset name
    pub name: String,
    /// Remaining attributes, kept as returned
    #[serde(flatten)]
    pub extra: JsonObject,
}
