//! Record search filters

use base64::Engine as _;
use serde::{Serialize, Serializer};
use uuid::Uuid;

/// Spatial filter for a record search
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// Value passed through as given (e.g. an already encoded geometry)
    Raw(String),
    /// Geobuf-encoded geometry, sent base64-encoded
    Geobuf(Vec<u8>),
}

impl Serialize for Location {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Location::Raw(value) => serializer.serialize_str(value),
            Location::Geobuf(bytes) => {
                serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(bytes))
            }
        }
    }
}

/// Filters for `records/search`
///
/// Unset fields are left out of the request body entirely. A zero
/// `distance`, `update_min` or `update_max` counts as unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecordQuery {
    #[serde(rename = "taxonID", skip_serializing_if = "Option::is_none")]
    pub taxon_id: Option<String>,

    #[serde(rename = "datasetID", skip_serializing_if = "Option::is_none")]
    pub dataset_id: Option<Uuid>,

    #[serde(rename = "externalIDs", skip_serializing_if = "Vec::is_empty")]
    pub external_ids: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub kingdom: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,

    /// Search radius around `location`, in meters
    #[serde(skip_serializing_if = "unset_or_zero")]
    pub distance: Option<u32>,

    /// Lower bound on the update timestamp (unix seconds)
    #[serde(skip_serializing_if = "unset_or_zero")]
    pub update_min: Option<i64>,

    /// Upper bound on the update timestamp (unix seconds)
    #[serde(skip_serializing_if = "unset_or_zero")]
    pub update_max: Option<i64>,

    /// Include geometries in returned records
    pub geom: bool,

    /// Return records in patch form
    pub patch: bool,
}

impl RecordQuery {
    /// Empty query matching every record
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn taxon(mut self, taxon_id: impl Into<String>) -> Self {
        self.taxon_id = Some(taxon_id.into());
        self
    }

    #[must_use]
    pub fn dataset(mut self, dataset_id: Uuid) -> Self {
        self.dataset_id = Some(dataset_id);
        self
    }

    #[must_use]
    pub fn external_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.external_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn kingdom(mut self, kingdom: impl Into<String>) -> Self {
        self.kingdom = Some(kingdom.into());
        self
    }

    #[must_use]
    pub fn location(mut self, location: Location, distance: Option<u32>) -> Self {
        self.location = Some(location);
        self.distance = distance;
        self
    }

    #[must_use]
    pub fn updated_between(mut self, min: Option<i64>, max: Option<i64>) -> Self {
        self.update_min = min;
        self.update_max = max;
        self
    }

    #[must_use]
    pub fn with_geometry(mut self, geom: bool) -> Self {
        self.geom = geom;
        self
    }

    #[must_use]
    pub fn as_patch(mut self, patch: bool) -> Self {
        self.patch = patch;
        self
    }

    /// Page size to use when the caller did not pick one
    ///
    /// A lookup by external ids fetches them in one page when the service
    /// maximum allows it.
    pub fn suggested_page_size(&self, default: u32, max: u32) -> u32 {
        if self.external_ids.is_empty() {
            default
        } else {
            (self.external_ids.len() as u32).min(max)
        }
    }
}

fn unset_or_zero<T: Default + PartialEq>(value: &Option<T>) -> bool {
    value.as_ref().map_or(true, |v| *v == T::default())
}

/// Body of a `records/search` request
#[derive(Debug, Serialize)]
pub(crate) struct SearchRequest<'a> {
    #[serde(flatten)]
    pub query: &'a RecordQuery,
    pub page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<&'a str>,
}
