//! DDA template revision models.

use datapace_core::types::{DbId, Timestamp};
use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;

/// A row from the `dda_templates` revision store.
///
/// Each row is one immutable revision of a logical template; revisions
/// sharing `(organisation_id, template_id)` form the version history.
/// `record` carries the opaque agreement document; its embedded
/// `"status"` field is kept in sync with the `status` column by
/// [`crate::repositories::DdaTemplateRepo::transition_status`].
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DdaTemplate {
    pub id: DbId,
    pub organisation_id: DbId,
    pub template_id: String,
    pub version: String,
    pub status: String,
    pub record: Value,
    pub revision: Value,
    pub revision_id: Option<String>,
    pub tags: Value,
    pub is_latest_version: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl DdaTemplate {
    /// The tags column as a string list. Non-string entries are dropped.
    pub fn tags_vec(&self) -> Vec<String> {
        self.tags
            .as_array()
            .map(|arr| {
                arr.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Inputs for inserting a new revision.
#[derive(Debug, Clone)]
pub struct NewRevision {
    pub template_id: String,
    pub version: String,
    pub record: Value,
    pub revision: Value,
    pub revision_id: Option<String>,
    pub tags: Vec<String>,
}

/// A listed-and-latest revision joined with its owning organisation,
/// as consumed by the catalogue search scan.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListedTemplate {
    pub id: DbId,
    pub organisation_id: DbId,
    pub organisation_name: String,
    pub template_id: String,
    pub version: String,
    pub status: String,
    pub record: Value,
    pub tags: Value,
    pub is_latest_version: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ListedTemplate {
    pub fn tags_vec(&self) -> Vec<String> {
        self.tags
            .as_array()
            .map(|arr| {
                arr.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default()
    }
}
