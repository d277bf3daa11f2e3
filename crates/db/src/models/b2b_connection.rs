//! Business-to-business connection snapshots.

use datapace_core::types::{DbId, Timestamp};
use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;

/// A stored B2B connection document, keyed by
/// `(organisation_id, connection_id)` and overwritten on re-notification.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct B2bConnection {
    pub id: DbId,
    pub organisation_id: DbId,
    pub connection_id: String,
    pub record: Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
