//! DDA record (signed/unsigned agreement instance) models.

use datapace_core::types::{DbId, Timestamp};
use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;

/// The current record for a `(organisation, record_id)` pair.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DdaRecord {
    pub id: DbId,
    pub organisation_id: DbId,
    pub record_id: String,
    pub template_id: String,
    pub template_revision_id: Option<String>,
    pub state: String,
    pub opt_in: bool,
    pub record: Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A superseded record payload preserved in `dda_record_history`.
///
/// `dda_template_row_id` is nullable so history survives template
/// revision deletion.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DdaRecordHistory {
    pub id: DbId,
    pub organisation_id: DbId,
    pub record_id: String,
    pub template_id: String,
    pub template_revision_id: Option<String>,
    pub state: String,
    pub opt_in: bool,
    pub record: Value,
    pub dda_template_row_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Inbound record payload extracted from a notification event.
///
/// `opt_in` is the payload's own `optIn` value, stored verbatim; the
/// toggle logic lives in the consent flow, never in ingestion.
#[derive(Debug, Clone)]
pub struct InboundRecord {
    pub record_id: String,
    pub template_id: String,
    pub template_revision_id: String,
    pub state: String,
    pub opt_in: bool,
    pub record: Value,
}
