//! Organisation entity model and DTOs.

use datapace_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `organisations` table.
///
/// The OAuth client secret never leaves the server.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Organisation {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub location: String,
    pub open_api_url: String,
    #[serde(skip_serializing)]
    pub admin_user_id: DbId,
    pub access_point_url: String,
    #[serde(skip_serializing)]
    pub client_id: String,
    #[serde(skip_serializing)]
    pub client_secret: String,
    pub ows_base_url: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating an organisation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrganisation {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub open_api_url: String,
    pub admin_user_id: DbId,
    #[serde(default)]
    pub access_point_url: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default)]
    pub ows_base_url: String,
}
