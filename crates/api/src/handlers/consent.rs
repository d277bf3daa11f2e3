//! Handler for the consent verification-request flow.
//!
//! A data-using service asks the data source's wallet to issue a
//! verification request for signing a listed template revision. All
//! wallet calls happen before any local read is acted on and no local
//! write occurs in this flow, so a slow upstream cannot hold a row lock.

use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};

use datapace_core::dda::{next_opt_in, RecordState};
use datapace_core::error::CoreError;
use datapace_core::types::DbId;
use datapace_db::repositories::{DdaRecordRepo, DdaTemplateRepo, OrganisationRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// POST /api/v1/service/organisations/{organisationId}/data-disclosure-agreements/{templateId}/verification-request
///
/// Derive the consent state for the caller and forward it to the data
/// source's wallet:
/// - no prior record: first-time consent, opt-in defaults to true
/// - prior record still unsigned: the pending request's opt-in is reused
/// - prior record signed: a second interaction toggles the stored value
pub async fn create_verification_request(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path((organisation_id, template_id)): Path<(DbId, String)>,
) -> AppResult<Json<Value>> {
    let organisation = OrganisationRepo::find_by_id(&state.pool, organisation_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound(format!(
                "Organisation {organisation_id} does not exist"
            )))
        })?;

    let template =
        DdaTemplateRepo::find_latest_listed(&state.pool, organisation.id, &template_id)
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::NotFound(format!(
                    "No listed revision for template '{template_id}'"
                )))
            })?;
    let revision_id = template.revision_id.as_deref().ok_or_else(|| {
        AppError::Core(CoreError::NotFound(format!(
            "Template '{template_id}' has no wallet revision id"
        )))
    })?;

    let existing = DdaRecordRepo::latest_for_revision(&state.pool, organisation.id, revision_id)
        .await?;
    let opt_in = next_opt_in(existing.as_ref().map(|row| {
        let state = row
            .state
            .parse::<RecordState>()
            .unwrap_or(RecordState::Unsigned);
        (state, row.opt_in)
    }));
    let record_id = existing.as_ref().map(|row| row.record_id.as_str());

    // Wallet chain: discovery, auth-server metadata, client-credentials
    // token, then the verification request itself.
    let discovery = state
        .wallet
        .discover_access_point(&organisation.access_point_url)
        .await?;
    let metadata = state
        .wallet
        .authorization_server_metadata(&discovery.authorization_server)
        .await?;
    let access_token = state
        .wallet
        .fetch_access_token(
            &metadata.token_endpoint,
            &organisation.client_id,
            &organisation.client_secret,
        )
        .await?;
    let verification_request = state
        .wallet
        .get_verification_request(
            &discovery.get_verification_request_endpoint,
            revision_id,
            opt_in,
            record_id,
            &access_token,
        )
        .await?;

    Ok(Json(json!({
        "verificationRequest": verification_request,
        "optIn": opt_in,
    })))
}
