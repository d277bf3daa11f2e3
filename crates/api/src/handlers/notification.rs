//! Handler for `POST /notifications` -- the wallet event ingestion point.
//!
//! The upstream wallet posts `{type, event, <payload-key>}` documents.
//! Every validation failure rejects the whole request before any
//! mutation; once dispatch starts, each branch does its own transactional
//! writes through the repositories.

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use datapace_core::dda::derive_record_state;
use datapace_core::error::CoreError;
use datapace_core::notification::{
    decode_template_envelope, missing_template_fields, NotificationEvent, NotificationType,
};
use datapace_db::models::dda_record::InboundRecord;
use datapace_db::models::dda_template::NewRevision;
use datapace_db::repositories::{B2bConnectionRepo, DdaRecordRepo, DdaTemplateRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// POST /api/v1/notifications
///
/// Ingest one wallet event. Success is always `200 {"status": "ok"}`;
/// the created entity is never echoed.
pub async fn receive_notification(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> AppResult<Json<Value>> {
    // A valid token that maps to no organisation is a real 404 here,
    // unlike the 400 convention elsewhere.
    let organisation = datapace_db::repositories::OrganisationRepo::find_by_admin_user(
        &state.pool,
        auth.user_id,
    )
    .await?
    .ok_or_else(|| {
        AppError::ResourceNotFound("No organisation found for the authenticated client".into())
    })?;

    let notif_type: NotificationType = required_str(&body, "type")?
        .parse()
        .map_err(CoreError::Validation)?;
    let event: NotificationEvent = required_str(&body, "event")?
        .parse()
        .map_err(CoreError::Validation)?;

    match notif_type {
        NotificationType::DdaTemplate => {
            let payload = payload_object(&body, "dataDisclosureAgreementTemplate")?;
            handle_template(&state, organisation.id, event, payload).await?;
        }
        NotificationType::DdaRecord => {
            let payload = payload_object(&body, "dataDisclosureAgreementRecord")?;
            handle_record(&state, organisation.id, event, payload).await?;
        }
        NotificationType::B2bConnection => {
            let payload = payload_object(&body, "b2bConnection")?;
            handle_b2b(&state, organisation.id, event, payload).await?;
        }
    }

    Ok(Json(json!({ "status": "ok" })))
}

fn required_str<'a>(body: &'a Value, key: &str) -> AppResult<&'a str> {
    body.get(key).and_then(Value::as_str).ok_or_else(|| {
        AppError::Core(CoreError::Validation(format!("'{key}' is required")))
    })
}

/// Extract the payload object for a notification type, rejecting
/// anything that is not a non-empty JSON object.
fn payload_object<'a>(body: &'a Value, key: &str) -> AppResult<&'a Value> {
    let payload = body.get(key).ok_or_else(|| {
        AppError::Core(CoreError::Validation(format!("'{key}' is required")))
    })?;
    match payload.as_object() {
        Some(obj) if !obj.is_empty() => Ok(payload),
        _ => Err(AppError::Core(CoreError::Validation(format!(
            "'{key}' must be a non-empty object"
        )))),
    }
}

async fn handle_template(
    state: &AppState,
    organisation_id: i64,
    event: NotificationEvent,
    payload: &Value,
) -> AppResult<()> {
    let envelope = decode_template_envelope(payload).map_err(CoreError::Validation)?;

    let missing = missing_template_fields(event, &envelope.template);
    if !missing.is_empty() {
        return Err(AppError::MissingFields(missing));
    }

    // '@id' is guaranteed present past the missing-field gate.
    let template_id = envelope.template_id().unwrap_or_default().to_owned();

    match event {
        NotificationEvent::Create | NotificationEvent::Update => {
            // Every inbound template event is a new immutable revision;
            // update never edits an existing row in place.
            let tags = envelope.revision_id.iter().cloned().collect();
            let input = NewRevision {
                template_id,
                version: envelope.version().to_owned(),
                record: Value::Object(envelope.template.clone()),
                revision: Value::Object(envelope.revision.clone()),
                revision_id: envelope.revision_id.clone(),
                tags,
            };
            let row = DdaTemplateRepo::create_revision(&state.pool, organisation_id, &input).await?;
            tracing::info!(
                template_id = %row.template_id,
                version = %row.version,
                "stored template revision"
            );
        }
        NotificationEvent::Delete => {
            // The delete event may carry a revision payload; it is
            // tolerated and ignored. Archiving zero rows is valid.
            let archived = DdaTemplateRepo::archive(&state.pool, organisation_id, &template_id).await?;
            tracing::info!(template_id = %template_id, archived, "archived template");
        }
    }
    Ok(())
}

async fn handle_record(
    state: &AppState,
    organisation_id: i64,
    event: NotificationEvent,
    payload: &Value,
) -> AppResult<()> {
    // Record deletion is not part of the upstream contract.
    if event == NotificationEvent::Delete {
        return Ok(());
    }

    let record_id = payload.get("canonicalId").and_then(Value::as_str);
    let revision = payload.get("dataDisclosureAgreementTemplateRevision");
    let revision_id = revision
        .and_then(|r| r.get("id"))
        .and_then(Value::as_str);
    let template_id = revision
        .and_then(|r| r.get("objectId"))
        .and_then(Value::as_str);

    // Incomplete upstream payloads are tolerated as a silent no-op.
    let (Some(record_id), Some(revision_id), Some(template_id)) =
        (record_id, revision_id, template_id)
    else {
        tracing::warn!("record notification missing ids, ignoring");
        return Ok(());
    };

    let record_state = derive_record_state(payload);
    // The payload's own optIn is stored verbatim; the consent flow owns
    // the toggle logic.
    let opt_in = payload
        .get("optIn")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let template_row =
        DdaTemplateRepo::find_by_revision_id(&state.pool, organisation_id, revision_id).await?;

    let input = InboundRecord {
        record_id: record_id.to_owned(),
        template_id: template_id.to_owned(),
        template_revision_id: revision_id.to_owned(),
        state: record_state.as_str().to_owned(),
        opt_in,
        record: payload.clone(),
    };
    DdaRecordRepo::apply_inbound(
        &state.pool,
        organisation_id,
        &input,
        template_row.map(|t| t.id),
    )
    .await?;
    Ok(())
}

async fn handle_b2b(
    state: &AppState,
    organisation_id: i64,
    event: NotificationEvent,
    payload: &Value,
) -> AppResult<()> {
    match event {
        NotificationEvent::Create | NotificationEvent::Update => {
            // A payload without an id is tolerated as a silent no-op,
            // like incomplete record payloads.
            let Some(connection_id) = payload.get("id").and_then(Value::as_str) else {
                tracing::warn!("b2b connection notification missing id, ignoring");
                return Ok(());
            };
            B2bConnectionRepo::upsert(&state.pool, organisation_id, connection_id, payload).await?;
        }
        // Known gap in the upstream contract: deletes are not acted on.
        NotificationEvent::Delete => {}
    }
    Ok(())
}
