//! Handlers for the org-scoped `/data-disclosure-agreements` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use datapace_core::dda::DdaStatus;
use datapace_core::error::CoreError;
use datapace_core::pagination::paginate;
use datapace_core::types::DbId;
use datapace_db::repositories::{DdaRecordRepo, DdaTemplateRepo, TransitionOutcome};

use crate::error::{AppError, AppResult};
use crate::handlers::{resolve_organisation, PageQuery};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query / request types
// ---------------------------------------------------------------------------

/// Query parameters for the template listing.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Optional status filter applied to the latest revision.
    pub status: Option<String>,
    pub offset: Option<String>,
    pub limit: Option<String>,
}

/// Query parameters for a single-template fetch.
#[derive(Debug, Deserialize)]
pub struct FetchQuery {
    /// Fetch a specific version instead of the latest active revision.
    pub version: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct TagsBody {
    pub tags: Vec<String>,
}

// ---------------------------------------------------------------------------
// Listing / fetch
// ---------------------------------------------------------------------------

/// GET /api/v1/data-disclosure-agreements
///
/// List the organisation's templates: one entry per template id,
/// carrying the latest active revision plus the full revision history.
pub async fn list_templates(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> AppResult<Json<Value>> {
    let organisation = resolve_organisation(&state.pool, auth.user_id).await?;

    let template_ids =
        DdaTemplateRepo::list_unique_template_ids(&state.pool, organisation.id).await?;

    let mut items = Vec::with_capacity(template_ids.len());
    for template_id in template_ids {
        let revisions =
            DdaTemplateRepo::list_active_by_template(&state.pool, organisation.id, &template_id)
                .await?;
        let Some(latest) = revisions.iter().find(|r| r.is_latest_version) else {
            continue;
        };
        if let Some(filter) = &params.status {
            if &latest.status != filter {
                continue;
            }
        }
        let mut item = serde_json::to_value(latest).map_err(|e| {
            AppError::Core(CoreError::Internal(format!("serialization failed: {e}")))
        })?;
        item["revisions"] = serde_json::to_value(&revisions).map_err(|e| {
            AppError::Core(CoreError::Internal(format!("serialization failed: {e}")))
        })?;
        items.push(item);
    }

    let page = PageQuery {
        offset: params.offset,
        limit: params.limit,
    }
    .params();
    let (page_items, info) = paginate(&items, page);

    Ok(Json(json!({
        "dataDisclosureAgreements": page_items,
        "pagination": info,
    })))
}

/// GET /api/v1/data-disclosure-agreements/{templateId}
///
/// Fetch the latest active revision, or a specific one via `?version=`.
/// No active revision is one of the genuine 404 paths.
pub async fn get_template(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(template_id): Path<String>,
    Query(params): Query<FetchQuery>,
) -> AppResult<Json<Value>> {
    let organisation = resolve_organisation(&state.pool, auth.user_id).await?;

    let row = match &params.version {
        Some(version) => {
            DdaTemplateRepo::find_by_version(&state.pool, organisation.id, &template_id, version)
                .await?
        }
        None => {
            DdaTemplateRepo::find_latest_active(&state.pool, organisation.id, &template_id).await?
        }
    };
    let row = row.ok_or_else(|| {
        AppError::ResourceNotFound(format!("No active revision for template '{template_id}'"))
    })?;

    Ok(Json(json!({ "dataDisclosureAgreement": row })))
}

// ---------------------------------------------------------------------------
// Status / tags
// ---------------------------------------------------------------------------

/// PUT /api/v1/data-disclosure-agreements/{templateId}/status
///
/// Attempt a status transition on the latest active revision. Returns
/// 204 on success; an illegal transition is a 400 and mutates nothing.
pub async fn put_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(template_id): Path<String>,
    Json(body): Json<StatusBody>,
) -> AppResult<impl IntoResponse> {
    let organisation = resolve_organisation(&state.pool, auth.user_id).await?;

    let requested: DdaStatus = body
        .status
        .parse()
        .map_err(|e: String| AppError::Core(CoreError::Validation(e)))?;

    let outcome =
        DdaTemplateRepo::transition_status(&state.pool, organisation.id, &template_id, requested)
            .await?;
    match outcome {
        TransitionOutcome::Updated(_) => Ok(StatusCode::NO_CONTENT),
        TransitionOutcome::Illegal { current } => Err(AppError::Core(CoreError::Conflict(
            format!("Transition from '{current}' to '{requested}' is not allowed"),
        ))),
        TransitionOutcome::NotFound => Err(AppError::ResourceNotFound(format!(
            "No active revision for template '{template_id}'"
        ))),
    }
}

/// PUT /api/v1/data-disclosure-agreements/{templateId}/tags
///
/// Full tag replacement on the latest active revision.
pub async fn put_tags(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(template_id): Path<String>,
    Json(body): Json<TagsBody>,
) -> AppResult<Json<Value>> {
    let organisation = resolve_organisation(&state.pool, auth.user_id).await?;

    let row = DdaTemplateRepo::set_tags(&state.pool, organisation.id, &template_id, &body.tags)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound(format!(
                "No active revision for template '{template_id}'"
            )))
        })?;

    Ok(Json(json!({ "tags": row.tags_vec() })))
}

// ---------------------------------------------------------------------------
// Record history
// ---------------------------------------------------------------------------

/// GET /api/v1/data-disclosure-agreements/{templateId}/histories
pub async fn list_histories(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(template_id): Path<String>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<Value>> {
    let organisation = resolve_organisation(&state.pool, auth.user_id).await?;

    let history =
        DdaRecordRepo::list_history_by_template(&state.pool, organisation.id, &template_id).await?;
    let (page_items, info) = paginate(&history, page.params());

    Ok(Json(json!({
        "dataDisclosureAgreementRecords": page_items,
        "pagination": info,
    })))
}

/// DELETE /api/v1/data-disclosure-agreements/{templateId}/histories/{id}
///
/// Delete one superseded record payload. Missing rows are a genuine 404.
pub async fn delete_history(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((template_id, history_id)): Path<(String, DbId)>,
) -> AppResult<impl IntoResponse> {
    let organisation = resolve_organisation(&state.pool, auth.user_id).await?;

    let deleted = DdaRecordRepo::delete_history_row(
        &state.pool,
        organisation.id,
        &template_id,
        history_id,
    )
    .await?;
    if !deleted {
        return Err(AppError::ResourceNotFound(format!(
            "No record history entry {history_id} for template '{template_id}'"
        )));
    }
    Ok(StatusCode::NO_CONTENT)
}
