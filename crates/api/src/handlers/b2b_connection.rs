//! Handler for the org-scoped B2B connection listing.

use axum::extract::{Query, State};
use axum::Json;
use serde_json::{json, Value};

use datapace_core::pagination::paginate;
use datapace_db::repositories::B2bConnectionRepo;

use crate::error::AppResult;
use crate::handlers::{resolve_organisation, PageQuery};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// GET /api/v1/b2b-connections
pub async fn list_connections(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<Value>> {
    let organisation = resolve_organisation(&state.pool, auth.user_id).await?;

    let connections = B2bConnectionRepo::list(&state.pool, organisation.id).await?;
    let (page_items, info) = paginate(&connections, page.params());

    Ok(Json(json!({
        "b2bConnections": page_items,
        "pagination": info,
    })))
}
