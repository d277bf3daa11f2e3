//! Handler for the public organisation directory.

use axum::extract::{Query, State};
use axum::Json;
use serde_json::{json, Value};

use datapace_core::pagination::paginate;
use datapace_db::repositories::OrganisationRepo;

use crate::error::AppResult;
use crate::handlers::PageQuery;
use crate::state::AppState;

/// GET /api/v1/service/organisations
///
/// Public, paginated listing of marketplace organisations. Credentials
/// never serialize (skipped at the model level).
pub async fn list_organisations(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<Value>> {
    let organisations = OrganisationRepo::list_all(&state.pool).await?;
    let (page_items, info) = paginate(&organisations, page.params());

    Ok(Json(json!({
        "organisations": page_items,
        "pagination": info,
    })))
}
