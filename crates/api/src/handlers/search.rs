//! Handler for `GET /service/search` -- the public catalogue search.

use std::collections::HashMap;
use std::collections::HashSet;

use axum::extract::{Query, State};
use axum::Json;
use serde_json::{json, Value};

use datapace_core::error::CoreError;
use datapace_core::pagination::{paginate, PageParams};
use datapace_core::search::{
    org_matches, parse_bool_param, record_contains, tags_contain, SearchScopes, SortBy, SortOrder,
};
use datapace_db::models::dda_template::ListedTemplate;
use datapace_db::models::organisation::Organisation;
use datapace_db::repositories::{DdaTemplateRepo, OrganisationRepo};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/v1/service/search
///
/// Free-text catalogue search over organisations and listed DDAs. The
/// two result arrays are paginated independently; no matches is a 200
/// with empty arrays, not an error.
pub async fn search_catalogue(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<Json<Value>> {
    let term = params
        .get("search")
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(
                "'search' is required and must be non-empty".into(),
            ))
        })?;
    let term_lower = term.to_lowercase();

    let scopes = parse_scopes(&params).map_err(CoreError::Validation)?;
    if !scopes.any_enabled() {
        return Err(AppError::Core(CoreError::Validation(
            "At least one search scope must be enabled".into(),
        )));
    }

    let sort_by: SortBy = match params.get("sortBy") {
        Some(raw) => raw.parse().map_err(CoreError::Validation)?,
        None => SortBy::Relevance,
    };
    let sort_order: SortOrder = match params.get("sortOrder") {
        Some(raw) => raw.parse().map_err(CoreError::Validation)?,
        None => SortOrder::Desc,
    };

    let page = PageParams::normalize(
        params.get("offset").and_then(|s| s.parse().ok()),
        params.get("limit").and_then(|s| s.parse().ok()),
    );

    // Candidates: listed + latest revisions only, scanned in memory.
    let candidates = DdaTemplateRepo::list_listed_latest(&state.pool).await?;
    let organisations = OrganisationRepo::list_all(&state.pool).await?;

    let mut dda_matches: Vec<ListedTemplate> = if scopes.dda_scopes_enabled() {
        candidates
            .into_iter()
            .filter(|t| {
                (scopes.record_scan_enabled() && record_contains(&t.record, &term_lower))
                    || (scopes.search_tags && tags_contain(&t.tags_vec(), &term_lower))
            })
            .collect()
    } else {
        Vec::new()
    };

    // Organisations match via their own scope, or by owning a matched
    // DDA. The reverse never holds: org-name hits do not enter `ddas`.
    let dda_owner_ids: HashSet<i64> = dda_matches.iter().map(|t| t.organisation_id).collect();
    let mut org_matches_list: Vec<Organisation> = organisations
        .into_iter()
        .filter(|o| {
            (scopes.search_org_name && org_matches(&o.name, &o.description, &term_lower))
                || dda_owner_ids.contains(&o.id)
        })
        .collect();

    sort_results(&mut org_matches_list, &mut dda_matches, sort_by, sort_order);

    let (org_page, org_info) = paginate(&org_matches_list, page);
    let (dda_page, dda_info) = paginate(&dda_matches, page);

    Ok(Json(json!({
        "organisations": org_page,
        "organisationsPagination": org_info,
        "ddas": dda_page,
        "ddasPagination": dda_info,
        "searchMeta": {
            "search": term,
            "scopes": scopes,
            "sortBy": sort_by,
            "sortOrder": sort_order,
        },
    })))
}

fn parse_scopes(params: &HashMap<String, String>) -> Result<SearchScopes, String> {
    let flag = |name: &str| -> Result<bool, String> {
        parse_bool_param(params.get(name).map(String::as_str), name, true)
    };
    Ok(SearchScopes {
        search_org_name: flag("searchOrgName")?,
        search_dda_purpose: flag("searchDdaPurpose")?,
        search_dda_description: flag("searchDdaDescription")?,
        search_dataset: flag("searchDataset")?,
        search_tags: flag("searchTags")?,
    })
}

/// Apply the requested ordering. Relevance keeps the store's
/// newest-first order; the other dimensions each touch one list.
fn sort_results(
    orgs: &mut [Organisation],
    ddas: &mut [ListedTemplate],
    sort_by: SortBy,
    sort_order: SortOrder,
) {
    match sort_by {
        SortBy::Relevance => {}
        SortBy::OrgName => {
            orgs.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
            if sort_order == SortOrder::Desc {
                orgs.reverse();
            }
        }
        SortBy::OrgCreatedAt => {
            orgs.sort_by_key(|o| o.created_at);
            if sort_order == SortOrder::Desc {
                orgs.reverse();
            }
        }
        SortBy::DdaCreatedAt => {
            ddas.sort_by_key(|t| t.created_at);
            if sort_order == SortOrder::Desc {
                ddas.reverse();
            }
        }
    }
}
