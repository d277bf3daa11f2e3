pub mod health;

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /notifications                                    wallet event ingestion (POST, bearer)
///
/// /service/search                                   public catalogue search (GET)
/// /service/organisations                            public directory (GET)
/// /service/organisations/{organisationId}/data-disclosure-agreements/{templateId}/verification-request
///                                                   consent flow (POST, auth)
///
/// /data-disclosure-agreements                       org-scoped listing w/ revisions (GET)
/// /data-disclosure-agreements/{templateId}          latest or ?version= fetch (GET)
/// /data-disclosure-agreements/{templateId}/status   status transition (PUT, 204/400)
/// /data-disclosure-agreements/{templateId}/tags     tag replacement (PUT)
/// /data-disclosure-agreements/{templateId}/histories           record history (GET)
/// /data-disclosure-agreements/{templateId}/histories/{id}      delete entry (DELETE, 204/404)
///
/// /b2b-connections                                  org-scoped listing (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/notifications",
            post(handlers::notification::receive_notification),
        )
        .route("/service/search", get(handlers::search::search_catalogue))
        .route(
            "/service/organisations",
            get(handlers::organisation::list_organisations),
        )
        .route(
            "/service/organisations/{organisation_id}/data-disclosure-agreements/{template_id}/verification-request",
            post(handlers::consent::create_verification_request),
        )
        .route(
            "/data-disclosure-agreements",
            get(handlers::dda_template::list_templates),
        )
        .route(
            "/data-disclosure-agreements/{template_id}",
            get(handlers::dda_template::get_template),
        )
        .route(
            "/data-disclosure-agreements/{template_id}/status",
            put(handlers::dda_template::put_status),
        )
        .route(
            "/data-disclosure-agreements/{template_id}/tags",
            put(handlers::dda_template::put_tags),
        )
        .route(
            "/data-disclosure-agreements/{template_id}/histories",
            get(handlers::dda_template::list_histories),
        )
        .route(
            "/data-disclosure-agreements/{template_id}/histories/{history_id}",
            delete(handlers::dda_template::delete_history),
        )
        .route(
            "/b2b-connections",
            get(handlers::b2b_connection::list_connections),
        )
}
