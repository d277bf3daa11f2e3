//! Integration tests for the health endpoint, the public organisation
//! directory, and the org-scoped B2B connection listing.

mod common;

use axum::http::StatusCode;
use common::{auth_token, body_json, build_test_app, get, get_auth, seed_org};
use serde_json::json;
use sqlx::PgPool;

use datapace_db::repositories::B2bConnectionRepo;

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_health_reports_database_state(pool: PgPool) {
    let response = get(build_test_app(pool), "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["db_healthy"], true);
    assert!(body["version"].is_string());
}

/// The directory is public, paginated, and never leaks credentials.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_organisation_directory_is_public_and_redacted(pool: PgPool) {
    seed_org(&pool, "Acme Health", 1).await;
    seed_org(&pool, "Mobility Org", 2).await;

    let response = get(build_test_app(pool), "/api/v1/service/organisations?limit=1").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let orgs = body["organisations"].as_array().unwrap();
    assert_eq!(orgs.len(), 1);
    assert_eq!(body["pagination"]["totalItems"], 2);
    assert_eq!(body["pagination"]["totalPages"], 2);

    // Wallet credentials are skipped at the model level.
    assert!(orgs[0].get("clientId").is_none());
    assert!(orgs[0].get("clientSecret").is_none());
    assert!(orgs[0].get("adminUserId").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_b2b_listing_requires_auth(pool: PgPool) {
    let response = get(build_test_app(pool), "/api/v1/b2b-connections").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Connections are scoped to the caller's organisation.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_b2b_listing_is_org_scoped(pool: PgPool) {
    let org_a = seed_org(&pool, "Acme Health", 1).await;
    let org_b = seed_org(&pool, "Mobility Org", 2).await;

    B2bConnectionRepo::upsert(&pool, org_a, "conn-a", &json!({ "theirLabel": "Partner A" }))
        .await
        .expect("upsert should succeed");
    B2bConnectionRepo::upsert(&pool, org_b, "conn-b", &json!({ "theirLabel": "Partner B" }))
        .await
        .expect("upsert should succeed");

    let response = get_auth(
        build_test_app(pool),
        "/api/v1/b2b-connections",
        &auth_token(1),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let connections = body["b2bConnections"].as_array().unwrap();
    assert_eq!(connections.len(), 1);
    assert_eq!(connections[0]["connectionId"], "conn-a");
    assert_eq!(body["pagination"]["totalItems"], 1);
}
