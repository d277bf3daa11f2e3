//! HTTP-level integration tests for the org-scoped
//! `/data-disclosure-agreements` resource: listing with revision
//! history, single fetch, the status state machine over HTTP, tag
//! replacement, and record history management.

mod common;

use axum::http::StatusCode;
use common::{
    auth_token, body_json, build_test_app, delete_auth, get, get_auth, put_json_auth, seed_org,
};
use serde_json::json;
use sqlx::PgPool;

use datapace_db::models::dda_record::InboundRecord;
use datapace_db::models::dda_template::NewRevision;
use datapace_db::repositories::{DdaRecordRepo, DdaTemplateRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_revision(pool: &PgPool, org: i64, template_id: &str, version: &str, status: &str) {
    let input = NewRevision {
        template_id: template_id.to_string(),
        version: version.to_string(),
        record: json!({
            "@id": template_id,
            "version": version,
            "status": status,
            "purpose": "research",
        }),
        revision: json!({ "id": format!("{template_id}-{version}") }),
        revision_id: Some(format!("{template_id}-{version}")),
        tags: vec![],
    };
    DdaTemplateRepo::create_revision(pool, org, &input)
        .await
        .expect("revision creation should succeed");
}

/// Push one inbound record payload so supersession produces history rows.
async fn apply_record(pool: &PgPool, org: i64, template_id: &str, state: &str) {
    let input = InboundRecord {
        record_id: "rec-1".to_string(),
        template_id: template_id.to_string(),
        template_revision_id: format!("{template_id}-1.0.0"),
        state: state.to_string(),
        opt_in: true,
        record: json!({ "canonicalId": "rec-1", "state": state }),
    };
    DdaRecordRepo::apply_inbound(pool, org, &input, None)
        .await
        .expect("record ingestion should succeed");
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_listing_requires_auth(pool: PgPool) {
    let response = get(build_test_app(pool), "/api/v1/data-disclosure-agreements").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["error"], "invalid_token");
}

// ---------------------------------------------------------------------------
// Listing and fetch
// ---------------------------------------------------------------------------

/// The listing groups by template id; each entry is the latest revision
/// plus the full active revision history.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_listing_groups_revisions_per_template(pool: PgPool) {
    let org = seed_org(&pool, "Acme Health", 1).await;
    seed_revision(&pool, org, "dda-1", "1.0.0", "unlisted").await;
    seed_revision(&pool, org, "dda-1", "2.0.0", "unlisted").await;
    seed_revision(&pool, org, "dda-2", "1.0.0", "listed").await;

    let response = get_auth(
        build_test_app(pool),
        "/api/v1/data-disclosure-agreements",
        &auth_token(1),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let items = body["dataDisclosureAgreements"].as_array().unwrap();
    assert_eq!(items.len(), 2);

    let dda_1 = items
        .iter()
        .find(|i| i["templateId"] == "dda-1")
        .expect("dda-1 entry");
    assert_eq!(dda_1["version"], "2.0.0", "entry carries the latest revision");
    assert_eq!(dda_1["revisions"].as_array().unwrap().len(), 2);
    assert_eq!(body["pagination"]["totalItems"], 2);
}

/// `?status=` filters entries by the latest revision's status.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_listing_filters_by_status(pool: PgPool) {
    let org = seed_org(&pool, "Acme Health", 1).await;
    seed_revision(&pool, org, "dda-1", "1.0.0", "unlisted").await;
    seed_revision(&pool, org, "dda-2", "1.0.0", "listed").await;

    let response = get_auth(
        build_test_app(pool),
        "/api/v1/data-disclosure-agreements?status=listed",
        &auth_token(1),
    )
    .await;
    let body = body_json(response).await;
    let items = body["dataDisclosureAgreements"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["templateId"], "dda-2");
}

/// Fetch returns the latest active revision, or a pinned one via
/// `?version=`; a template with no active revision is a genuine 404.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_fetch_latest_and_pinned_version(pool: PgPool) {
    let org = seed_org(&pool, "Acme Health", 1).await;
    seed_revision(&pool, org, "dda-1", "1.0.0", "unlisted").await;
    seed_revision(&pool, org, "dda-1", "2.0.0", "unlisted").await;
    let token = auth_token(1);

    let response = get_auth(
        build_test_app(pool.clone()),
        "/api/v1/data-disclosure-agreements/dda-1",
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["dataDisclosureAgreement"]["version"], "2.0.0");

    let response = get_auth(
        build_test_app(pool.clone()),
        "/api/v1/data-disclosure-agreements/dda-1?version=1.0.0",
        &token,
    )
    .await;
    let body = body_json(response).await;
    assert_eq!(body["dataDisclosureAgreement"]["version"], "1.0.0");

    let response = get_auth(
        build_test_app(pool),
        "/api/v1/data-disclosure-agreements/no-such-template",
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"], "not_found");
}

// ---------------------------------------------------------------------------
// Status transitions
// ---------------------------------------------------------------------------

/// An illegal transition is rejected with a 400 and changes nothing.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_illegal_transition_rejected_without_mutation(pool: PgPool) {
    let org = seed_org(&pool, "Acme Health", 1).await;
    seed_revision(&pool, org, "dda-1", "1.0.0", "unlisted").await;
    let token = auth_token(1);

    let response = put_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/data-disclosure-agreements/dda-1/status",
        json!({ "status": "listed" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "invalid_request");
    assert!(body["error_description"]
        .as_str()
        .unwrap()
        .contains("'unlisted' to 'listed'"));

    // The revision is untouched.
    let response = get_auth(
        build_test_app(pool),
        "/api/v1/data-disclosure-agreements/dda-1",
        &token,
    )
    .await;
    let body = body_json(response).await;
    assert_eq!(body["dataDisclosureAgreement"]["status"], "unlisted");
    assert_eq!(body["dataDisclosureAgreement"]["record"]["status"], "unlisted");
}

/// A legal transition answers 204 and updates both the column and the
/// embedded record status.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_legal_transition_updates_both_representations(pool: PgPool) {
    let org = seed_org(&pool, "Acme Health", 1).await;
    seed_revision(&pool, org, "dda-1", "1.0.0", "unlisted").await;
    let token = auth_token(1);

    let response = put_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/data-disclosure-agreements/dda-1/status",
        json!({ "status": "awaitingForApproval" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(
        build_test_app(pool),
        "/api/v1/data-disclosure-agreements/dda-1",
        &token,
    )
    .await;
    let body = body_json(response).await;
    assert_eq!(body["dataDisclosureAgreement"]["status"], "awaitingForApproval");
    assert_eq!(
        body["dataDisclosureAgreement"]["record"]["status"],
        "awaitingForApproval"
    );
}

/// Unknown status values and unknown templates each fail cleanly.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_transition_error_paths(pool: PgPool) {
    let org = seed_org(&pool, "Acme Health", 1).await;
    seed_revision(&pool, org, "dda-1", "1.0.0", "unlisted").await;
    let token = auth_token(1);

    let response = put_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/data-disclosure-agreements/dda-1/status",
        json!({ "status": "published" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = put_json_auth(
        build_test_app(pool),
        "/api/v1/data-disclosure-agreements/no-such-template/status",
        json!({ "status": "awaitingForApproval" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

/// PUT tags replaces the whole set and echoes it back.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_tags_are_replaced_wholesale(pool: PgPool) {
    let org = seed_org(&pool, "Acme Health", 1).await;
    seed_revision(&pool, org, "dda-1", "1.0.0", "unlisted").await;
    let token = auth_token(1);

    let response = put_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/data-disclosure-agreements/dda-1/tags",
        json!({ "tags": ["healthcare", "wearables"] }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["tags"], json!(["healthcare", "wearables"]));

    // Replacement, not merge.
    let response = put_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/data-disclosure-agreements/dda-1/tags",
        json!({ "tags": ["research"] }),
        &token,
    )
    .await;
    let body = body_json(response).await;
    assert_eq!(body["tags"], json!(["research"]));

    let response = put_json_auth(
        build_test_app(pool),
        "/api/v1/data-disclosure-agreements/no-such-template/tags",
        json!({ "tags": ["x"] }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Record histories
// ---------------------------------------------------------------------------

/// Superseded records are listed newest-first with pagination metadata,
/// and single entries can be deleted exactly once.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_history_listing_and_deletion(pool: PgPool) {
    let org = seed_org(&pool, "Acme Health", 1).await;
    seed_revision(&pool, org, "dda-1", "1.0.0", "unlisted").await;
    let token = auth_token(1);

    // Three payloads for one revision key: one current, two history rows.
    apply_record(&pool, org, "dda-1", "unsigned").await;
    apply_record(&pool, org, "dda-1", "signed").await;
    apply_record(&pool, org, "dda-1", "unsigned").await;

    let response = get_auth(
        build_test_app(pool.clone()),
        "/api/v1/data-disclosure-agreements/dda-1/histories",
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let entries = body["dataDisclosureAgreementRecords"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(body["pagination"]["totalItems"], 2);

    let history_id = entries[0]["id"].as_i64().unwrap();
    let uri = format!("/api/v1/data-disclosure-agreements/dda-1/histories/{history_id}");

    let response = delete_auth(build_test_app(pool.clone()), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Second delete of the same entry is a genuine 404.
    let response = delete_auth(build_test_app(pool), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
