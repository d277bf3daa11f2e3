#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use datapace_api::auth::jwt::{generate_access_token, JwtConfig};
use datapace_api::config::ServerConfig;
use datapace_api::router::build_app_router;
use datapace_api::state::AppState;
use datapace_api::wallet::{AccessPointDiscovery, AuthServerMetadata, WalletApi};
use datapace_core::error::CoreError;
use datapace_db::models::organisation::CreateOrganisation;
use datapace_db::repositories::OrganisationRepo;

const TEST_JWT_SECRET: &str = "test-secret-that-is-long-enough-for-hmac";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// Canned wallet that records nothing and always succeeds (or always
/// fails when `fail` is set), so consent-flow handlers can be exercised
/// without a live upstream.
#[derive(Default)]
pub struct StubWallet {
    pub fail: bool,
}

#[async_trait]
impl WalletApi for StubWallet {
    async fn discover_access_point(
        &self,
        _access_point_url: &str,
    ) -> Result<AccessPointDiscovery, CoreError> {
        if self.fail {
            return Err(CoreError::Upstream("wallet returned 503: unavailable".into()));
        }
        Ok(AccessPointDiscovery {
            authorization_server: "https://wallet.test/auth".to_string(),
            get_verification_request_endpoint: "https://wallet.test/verification".to_string(),
        })
    }

    async fn authorization_server_metadata(
        &self,
        _authorization_server: &str,
    ) -> Result<AuthServerMetadata, CoreError> {
        Ok(AuthServerMetadata {
            token_endpoint: "https://wallet.test/token".to_string(),
        })
    }

    async fn fetch_access_token(
        &self,
        _token_endpoint: &str,
        _client_id: &str,
        _client_secret: &str,
    ) -> Result<String, CoreError> {
        Ok("stub-access-token".to_string())
    }

    async fn get_verification_request(
        &self,
        _endpoint: &str,
        template_revision_id: &str,
        opt_in: bool,
        record_id: Option<&str>,
        _access_token: &str,
    ) -> Result<serde_json::Value, CoreError> {
        Ok(serde_json::json!({
            "presentation_exchange_id": "pex-1",
            "state": "request-sent",
            "templateRevisionId": template_revision_id,
            "optIn": opt_in,
            "recordId": record_id,
        }))
    }
}

/// Build the full application router with all middleware layers and a
/// stub wallet, mirroring the construction in `main.rs`.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_wallet(pool, StubWallet::default())
}

pub fn build_test_app_with_wallet(pool: PgPool, wallet: StubWallet) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        wallet: Arc::new(wallet),
    };
    build_app_router(state, &config)
}

/// Mint a bearer token for the given user id with the test secret.
pub fn auth_token(user_id: i64) -> String {
    generate_access_token(user_id, &test_config().jwt).expect("token generation should succeed")
}

/// Seed an organisation owned by `admin_user_id` directly in the database.
pub async fn seed_org(pool: &PgPool, name: &str, admin_user_id: i64) -> i64 {
    OrganisationRepo::create(
        pool,
        &CreateOrganisation {
            name: name.to_string(),
            description: format!("{name} description"),
            location: "Helsinki".to_string(),
            open_api_url: String::new(),
            admin_user_id,
            access_point_url: "https://wallet.test/access-point".to_string(),
            client_id: "client-id".to_string(),
            client_secret: "client-secret".to_string(),
            ows_base_url: String::new(),
        },
    )
    .await
    .expect("organisation creation should succeed")
    .id
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("GET")
            .uri(uri)
            .header("authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .header("authorization", format!("Bearer {token}"))
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("PUT")
            .uri(uri)
            .header("content-type", "application/json")
            .header("authorization", format!("Bearer {token}"))
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("DELETE")
            .uri(uri)
            .header("authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("response body should be valid JSON")
}
