//! Client for the external wallet/verification system.
//!
//! The consent flow needs four upstream calls: access-point discovery,
//! authorization-server metadata, a client-credentials token, and the
//! verification request itself. Only the handful of fields this service
//! reads are modelled; the rest of each response is passed through as
//! opaque JSON. Any transport failure or non-2xx maps to
//! [`CoreError::Upstream`] and surfaces as a 400 with the upstream text
//! embedded; nothing is retried here.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use datapace_core::error::CoreError;

/// Well-known access-point discovery document.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessPointDiscovery {
    /// Base URL of the OAuth2 authorization server.
    pub authorization_server: String,
    /// Endpoint issuing verification requests for record signing.
    pub get_verification_request_endpoint: String,
}

/// Authorization-server metadata document.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthServerMetadata {
    pub token_endpoint: String,
}

#[derive(Debug, Clone, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// The wallet operations the consent flow depends on.
#[async_trait]
pub trait WalletApi: Send + Sync {
    /// Fetch the access-point well-known document.
    async fn discover_access_point(
        &self,
        access_point_url: &str,
    ) -> Result<AccessPointDiscovery, CoreError>;

    /// Fetch the authorization-server metadata document.
    async fn authorization_server_metadata(
        &self,
        authorization_server: &str,
    ) -> Result<AuthServerMetadata, CoreError>;

    /// Obtain a client-credentials access token.
    async fn fetch_access_token(
        &self,
        token_endpoint: &str,
        client_id: &str,
        client_secret: &str,
    ) -> Result<String, CoreError>;

    /// Issue a verification request for signing a template revision.
    ///
    /// The response is opaque; callers forward it to the client, which
    /// reads `presentation_exchange_id` / `state` out of it.
    async fn get_verification_request(
        &self,
        endpoint: &str,
        template_revision_id: &str,
        opt_in: bool,
        record_id: Option<&str>,
        access_token: &str,
    ) -> Result<Value, CoreError>;
}

/// `reqwest`-backed production implementation of [`WalletApi`].
pub struct HttpWalletClient {
    client: reqwest::Client,
}

impl HttpWalletClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Read a JSON body from a wallet response, converting non-2xx into
    /// an upstream error that embeds the response text.
    async fn read_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, CoreError> {
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(CoreError::Upstream(format!(
                "wallet returned {status}: {text}"
            )));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| CoreError::Upstream(format!("invalid wallet response: {e}")))
    }
}

impl Default for HttpWalletClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WalletApi for HttpWalletClient {
    async fn discover_access_point(
        &self,
        access_point_url: &str,
    ) -> Result<AccessPointDiscovery, CoreError> {
        let url = format!(
            "{}/.well-known/openid-configuration",
            access_point_url.trim_end_matches('/')
        );
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CoreError::Upstream(format!("access point unreachable: {e}")))?;
        Self::read_json(response).await
    }

    async fn authorization_server_metadata(
        &self,
        authorization_server: &str,
    ) -> Result<AuthServerMetadata, CoreError> {
        let url = format!(
            "{}/.well-known/oauth-authorization-server",
            authorization_server.trim_end_matches('/')
        );
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CoreError::Upstream(format!("authorization server unreachable: {e}")))?;
        Self::read_json(response).await
    }

    async fn fetch_access_token(
        &self,
        token_endpoint: &str,
        client_id: &str,
        client_secret: &str,
    ) -> Result<String, CoreError> {
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", client_id),
            ("client_secret", client_secret),
        ];
        let response = self
            .client
            .post(token_endpoint)
            .form(&params)
            .send()
            .await
            .map_err(|e| CoreError::Upstream(format!("token endpoint unreachable: {e}")))?;
        let token: TokenResponse = Self::read_json(response).await?;
        Ok(token.access_token)
    }

    async fn get_verification_request(
        &self,
        endpoint: &str,
        template_revision_id: &str,
        opt_in: bool,
        record_id: Option<&str>,
        access_token: &str,
    ) -> Result<Value, CoreError> {
        let mut body = serde_json::json!({
            "dataDisclosureAgreementTemplateRevisionId": template_revision_id,
            "optIn": opt_in,
        });
        if let Some(record_id) = record_id {
            body["dataDisclosureAgreementRecordId"] = serde_json::json!(record_id);
        }

        let response = self
            .client
            .post(endpoint)
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| CoreError::Upstream(format!("verification endpoint unreachable: {e}")))?;
        Self::read_json(response).await
    }
}
