//! Reqwest-based HTTP client for the Archetype API.
//!
//! This module owns the raw communication with Archetype: the vendor
//! auth headers, the environment-selected base endpoint, the fixed
//! pipeline endpoint, and the status-code checking every call goes
//! through. No retries; every call is attempted exactly once.

use crate::config::ArchetypeConfig;
use crate::protocol::models::{CredentialProbe, TelemetryRecord};
use crate::ArchetypeError;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

/// Relative path of the authorize endpoint on the base endpoint.
pub const AUTHORIZE_PATH: &str = "/sdk/v2/authorize";

/// Telemetry ingestion endpoint; fixed, not environment-dependent.
pub const PIPELINE_ENDPOINT: &str = "https://pipeline.archetype.dev/v1/query";

const APP_ID_HEADER: &str = "X-Archetype-AppID";
const SECRET_KEY_HEADER: &str = "X-Archetype-SecretKey";

/// Archetype HTTP client.
///
/// Holds a pooled connection, the credentials, and the resolved
/// endpoints. Cheap to share behind an `Arc`; all state is read-only
/// after construction.
pub struct ArchetypeClient {
    client: Client,
    app_id: String,
    secret_key: String,
    base_endpoint: String,
    pipeline_endpoint: String,
}

impl ArchetypeClient {
    /// Create a new client from config.
    ///
    /// Validates the config, resolves the environment from the secret
    /// key prefix, and builds the underlying HTTP client with the
    /// configured timeout.
    ///
    /// # Errors
    /// Returns config errors from validation, or `Transport` if the
    /// HTTP client cannot be built.
    pub fn new(config: &ArchetypeConfig) -> Result<Self, ArchetypeError> {
        config.validate()?;
        let environment = config.environment()?;

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ArchetypeError::Transport(format!("failed to create client: {e}")))?;

        Ok(Self {
            client,
            app_id: config.app_id.clone(),
            secret_key: config.secret_key.clone(),
            base_endpoint: environment.base_endpoint().to_string(),
            pipeline_endpoint: PIPELINE_ENDPOINT.to_string(),
        })
    }

    /// Create a client pointed at custom endpoints (for testing).
    #[cfg(test)]
    pub(crate) fn with_endpoints(
        config: &ArchetypeConfig,
        base_endpoint: String,
        pipeline_endpoint: String,
    ) -> Result<Self, ArchetypeError> {
        let mut client = Self::new(config)?;
        client.base_endpoint = base_endpoint;
        client.pipeline_endpoint = pipeline_endpoint;
        Ok(client)
    }

    /// Authorize a request against Archetype.
    ///
    /// POSTs the probe to the authorize endpoint and returns the
    /// response status on success.
    ///
    /// # Errors
    /// Status errors per the fixed mapping, or `Transport` when the
    /// call never reached the remote.
    pub async fn authorize(&self, probe: &CredentialProbe) -> Result<u16, ArchetypeError> {
        let url = format!("{}{}", self.base_endpoint, AUTHORIZE_PATH);
        let response = self.post_json(&url, probe).await?;
        let status = response.status().as_u16();
        check_status(status)?;
        Ok(status)
    }

    /// Send a telemetry record to the pipeline endpoint.
    ///
    /// # Errors
    /// Status errors per the fixed mapping, or `Transport`. Callers on
    /// the request path should route through the dispatcher instead,
    /// which logs and swallows these.
    pub async fn send_telemetry(&self, record: &TelemetryRecord) -> Result<(), ArchetypeError> {
        let response = self.post_json(&self.pipeline_endpoint, record).await?;
        check_status(response.status().as_u16())?;
        Ok(())
    }

    /// Call an account endpoint under the base endpoint.
    ///
    /// Direct pass-through: the payload goes up as JSON, the response
    /// body comes back parsed.
    ///
    /// # Errors
    /// Status errors per the fixed mapping, `Transport` on connectivity
    /// failure, `Protocol` when the response body is not valid JSON.
    pub async fn call(&self, path: &str, payload: &Value) -> Result<Value, ArchetypeError> {
        let url = format!("{}{}", self.base_endpoint, path);
        let response = self.post_json(&url, payload).await?;
        check_status(response.status().as_u16())?;
        response
            .json()
            .await
            .map_err(|e| ArchetypeError::Protocol(format!("invalid JSON response: {e}")))
    }

    /// The base endpoint all SDK calls use.
    pub fn base_endpoint(&self) -> &str {
        &self.base_endpoint
    }

    async fn post_json<T: Serialize + ?Sized>(
        &self,
        url: &str,
        payload: &T,
    ) -> Result<reqwest::Response, ArchetypeError> {
        tracing::debug!(url, "calling Archetype");

        let response = self
            .client
            .post(url)
            .header(APP_ID_HEADER, &self.app_id)
            .header(SECRET_KEY_HEADER, &self.secret_key)
            .json(payload)
            .send()
            .await
            .map_err(transport_error)?;

        tracing::debug!(url, status = response.status().as_u16(), "Archetype responded");
        Ok(response)
    }
}

/// Categorize a reqwest error into the connectivity error kind.
fn transport_error(e: reqwest::Error) -> ArchetypeError {
    tracing::warn!(error = %e, "Archetype request failed");
    if e.is_timeout() {
        ArchetypeError::Transport(format!("request timed out: {e}"))
    } else if e.is_connect() {
        ArchetypeError::Transport(format!("connection failed: {e}"))
    } else {
        ArchetypeError::Transport(e.to_string())
    }
}

fn check_status(status: u16) -> Result<(), ArchetypeError> {
    match ArchetypeError::from_status(status) {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MockClock;
    use crate::request::CapturedRequest;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config() -> ArchetypeConfig {
        ArchetypeConfig::new("app_1", "sk_test_abc")
    }

    fn test_probe() -> CredentialProbe {
        CredentialProbe {
            path: "/items".to_string(),
            url_apikey: None,
            body_apikey: None,
            header_apikey: Some("key_1".to_string()),
        }
    }

    fn client_against(server: &MockServer) -> ArchetypeClient {
        ArchetypeClient::with_endpoints(
            &test_config(),
            server.uri(),
            format!("{}/v1/query", server.uri()),
        )
        .unwrap()
    }

    #[test]
    fn test_client_resolves_environment_endpoint() {
        let client = ArchetypeClient::new(&test_config()).unwrap();
        assert_eq!(client.base_endpoint(), "https://test.archetype.dev");

        let client = ArchetypeClient::new(&ArchetypeConfig::new("app_1", "sk_prod_abc")).unwrap();
        assert_eq!(client.base_endpoint(), "https://api.archetype.dev");
    }

    #[test]
    fn test_client_rejects_bad_config() {
        let result = ArchetypeClient::new(&ArchetypeConfig::new("app_1", "sk_other"));
        assert!(matches!(result, Err(ArchetypeError::InvalidSecretKey)));
    }

    #[tokio::test]
    async fn test_authorize_sends_probe_with_vendor_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/sdk/v2/authorize"))
            .and(header("X-Archetype-AppID", "app_1"))
            .and(header("X-Archetype-SecretKey", "sk_test_abc"))
            .and(header("content-type", "application/json"))
            .and(body_partial_json(serde_json::json!({
                "path": "/items",
                "header_apikey": "key_1"
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_against(&server);
        let status = client.authorize(&test_probe()).await.unwrap();
        assert_eq!(status, 200);
    }

    #[tokio::test]
    async fn test_authorize_accepts_any_registered_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(202))
            .mount(&server)
            .await;

        let client = client_against(&server);
        assert_eq!(client.authorize(&test_probe()).await.unwrap(), 202);
    }

    async fn authorize_failing_with(status: u16) -> ArchetypeError {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;

        let client = client_against(&server);
        client.authorize(&test_probe()).await.unwrap_err()
    }

    #[tokio::test]
    async fn test_authorize_maps_quota_status() {
        let error = authorize_failing_with(400).await;
        assert!(matches!(error, ArchetypeError::QuotaExceeded));
        assert_eq!(error.status(), Some(400));
    }

    #[tokio::test]
    async fn test_authorize_maps_access_status() {
        let error = authorize_failing_with(401).await;
        assert!(matches!(error, ArchetypeError::AccessDenied));
        assert_eq!(error.status(), Some(401));
    }

    #[tokio::test]
    async fn test_authorize_maps_bad_key_status() {
        let error = authorize_failing_with(403).await;
        assert!(matches!(error, ArchetypeError::ApiKeyRejected));
        assert_eq!(error.status(), Some(403));
    }

    #[tokio::test]
    async fn test_authorize_maps_unknown_endpoint_status() {
        let error = authorize_failing_with(404).await;
        assert!(matches!(error, ArchetypeError::EndpointNotFound));
        assert_eq!(error.status(), Some(404));
    }

    #[tokio::test]
    async fn test_authorize_maps_other_status_to_denied() {
        let error = authorize_failing_with(500).await;
        assert!(matches!(error, ArchetypeError::Denied { status: 500 }));
        assert_eq!(error.status(), Some(500));
    }

    #[tokio::test]
    async fn test_authorize_transport_failure() {
        // Nothing listens here; the connection is refused outright.
        let client = ArchetypeClient::with_endpoints(
            &test_config(),
            "http://127.0.0.1:1".to_string(),
            "http://127.0.0.1:1".to_string(),
        )
        .unwrap();

        let error = client.authorize(&test_probe()).await.unwrap_err();
        assert!(matches!(error, ArchetypeError::Transport(_)));
        assert_eq!(error.status(), None);
    }

    #[tokio::test]
    async fn test_send_telemetry_posts_record() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/query"))
            .and(header("X-Archetype-AppID", "app_1"))
            .and(body_partial_json(serde_json::json!({
                "status_code": 200,
                "user_id": "key_9",
                "tier": ""
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let clock = MockClock::from_rfc3339("2025-01-15T12:00:00Z");
        let request = CapturedRequest::new("GET", "/items");
        let record = TelemetryRecord::manual("key_9", &request, "app_1", &clock);

        let client = client_against(&server);
        client.send_telemetry(&record).await.unwrap();
    }

    #[tokio::test]
    async fn test_send_telemetry_maps_status_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let clock = MockClock::from_rfc3339("2025-01-15T12:00:00Z");
        let request = CapturedRequest::new("GET", "/items");
        let record = TelemetryRecord::manual("key_9", &request, "app_1", &clock);

        let client = client_against(&server);
        let error = client.send_telemetry(&record).await.unwrap_err();
        assert!(matches!(error, ArchetypeError::Denied { status: 500 }));
    }

    #[tokio::test]
    async fn test_call_parses_json_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/sdk/v1/tiers"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"tiers": [{"id": "tier_1"}]})),
            )
            .mount(&server)
            .await;

        let client = client_against(&server);
        let value = client
            .call("/sdk/v1/tiers", &serde_json::json!({}))
            .await
            .unwrap();
        assert_eq!(value["tiers"][0]["id"], "tier_1");
    }

    #[tokio::test]
    async fn test_call_rejects_malformed_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = client_against(&server);
        let error = client
            .call("/sdk/v1/tiers", &serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(error, ArchetypeError::Protocol(_)));
    }

    #[tokio::test]
    async fn test_call_repeats_identical_requests() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/sdk/v1/user"))
            .and(body_partial_json(serde_json::json!({"custom_uid": "u_1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "u_1"})))
            .expect(2)
            .mount(&server)
            .await;

        let client = client_against(&server);
        let payload = serde_json::json!({"custom_uid": "u_1"});
        client.call("/sdk/v1/user", &payload).await.unwrap();
        client.call("/sdk/v1/user", &payload).await.unwrap();
    }
}
