//! The Archetype handle - the main public API.
//!
//! [`Archetype`] ties the pieces together:
//! - Request authentication (extract key, authorize, audit)
//! - Best-effort telemetry dispatch off the request path
//! - The account-management endpoints (tiers, users, checkout,
//!   subscription cancellation)

use crate::client::http::ArchetypeClient;
use crate::clock::{Clock, SystemClock};
use crate::config::ArchetypeConfig;
use crate::protocol::models::{
    AuthorizationOutcome, CheckoutSession, CredentialProbe, TelemetryRecord,
};
use crate::request::InboundRequest;
use crate::telemetry::dispatch::TelemetryDispatcher;
use crate::ArchetypeError;
use serde_json::{json, Value};
use std::sync::Arc;

const TIERS_PATH: &str = "/sdk/v1/tiers";
const USER_PATH: &str = "/sdk/v1/user";
const CREATE_CHECKOUT_SESSION_PATH: &str = "/sdk/v1/create-checkout-session";
const CANCEL_SUBSCRIPTION_PATH: &str = "/sdk/v1/cancel-subscription";
const CREATE_USER_PATH: &str = "/sdk/v1/create-user";

/// Main entry point for the Archetype SDK.
///
/// Create one instance at startup from an [`ArchetypeConfig`] and share
/// it across requests; all state is read-only after construction.
pub struct Archetype {
    config: ArchetypeConfig,
    clock: Arc<dyn Clock>,
    client: Arc<ArchetypeClient>,
    telemetry: TelemetryDispatcher,
}

impl Archetype {
    /// Create a new SDK handle with the given configuration.
    ///
    /// Uses the system clock for timestamps.
    ///
    /// # Errors
    /// Returns an error if configuration validation fails or the HTTP
    /// client cannot be built.
    pub fn new(config: ArchetypeConfig) -> Result<Self, ArchetypeError> {
        config.validate()?;
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create an SDK handle with a custom clock (for testing).
    #[cfg(any(test, feature = "test-seams"))]
    pub fn new_with_clock(
        config: ArchetypeConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ArchetypeError> {
        config.validate()?;
        Self::with_clock(config, clock)
    }

    fn with_clock(config: ArchetypeConfig, clock: Arc<dyn Clock>) -> Result<Self, ArchetypeError> {
        let client = Arc::new(ArchetypeClient::new(&config)?);
        Ok(Self::assemble(config, clock, client))
    }

    #[cfg(test)]
    fn with_endpoints(
        config: ArchetypeConfig,
        clock: Arc<dyn Clock>,
        base_endpoint: String,
        pipeline_endpoint: String,
    ) -> Result<Self, ArchetypeError> {
        let client = Arc::new(ArchetypeClient::with_endpoints(
            &config,
            base_endpoint,
            pipeline_endpoint,
        )?);
        Ok(Self::assemble(config, clock, client))
    }

    fn assemble(
        config: ArchetypeConfig,
        clock: Arc<dyn Clock>,
        client: Arc<ArchetypeClient>,
    ) -> Self {
        let telemetry = TelemetryDispatcher::new(Arc::clone(&client));
        Self {
            config,
            clock,
            client,
            telemetry,
        }
    }

    /// Authenticate an inbound request against Archetype.
    ///
    /// The full gate pipeline:
    /// 1. Extract the API key (header, then query, then body)
    /// 2. Authorize against the authorize endpoint, blocking the request
    /// 3. On success, dispatch the audit record on a detached task
    ///
    /// Telemetry never delays or fails the request; authorization
    /// errors must abort it.
    ///
    /// # Errors
    /// - `MissingApiKey` - no key anywhere on the request (no remote
    ///   call is made)
    /// - `QuotaExceeded` / `AccessDenied` / `ApiKeyRejected` /
    ///   `EndpointNotFound` / `Denied` - the remote refused the request
    /// - `Transport` - Archetype was unreachable
    pub async fn authenticate(
        &self,
        request: &dyn InboundRequest,
    ) -> Result<AuthorizationOutcome, ArchetypeError> {
        let probe = CredentialProbe::from_request(request)?;
        let started = self.clock.unix_seconds();

        let status_code = self.client.authorize(&probe).await?;
        let outcome = AuthorizationOutcome {
            status_code,
            timestamp: started,
        };

        let record = TelemetryRecord::for_request(
            request,
            &probe,
            &outcome,
            &self.config.app_id,
            self.clock.as_ref(),
        );
        let _ = self.telemetry.dispatch(record);

        Ok(outcome)
    }

    /// List the product tiers configured for this application.
    ///
    /// # Errors
    /// Status, transport, or protocol errors from the remote call.
    pub async fn get_products(&self) -> Result<Value, ArchetypeError> {
        self.client.call(TIERS_PATH, &json!({})).await
    }

    /// Fetch a user by your own user identifier.
    ///
    /// # Errors
    /// Status, transport, or protocol errors from the remote call.
    pub async fn get_user(&self, uid: &str) -> Result<Value, ArchetypeError> {
        self.client.call(USER_PATH, &json!({ "custom_uid": uid })).await
    }

    /// Create a hosted checkout session for a user and tier.
    ///
    /// The response's redirect `url` is surfaced on the returned
    /// [`CheckoutSession`] when the API provides one.
    ///
    /// # Errors
    /// Status, transport, or protocol errors from the remote call.
    pub async fn create_checkout_session(
        &self,
        uid: &str,
        tier_id: &str,
    ) -> Result<CheckoutSession, ArchetypeError> {
        let response = self
            .client
            .call(
                CREATE_CHECKOUT_SESSION_PATH,
                &json!({ "custom_uid": uid, "tier_id": tier_id }),
            )
            .await?;
        Ok(CheckoutSession::from(response))
    }

    /// Cancel a user's subscription.
    ///
    /// # Errors
    /// Status, transport, or protocol errors from the remote call.
    pub async fn cancel_subscription(&self, uid: &str) -> Result<Value, ArchetypeError> {
        self.client
            .call(CANCEL_SUBSCRIPTION_PATH, &json!({ "custom_uid": uid }))
            .await
    }

    /// Register a user with Archetype.
    ///
    /// # Errors
    /// Status, transport, or protocol errors from the remote call.
    pub async fn register_user(
        &self,
        uid: &str,
        name: &str,
        email: &str,
    ) -> Result<Value, ArchetypeError> {
        self.client
            .call(
                CREATE_USER_PATH,
                &json!({ "custom_uid": uid, "name": name, "email": email }),
            )
            .await
    }

    /// Record usage for a caller outside the authorize flow.
    ///
    /// Builds a manually-attributed audit record (200 status, zero
    /// duration) and waits for the pipeline to accept it.
    ///
    /// # Errors
    /// Status or transport errors from the pipeline endpoint.
    pub async fn log_usage(
        &self,
        user_api_key: &str,
        request: &dyn InboundRequest,
    ) -> Result<(), ArchetypeError> {
        let record = TelemetryRecord::manual(
            user_api_key,
            request,
            &self.config.app_id,
            self.clock.as_ref(),
        );
        self.telemetry.send(&record).await
    }

    /// Whether host adapters should attach [`authenticate`](Self::authenticate)
    /// to inbound requests.
    pub fn authorization_enabled(&self) -> bool {
        self.config.authorize_requests
    }

    /// Get the current configuration.
    pub fn config(&self) -> &ArchetypeConfig {
        &self.config
    }

    /// The base endpoint the secret key resolved to.
    pub fn base_endpoint(&self) -> &str {
        self.client.base_endpoint()
    }
}
