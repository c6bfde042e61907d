//! Credential probes, authorization outcomes, and telemetry records.
//!
//! Field names and ordering here are the Archetype wire contract; the
//! serialized JSON is what the authorize and pipeline endpoints expect.

use crate::clock::Clock;
use crate::request::InboundRequest;
use crate::ArchetypeError;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// The parameter name callers supply their API key under, in all three
/// sources (header, query, body).
pub const API_KEY_FIELD: &str = "apikey";

/// Where an inbound request carried its API key.
///
/// All three sources are recorded independently because telemetry
/// reports them separately; `header_apikey` additionally carries the
/// *effective* key (header wins, then query, then body), which is the
/// value authorization and `user_id` attribution use.
#[derive(Debug, Clone, Serialize)]
pub struct CredentialProbe {
    /// Request path, always with a leading slash.
    pub path: String,

    /// Key found in the URL query string, if any.
    pub url_apikey: Option<String>,

    /// Key found in the request body, if any.
    pub body_apikey: Option<String>,

    /// The effective key: header value, falling back to query, then body.
    pub header_apikey: Option<String>,
}

impl CredentialProbe {
    /// Extract a credential probe from an inbound request.
    ///
    /// Precedence is header over query over body. The request's path is
    /// normalized to carry a leading slash (root stays `/`).
    ///
    /// # Errors
    /// Returns `MissingApiKey` when none of the three sources yields a
    /// non-empty key. Callers must deny the request without any remote
    /// call in that case.
    pub fn from_request(request: &dyn InboundRequest) -> Result<Self, ArchetypeError> {
        let url_apikey = non_empty(request.query(API_KEY_FIELD));
        let body_apikey = non_empty(request.body(API_KEY_FIELD));
        let header_apikey = non_empty(request.header(API_KEY_FIELD))
            .or_else(|| url_apikey.clone())
            .or_else(|| body_apikey.clone());

        if header_apikey.is_none() {
            return Err(ArchetypeError::MissingApiKey);
        }

        Ok(Self {
            path: normalize_path(request.path()),
            url_apikey,
            body_apikey,
            header_apikey,
        })
    }

    /// The effective API key for this request.
    pub fn api_key(&self) -> Option<&str> {
        self.header_apikey.as_deref()
    }
}

/// Result of a single authorization attempt.
///
/// Produced once per attempt, consumed by the telemetry step, and then
/// discarded; nothing is persisted.
#[derive(Debug, Clone, Copy)]
pub struct AuthorizationOutcome {
    /// HTTP status the authorize endpoint returned.
    pub status_code: u16,

    /// Seconds since the Unix epoch when authorization started.
    pub timestamp: f64,
}

/// Per-request audit payload sent to the Archetype pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct TelemetryRecord {
    /// Status code the authorize endpoint returned for this request.
    pub status_code: u16,

    /// Seconds spent authorizing, never negative.
    pub duration: f64,

    /// Response size; the SDK does not measure it and reports zero.
    pub size: u64,

    /// Request path, leading slash included.
    pub path: String,

    /// HTTP method verb.
    pub method: String,

    /// Caller address, when the host knows it.
    pub ip: Option<String>,

    /// All request headers.
    pub headers: HashMap<String, String>,

    /// All request-body fields.
    pub body: HashMap<String, String>,

    /// All URL query arguments.
    pub args: HashMap<String, String>,

    /// Product tier; resolved server-side, always empty here.
    pub tier: String,

    /// The application the record belongs to.
    pub app_id: String,

    /// The caller, attributed by effective API key.
    pub user_id: String,

    /// Seconds since the Unix epoch when the record was built.
    pub timestamp: f64,
}

impl TelemetryRecord {
    /// Build the audit record for an authorized request.
    pub fn for_request(
        request: &dyn InboundRequest,
        probe: &CredentialProbe,
        outcome: &AuthorizationOutcome,
        app_id: &str,
        clock: &dyn Clock,
    ) -> Self {
        let now = clock.unix_seconds();
        Self {
            status_code: outcome.status_code,
            duration: (now - outcome.timestamp).max(0.0),
            size: 0,
            path: probe.path.clone(),
            method: request.method().to_string(),
            ip: request.ip().map(str::to_string),
            headers: request.headers(),
            body: request.body_fields(),
            args: request.query_args(),
            tier: String::new(),
            app_id: app_id.to_string(),
            user_id: probe.api_key().unwrap_or_default().to_string(),
            timestamp: now,
        }
    }

    /// Build a manually-attributed record, outside the authorize flow.
    ///
    /// Reports a 200 status and zero duration, matching what the
    /// pipeline expects from explicit usage logging.
    pub fn manual(
        user_api_key: &str,
        request: &dyn InboundRequest,
        app_id: &str,
        clock: &dyn Clock,
    ) -> Self {
        Self {
            status_code: 200,
            duration: 0.0,
            size: 0,
            path: normalize_path(request.path()),
            method: request.method().to_string(),
            ip: request.ip().map(str::to_string),
            headers: request.headers(),
            body: request.body_fields(),
            args: request.query_args(),
            tier: String::new(),
            app_id: app_id.to_string(),
            user_id: user_api_key.to_string(),
            timestamp: clock.unix_seconds(),
        }
    }
}

/// A created checkout session.
///
/// The API responds with arbitrary JSON; the redirect `url` is the field
/// callers almost always want, so it is surfaced when present with the
/// raw response kept alongside.
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    /// Hosted checkout page to redirect the caller to, if provided.
    pub url: Option<String>,

    /// The full response body.
    pub raw: Value,
}

impl From<Value> for CheckoutSession {
    fn from(raw: Value) -> Self {
        let url = raw.get("url").and_then(Value::as_str).map(str::to_string);
        Self { url, raw }
    }
}

/// Ensure a request path carries a leading slash; root stays `/`.
fn normalize_path(path: &str) -> String {
    if path.is_empty() {
        "/".to_string()
    } else if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}
