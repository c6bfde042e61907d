//! Framework-neutral view of an inbound HTTP request.
//!
//! The gateway never touches framework request types. Host adapters
//! implement [`InboundRequest`] once per framework; everything the SDK
//! needs is the path, method, caller address, and the three places an
//! API key can travel in.

use std::collections::HashMap;

/// Capabilities the gateway needs from an inbound HTTP request.
///
/// Single-value lookups feed credential extraction; the whole-map
/// accessors feed the telemetry payload, which reports headers, query
/// arguments, and body fields independently.
pub trait InboundRequest: Send + Sync {
    /// Request path, with or without a leading slash.
    fn path(&self) -> &str;

    /// HTTP method verb.
    fn method(&self) -> &str;

    /// Caller address, when the host knows it.
    fn ip(&self) -> Option<&str>;

    /// A single header value, matched case-insensitively.
    fn header(&self, name: &str) -> Option<&str>;

    /// A single URL query parameter.
    fn query(&self, name: &str) -> Option<&str>;

    /// A single request-body field.
    fn body(&self, name: &str) -> Option<&str>;

    /// All request headers.
    fn headers(&self) -> HashMap<String, String>;

    /// All URL query arguments.
    fn query_args(&self) -> HashMap<String, String>;

    /// All request-body fields.
    fn body_fields(&self) -> HashMap<String, String>;
}

/// A plain captured request, the crate-provided [`InboundRequest`] impl.
///
/// Adapters copy what they need out of their framework's request type
/// into one of these; tests build them directly.
#[derive(Debug, Clone, Default)]
pub struct CapturedRequest {
    method: String,
    path: String,
    ip: Option<String>,
    headers: HashMap<String, String>,
    query: HashMap<String, String>,
    body: HashMap<String, String>,
}

impl CapturedRequest {
    /// Create a captured request for the given method and path.
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    /// Record the caller address.
    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self
    }

    /// Record a request header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Record a URL query parameter.
    pub fn with_query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    /// Record a request-body field.
    pub fn with_body_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.body.insert(name.into(), value.into());
        self
    }
}

impl InboundRequest for CapturedRequest {
    fn path(&self) -> &str {
        &self.path
    }

    fn method(&self) -> &str {
        &self.method
    }

    fn ip(&self) -> Option<&str> {
        self.ip.as_deref()
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    fn query(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    fn body(&self, name: &str) -> Option<&str> {
        self.body.get(name).map(String::as_str)
    }

    fn headers(&self) -> HashMap<String, String> {
        self.headers.clone()
    }

    fn query_args(&self) -> HashMap<String, String> {
        self.query.clone()
    }

    fn body_fields(&self) -> HashMap<String, String> {
        self.body.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_populates_fields() {
        let request = CapturedRequest::new("POST", "/api/items")
            .with_ip("203.0.113.9")
            .with_header("apikey", "key_1")
            .with_query_param("page", "2")
            .with_body_field("name", "widget");

        assert_eq!(request.method(), "POST");
        assert_eq!(request.path(), "/api/items");
        assert_eq!(request.ip(), Some("203.0.113.9"));
        assert_eq!(request.header("apikey"), Some("key_1"));
        assert_eq!(request.query("page"), Some("2"));
        assert_eq!(request.body("name"), Some("widget"));
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let request = CapturedRequest::new("GET", "/").with_header("X-Api-Key", "key_1");
        assert_eq!(request.header("x-api-key"), Some("key_1"));
        assert_eq!(request.header("X-API-KEY"), Some("key_1"));
    }

    #[test]
    fn test_missing_lookups_return_none() {
        let request = CapturedRequest::new("GET", "/");
        assert_eq!(request.ip(), None);
        assert_eq!(request.header("apikey"), None);
        assert_eq!(request.query("apikey"), None);
        assert_eq!(request.body("apikey"), None);
    }

    #[test]
    fn test_map_accessors_return_everything() {
        let request = CapturedRequest::new("GET", "/")
            .with_header("a", "1")
            .with_header("b", "2")
            .with_query_param("q", "3");

        assert_eq!(request.headers().len(), 2);
        assert_eq!(request.query_args().len(), 1);
        assert!(request.body_fields().is_empty());
    }
}
