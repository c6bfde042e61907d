//! Archetype error types.

use thiserror::Error;

/// HTTP statuses the Archetype API treats as success.
///
/// The API accepts the full registered 2xx set rather than using a
/// blanket `is_success` check, so the list is spelled out.
const SUCCESS_STATUSES: [u16; 10] = [200, 201, 202, 203, 204, 205, 206, 207, 208, 226];

/// Errors that can occur while authorizing requests or calling Archetype.
#[derive(Debug, Error)]
pub enum ArchetypeError {
    /// No API key was found in the request header, query, or body.
    #[error("no apikey supplied, pass it as a query or body parameter or as a header")]
    MissingApiKey,

    /// The `app_id` or `secret_key` configuration field is empty.
    #[error("app_id and secret_key are not configured")]
    CredentialsNotConfigured,

    /// The `secret_key` does not match a recognized environment prefix.
    #[error("secret_key is not valid")]
    InvalidSecretKey,

    /// The remote rejected the request with 400.
    #[error("quota or rate limit exceeded")]
    QuotaExceeded,

    /// The remote rejected the request with 401.
    #[error("no access to this endpoint")]
    AccessDenied,

    /// The remote rejected the request with 403.
    #[error("the supplied apikey is invalid or expired")]
    ApiKeyRejected,

    /// The remote rejected the request with 404.
    #[error("the endpoint you're trying to access doesn't exist")]
    EndpointNotFound,

    /// The remote returned some other non-success status.
    #[error("request denied with status {status}")]
    Denied {
        /// The HTTP status code the remote returned.
        status: u16,
    },

    /// Transport failure communicating with Archetype (DNS/connect/timeout).
    #[error("could not connect to Archetype: {0}")]
    Transport(String),

    /// Failed to parse an Archetype response body.
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl ArchetypeError {
    /// Map an HTTP status code to an error, or `None` for success statuses.
    ///
    /// Implements the fixed Archetype status table: 400 is quota/rate
    /// limiting, 401 is endpoint access, 403 is a bad or expired key,
    /// 404 is an unknown endpoint, and anything else outside 200-208/226
    /// is a generic denial carrying the status.
    pub fn from_status(status: u16) -> Option<Self> {
        match status {
            400 => Some(Self::QuotaExceeded),
            401 => Some(Self::AccessDenied),
            403 => Some(Self::ApiKeyRejected),
            404 => Some(Self::EndpointNotFound),
            s if SUCCESS_STATUSES.contains(&s) => None,
            s => Some(Self::Denied { status: s }),
        }
    }

    /// The HTTP status code behind this error, where one applies.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::QuotaExceeded => Some(400),
            Self::AccessDenied => Some(401),
            Self::ApiKeyRejected => Some(403),
            Self::EndpointNotFound => Some(404),
            Self::Denied { status } => Some(*status),
            _ => None,
        }
    }
}
