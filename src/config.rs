//! Archetype configuration and environment selection.

use crate::ArchetypeError;
use std::time::Duration;

/// Default timeout applied to every remote call.
///
/// The Archetype API itself imposes no deadline, so the client bounds
/// each call to avoid stalling the request path it gates.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// The Archetype environment a secret key belongs to.
///
/// Selected purely from the `secret_key` prefix at construction time and
/// fixed for the lifetime of the client. `sk_test` is checked first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Test-mode keys (`sk_test...`).
    Test,
    /// Production keys (`sk_prod...`).
    Production,
}

impl Environment {
    /// Resolve the environment from a secret key.
    ///
    /// # Errors
    /// Returns `InvalidSecretKey` when the key matches neither prefix.
    pub fn from_secret_key(secret_key: &str) -> Result<Self, ArchetypeError> {
        if secret_key.contains("sk_test") {
            Ok(Self::Test)
        } else if secret_key.contains("sk_prod") {
            Ok(Self::Production)
        } else {
            Err(ArchetypeError::InvalidSecretKey)
        }
    }

    /// Base endpoint for all SDK calls in this environment.
    pub fn base_endpoint(&self) -> &'static str {
        match self {
            Self::Test => "https://test.archetype.dev",
            Self::Production => "https://api.archetype.dev",
        }
    }
}

/// Configuration for the Archetype SDK.
///
/// Construct once at startup and hand to [`crate::Archetype::new`]. The
/// struct is immutable after construction; there is no process-wide
/// credential state.
#[derive(Debug, Clone)]
pub struct ArchetypeConfig {
    /// The `app_id` of your Archetype application.
    pub app_id: String,

    /// The `secret_key` of your Archetype application.
    ///
    /// The prefix selects the environment: keys containing `sk_test` hit
    /// the test endpoint, keys containing `sk_prod` hit production.
    pub secret_key: String,

    /// Whether inbound requests should be authorized via Archetype.
    ///
    /// The SDK never attaches itself to a server; host adapters consult
    /// this toggle when deciding to wire [`crate::Archetype::authenticate`]
    /// into their middleware chain.
    pub authorize_requests: bool,

    /// Timeout applied to each remote call.
    pub timeout: Duration,
}

impl ArchetypeConfig {
    /// Create a configuration with default toggle and timeout.
    pub fn new(app_id: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            secret_key: secret_key.into(),
            authorize_requests: true,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Load configuration from the environment.
    ///
    /// Reads `ARCHETYPE_APP_ID`, `ARCHETYPE_SECRET_KEY`, and the optional
    /// `ARCHETYPE_AUTHORIZING_VIA_ARCHETYPE` flag (defaults to on).
    ///
    /// # Errors
    /// Returns `CredentialsNotConfigured` when either credential variable
    /// is missing or empty, `InvalidSecretKey` on a bad prefix.
    pub fn from_env() -> Result<Self, ArchetypeError> {
        let app_id = std::env::var("ARCHETYPE_APP_ID").unwrap_or_default();
        let secret_key = std::env::var("ARCHETYPE_SECRET_KEY").unwrap_or_default();
        let authorize_requests = std::env::var("ARCHETYPE_AUTHORIZING_VIA_ARCHETYPE")
            .map(|v| env_flag(&v))
            .unwrap_or(true);

        let config = Self {
            app_id,
            secret_key,
            authorize_requests,
            timeout: DEFAULT_TIMEOUT,
        };
        config.validate()?;
        Ok(config)
    }

    /// Override the per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the middleware auto-attach toggle.
    pub fn with_authorization(mut self, authorize_requests: bool) -> Self {
        self.authorize_requests = authorize_requests;
        self
    }

    /// Validate configuration for obvious errors.
    ///
    /// # Errors
    /// Returns `CredentialsNotConfigured` if either credential is empty,
    /// `InvalidSecretKey` if the key prefix is unrecognized.
    pub fn validate(&self) -> Result<(), ArchetypeError> {
        if self.app_id.is_empty() || self.secret_key.is_empty() {
            return Err(ArchetypeError::CredentialsNotConfigured);
        }
        self.environment().map(|_| ())
    }

    /// The environment this configuration's secret key selects.
    ///
    /// # Errors
    /// Returns `InvalidSecretKey` when the prefix is unrecognized.
    pub fn environment(&self) -> Result<Environment, ArchetypeError> {
        Environment::from_secret_key(&self.secret_key)
    }
}

/// Interpret an environment flag value; anything but an explicit off is on.
fn env_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "off" | "no"
    )
}
