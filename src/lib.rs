//! # Archetype
//!
//! **[Archetype](https://archetype.dev) API-key authorization and usage
//! telemetry for Rust web services.**
//!
//! Archetype meters, bills, and gates access to your API. This SDK
//! authenticates inbound requests against Archetype's authorize
//! endpoint, streams per-request usage telemetry to its pipeline, and
//! wraps the account-management endpoints (tiers, users, checkout
//! sessions, subscription cancellation).
//!
//! ## Features
//!
//! - **API-key authorization** — keys are accepted from a header, query
//!   parameter, or body field (header wins) and verified remotely
//! - **Best-effort telemetry** — audit records are dispatched on a
//!   detached task; a pipeline outage never slows or fails a request
//! - **Framework-neutral** — implement [`InboundRequest`] once per
//!   framework adapter; the gateway logic never sees framework types
//! - **Typed errors** — every denial reason is a distinct
//!   [`ArchetypeError`] variant carrying its HTTP status
//! - **Environment selection** — `sk_test`/`sk_prod` key prefixes pick
//!   the test or production endpoint, nothing else to configure
//!
//! ## Quickstart
//!
//! ```no_run
//! use archetype::{Archetype, ArchetypeConfig, CapturedRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), archetype::ArchetypeError> {
//!     let config = ArchetypeConfig::new("your-app-id", "sk_prod_your_key");
//!     let gateway = Archetype::new(config)?;
//!
//!     // Adapt your framework's request type into a CapturedRequest
//!     let request = CapturedRequest::new("GET", "/api/reports")
//!         .with_ip("203.0.113.9")
//!         .with_header("apikey", "caller-supplied-key");
//!
//!     match gateway.authenticate(&request).await {
//!         Ok(outcome) => println!("authorized ({})", outcome.status_code),
//!         Err(e) => eprintln!("denied: {e}"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Request flow
//!
//! `authenticate` extracts the caller's key, POSTs it to the authorize
//! endpoint, and returns the outcome. Authorization blocks the request
//! path; the audit record is sent to the pipeline afterwards on a
//! detached task, with failures logged and swallowed. Requests with no
//! key anywhere are rejected before any network call.
//!
//! ## Configuration
//!
//! - `app_id` — your Archetype application id
//! - `secret_key` — your secret key; the prefix selects the environment
//! - `authorize_requests` — whether host adapters should attach the
//!   authentication guard (default on)
//! - `timeout` — bound on every remote call (default 10 seconds)
//!
//! See [`ArchetypeConfig`] for full documentation, including the
//! `ARCHETYPE_*` environment-variable loader.

#![deny(warnings)]
#![deny(missing_docs)]
#![doc(html_root_url = "https://docs.rs/archetype/0.1.0")]

// Core modules
pub mod clock;
pub mod config;
pub mod errors;

// Inbound request abstraction
pub mod request;

// Protocol layer
pub mod protocol;

// Client layer
pub mod client;

// Telemetry layer
pub mod telemetry;

// Manager (main public API)
pub mod manager;

// Re-exports for public API
pub use clock::{Clock, SystemClock};
pub use config::{ArchetypeConfig, Environment};
pub use errors::ArchetypeError;
pub use manager::Archetype;
pub use protocol::models::{
    AuthorizationOutcome, CheckoutSession, CredentialProbe, TelemetryRecord,
};
pub use request::{CapturedRequest, InboundRequest};
pub use telemetry::dispatch::TelemetryDispatcher;

#[cfg(any(test, feature = "test-seams"))]
pub use clock::MockClock;
