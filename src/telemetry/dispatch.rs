//! Fire-and-forget dispatch of telemetry records.
//!
//! Telemetry is best-effort: a pipeline outage must never slow down or
//! abort the request being served. The dispatcher runs each send on a
//! detached task and logs failures instead of propagating them.

use crate::client::http::ArchetypeClient;
use crate::protocol::models::TelemetryRecord;
use crate::ArchetypeError;
use std::sync::Arc;

/// Dispatches telemetry records to the pipeline endpoint.
pub struct TelemetryDispatcher {
    client: Arc<ArchetypeClient>,
}

impl TelemetryDispatcher {
    /// Create a dispatcher over a shared client.
    pub fn new(client: Arc<ArchetypeClient>) -> Self {
        Self { client }
    }

    /// Send a record and wait for the pipeline's answer.
    ///
    /// # Errors
    /// Status and transport errors surface to the caller; use
    /// [`dispatch`](Self::dispatch) on the request path instead.
    pub async fn send(&self, record: &TelemetryRecord) -> Result<(), ArchetypeError> {
        self.client.send_telemetry(record).await
    }

    /// Dispatch a record on a detached task.
    ///
    /// Delivery failures are logged and swallowed. The returned handle
    /// can be awaited when completion matters; dropping it leaves the
    /// task running to completion in the background.
    ///
    /// # Panics
    /// Panics when called outside a tokio runtime, as `tokio::spawn`
    /// does.
    pub fn dispatch(&self, record: TelemetryRecord) -> tokio::task::JoinHandle<()> {
        let client = Arc::clone(&self.client);
        tokio::spawn(async move {
            if let Err(error) = client.send_telemetry(&record).await {
                tracing::warn!(error = %error, "telemetry delivery failed");
            }
        })
    }
}
