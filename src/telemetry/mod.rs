//! Best-effort telemetry delivery to the Archetype pipeline.

pub mod dispatch;
