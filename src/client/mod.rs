//! HTTP client layer for the Archetype API.

pub mod http;
