//! Wire-facing data model for the Archetype API.

pub mod models;
