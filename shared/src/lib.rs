//! Shared types for the POS service
//!
//! Domain models, request payloads and the unified error system used by
//! `pos-server` and by anything that talks to its HTTP API.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use rust_decimal::Decimal;
pub use serde::{Deserialize, Serialize};
