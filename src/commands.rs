//! HTTP command surface
//!
//! - `GET /search?q=<query>&limit=<n>` runs a search (limit defaults to 5)
//! - `GET /health` reports liveness

pub mod search_commands;

pub use search_commands::{router, ApiError, ApiState, SearchParams};
