//! Market Search - product search over paginated marketplace listings
//!
//! Fetches search-result pages, extracts product cards from their embedded
//! payloads (falling back to markup heuristics) and serves the results
//! through a CLI and a small HTTP API.

// Module declarations
pub mod application;
pub mod commands;
pub mod domain;
pub mod infrastructure;

pub use application::{SearchError, SearchService};
pub use domain::{Product, SearchRequest, SearchResponse};
