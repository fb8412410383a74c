//! Application layer
//!
//! Validates inbound queries and runs them through the pagination driver.

pub mod search_service;

pub use search_service::{SearchError, SearchService};
