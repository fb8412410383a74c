//! Domain module - Core entities and ports
//!
//! This module contains the product records produced by a search, the
//! per-query session state, and the service ports the core depends on.
//!
//! Modern Rust module organization (Rust 2018+ style):
//! - Each module is its own file in the domain/ directory
//! - Public exports are defined here for convenience

pub mod product;
pub mod services;
pub mod session;

// Re-export commonly used items for convenience
pub use product::{Characteristic, Product, SearchRequest, SearchResponse};
pub use services::{FetchError, FetchedPage, PageFetcher, RequestHeaders};
pub use session::{CrawlState, QuerySession, SeenTitles};
