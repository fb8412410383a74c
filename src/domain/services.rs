//! Domain services
//!
//! Ports the core depends on without knowing their implementation.

pub mod crawling_services;

pub use crawling_services::{FetchError, FetchedPage, PageFetcher, RequestHeaders};
