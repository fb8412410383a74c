//! Crawling service ports
//!
//! The pagination driver only knows these traits; the network transport that
//! implements them lives in the infrastructure layer.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fixed header set sent with every search page request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestHeaders {
    pub user_agent: String,
    pub accept_language: String,
    pub referer: String,
}

impl RequestHeaders {
    /// Header name/value pairs in request order
    pub fn pairs(&self) -> [(&'static str, &str); 3] {
        [
            ("User-Agent", self.user_agent.as_str()),
            ("Accept-Language", self.accept_language.as_str()),
            ("Referer", self.referer.as_str()),
        ]
    }
}

/// Raw result of a page fetch
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: u16,
    pub body: String,
}

impl FetchedPage {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

#[derive(Error, Debug, Clone)]
pub enum FetchError {
    #[error("Transport failure for {url}: {message}")]
    Transport { url: String, message: String },

    #[error("Request timed out: {url}")]
    Timeout { url: String },

    #[error("HTTP request failed with status {status}: {url}")]
    Status { status: u16, url: String },

    #[error("Request cancelled: {url}")]
    Cancelled { url: String },
}

/// Transport capability used to obtain search pages
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch one page; non-success statuses are returned, not raised
    async fn fetch(&self, url: &str, headers: &RequestHeaders) -> Result<FetchedPage, FetchError>;
}
