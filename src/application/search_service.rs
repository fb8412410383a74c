//! Search use case
//!
//! The only place where a query can be rejected: input is validated before
//! the pipeline runs, and everything after that yields a response, even an
//! empty one.

use std::sync::Arc;

use anyhow::{Context, Result};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::domain::product::{SearchRequest, SearchResponse};
use crate::domain::session::CrawlState;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::crawling::SearchCrawler;
use crate::infrastructure::http_client::{HttpClient, HttpClientConfig};

/// Rejections of malformed search input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("limit must be a positive integer, got {0}")]
    InvalidLimit(i64),
}

/// Runs validated search queries through the pagination driver
#[derive(Clone)]
pub struct SearchService {
    crawler: Arc<SearchCrawler>,
}

impl SearchService {
    pub fn new(crawler: Arc<SearchCrawler>) -> Self {
        Self { crawler }
    }

    /// Wire the HTTP transport and extractor from application configuration
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let http_client = HttpClient::new(HttpClientConfig::from(&config.advanced))
            .context("Failed to create HTTP client")?;
        let crawler = SearchCrawler::from_app_config(Arc::new(http_client), config)?;

        Ok(Self::new(Arc::new(crawler)))
    }

    /// Validate a raw limit into a product count
    pub fn validate_limit(limit: i64) -> Result<usize, SearchError> {
        usize::try_from(limit)
            .ok()
            .filter(|&limit| limit > 0)
            .ok_or(SearchError::InvalidLimit(limit))
    }

    pub async fn search(&self, request: SearchRequest) -> Result<SearchResponse, SearchError> {
        self.search_with_cancellation(request, CancellationToken::new())
            .await
    }

    /// Run a query; scraping failures only shorten the product list
    pub async fn search_with_cancellation(
        &self,
        request: SearchRequest,
        cancellation_token: CancellationToken,
    ) -> Result<SearchResponse, SearchError> {
        let limit = Self::validate_limit(request.limit)?;

        let outcome = self
            .crawler
            .search_with_cancellation(&request.query, limit, cancellation_token)
            .await;

        if outcome.state == CrawlState::Aborted {
            warn!(
                "Search '{}' returned partial results ({} of {})",
                request.query,
                outcome.products.len(),
                limit
            );
        } else {
            info!(
                "Search '{}' returned {} products",
                request.query,
                outcome.products.len()
            );
        }

        Ok(SearchResponse {
            query: request.query,
            products: outcome.products,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::services::{FetchError, FetchedPage, PageFetcher, RequestHeaders};
    use crate::infrastructure::crawling::CrawlerConfig;
    use crate::infrastructure::parsing::PageExtractor;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves the same page for every request
    struct FixedPageFetcher {
        body: String,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PageFetcher for FixedPageFetcher {
        async fn fetch(&self, _url: &str, _headers: &RequestHeaders) -> Result<FetchedPage, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(FetchedPage::ok(self.body.clone()))
        }
    }

    fn service(body: &str) -> (SearchService, Arc<FixedPageFetcher>) {
        let fetcher = Arc::new(FixedPageFetcher {
            body: body.to_string(),
            calls: AtomicUsize::new(0),
        });
        let crawler = SearchCrawler::new(
            fetcher.clone(),
            Arc::new(PageExtractor::new().unwrap()),
            CrawlerConfig::default().without_delay(),
        );
        (SearchService::new(Arc::new(crawler)), fetcher)
    }

    #[test]
    fn test_validate_limit() {
        assert_eq!(SearchService::validate_limit(5), Ok(5));
        assert_eq!(SearchService::validate_limit(0), Err(SearchError::InvalidLimit(0)));
        assert_eq!(SearchService::validate_limit(-3), Err(SearchError::InvalidLimit(-3)));
    }

    #[tokio::test]
    async fn test_invalid_limit_is_rejected_before_fetching() {
        let (service, fetcher) = service("<html></html>");

        let result = service.search(SearchRequest::new("чайник", 0)).await;

        assert_eq!(result, Err(SearchError::InvalidLimit(0)));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_results_are_a_valid_response() {
        let (service, fetcher) = service("<html><body>Ничего не нашлось</body></html>");

        let response = service.search(SearchRequest::new("чайник", 5)).await.unwrap();

        assert_eq!(response.query, "чайник");
        assert!(response.products.is_empty());
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_response_keeps_discovery_order() {
        let (service, _) = service(
            r#"<html><body>
                <article data-auto="searchOrganic"><span itemprop="name">Б</span></article>
                <article data-auto="searchOrganic"><span itemprop="name">А</span></article>
            </body></html>"#,
        );

        let response = service.search(SearchRequest::new("чайник", 5)).await.unwrap();
        let titles: Vec<_> = response.products.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Б", "А"]);
    }
}
