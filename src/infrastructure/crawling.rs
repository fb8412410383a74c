//! Search pagination driver
//!
//! Fetches search pages one at a time, in increasing page order, feeding each
//! to the page extractor until the limit is reached, a page brings nothing
//! new, or a fetch fails. A failed fetch is not an error for the caller: the
//! products collected so far are returned with an `Aborted` state.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::product::Product;
use crate::domain::services::{FetchError, FetchedPage, PageFetcher, RequestHeaders};
use crate::domain::session::{CrawlState, QuerySession};
use crate::infrastructure::config::{utils, AppConfig};
use crate::infrastructure::parsing::{PageExtractor, ParseContext};

/// Pagination settings for one crawler
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    pub search_url: String,
    pub headers: RequestHeaders,
    pub max_pages: u32,
    pub delay_min_ms: u64,
    pub delay_max_ms: u64,
}

impl CrawlerConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            search_url: config.market.search_url.clone(),
            headers: config.market.request_headers(),
            max_pages: config.user.max_pages,
            delay_min_ms: config.user.request_delay_min_ms,
            delay_max_ms: config.user.request_delay_max_ms,
        }
    }

    /// Same settings without the pause between requests
    pub fn without_delay(mut self) -> Self {
        self.delay_min_ms = 0;
        self.delay_max_ms = 0;
        self
    }

    /// Random pause in `[delay_min_ms, delay_max_ms]`
    fn next_delay(&self) -> Duration {
        let max = self.delay_max_ms.max(self.delay_min_ms);
        Duration::from_millis(fastrand::u64(self.delay_min_ms..=max))
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self::from_app_config(&AppConfig::default())
    }
}

/// Result of one query's pagination loop
#[derive(Debug, Clone)]
pub struct PaginationOutcome {
    pub products: Vec<Product>,
    pub state: CrawlState,
    /// Page requests issued
    pub pages_fetched: u32,
}

impl PaginationOutcome {
    pub fn is_complete(&self) -> bool {
        self.state == CrawlState::Done
    }
}

/// Drives pagination for search queries
pub struct SearchCrawler {
    fetcher: Arc<dyn PageFetcher>,
    extractor: Arc<PageExtractor>,
    config: CrawlerConfig,
}

impl SearchCrawler {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        extractor: Arc<PageExtractor>,
        config: CrawlerConfig,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            config,
        }
    }

    /// Build a crawler with the parsing settings of the application config
    pub fn from_app_config(fetcher: Arc<dyn PageFetcher>, config: &AppConfig) -> Result<Self> {
        let extractor = PageExtractor::with_config(&config.advanced.parsing)
            .context("Failed to create page extractor")?;

        Ok(Self::new(
            fetcher,
            Arc::new(extractor),
            CrawlerConfig::from_app_config(config),
        ))
    }

    pub fn config(&self) -> &CrawlerConfig {
        &self.config
    }

    /// Collect up to `limit` unique products for `query`
    pub async fn search(&self, query: &str, limit: usize) -> PaginationOutcome {
        self.search_with_cancellation(query, limit, CancellationToken::new())
            .await
    }

    /// Collect up to `limit` unique products, abandoning the query on cancellation
    pub async fn search_with_cancellation(
        &self,
        query: &str,
        limit: usize,
        cancellation_token: CancellationToken,
    ) -> PaginationOutcome {
        let mut session = QuerySession::new(query, limit, self.config.max_pages);
        info!(
            "Starting search '{}' (session {}, limit {}, max pages {})",
            query, session.id, limit, self.config.max_pages
        );

        while session.should_continue() {
            if !self.pause(&cancellation_token).await {
                warn!("Search '{}' cancelled before page {}", query, session.page);
                session.transition(CrawlState::Aborted);
                break;
            }

            let url = match utils::search_page_url(&self.config.search_url, query, session.page) {
                Ok(url) => url,
                Err(e) => {
                    warn!("Cannot build URL for page {}: {:#}", session.page, e);
                    session.transition(CrawlState::Aborted);
                    break;
                }
            };

            session.pages_fetched += 1;
            let page = match self.fetch_page(&url, &cancellation_token).await {
                Ok(page) => page,
                Err(e) => {
                    warn!("Stopping search '{}' at page {}: {}", query, session.page, e);
                    session.transition(CrawlState::Aborted);
                    break;
                }
            };

            session.transition(CrawlState::Extracting);

            // Parse synchronously; the parsed document must not live across an await
            let new_products = {
                let context = ParseContext::new(session.page, session.remaining_capacity());
                self.extractor
                    .extract_document(&page.body, &context, &mut session.seen_titles)
            };

            info!("Page {}: {} new products", session.page, new_products.len());

            if new_products.is_empty() {
                info!("No new products on page {}, results exhausted", session.page);
                session.transition(CrawlState::Done);
                break;
            }

            session.accept_page(new_products);
        }

        let (products, state, pages_fetched) = session.finish();
        info!(
            "Search '{}' finished in state {:?}: {} products from {} pages",
            query,
            state,
            products.len(),
            pages_fetched
        );

        PaginationOutcome {
            products,
            state,
            pages_fetched,
        }
    }

    /// Fetch one page; non-success statuses become errors here
    async fn fetch_page(
        &self,
        url: &str,
        cancellation_token: &CancellationToken,
    ) -> Result<FetchedPage, FetchError> {
        let page = tokio::select! {
            result = self.fetcher.fetch(url, &self.config.headers) => result?,
            _ = cancellation_token.cancelled() => {
                return Err(FetchError::Cancelled { url: url.to_string() });
            }
        };

        if !page.is_success() {
            return Err(FetchError::Status {
                status: page.status,
                url: url.to_string(),
            });
        }

        Ok(page)
    }

    /// Randomized pause before a request; false when cancelled
    async fn pause(&self, cancellation_token: &CancellationToken) -> bool {
        if cancellation_token.is_cancelled() {
            return false;
        }

        let delay = self.config.next_delay();
        if delay.is_zero() {
            return true;
        }

        debug!("Waiting {:?} before next request", delay);
        tokio::select! {
            _ = sleep(delay) => true,
            _ = cancellation_token.cancelled() => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays scripted responses and records requested URLs
    struct ScriptedFetcher {
        responses: Mutex<VecDeque<Result<FetchedPage, FetchError>>>,
        requested: Mutex<Vec<String>>,
    }

    impl ScriptedFetcher {
        fn new(responses: Vec<Result<FetchedPage, FetchError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                requested: Mutex::new(Vec::new()),
            })
        }

        fn requests(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageFetcher for ScriptedFetcher {
        async fn fetch(&self, url: &str, _headers: &RequestHeaders) -> Result<FetchedPage, FetchError> {
            self.requested.lock().unwrap().push(url.to_string());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(FetchedPage::ok("<html><body></body></html>")))
        }
    }

    fn page(titles: &[&str]) -> Result<FetchedPage, FetchError> {
        let cards: String = titles
            .iter()
            .map(|title| {
                format!(
                    r#"<article data-auto="searchOrganic"><span itemprop="name">{title}</span><span>100 ₽</span></article>"#
                )
            })
            .collect();
        Ok(FetchedPage::ok(format!("<html><body>{cards}</body></html>")))
    }

    fn crawler(fetcher: Arc<ScriptedFetcher>, max_pages: u32) -> SearchCrawler {
        let config = CrawlerConfig {
            max_pages,
            ..CrawlerConfig::default().without_delay()
        };
        SearchCrawler::new(fetcher, Arc::new(PageExtractor::new().unwrap()), config)
    }

    fn titles(outcome: &PaginationOutcome) -> Vec<&str> {
        outcome.products.iter().map(|p| p.title.as_str()).collect()
    }

    #[tokio::test]
    async fn test_stops_after_first_page_when_limit_reached() {
        let fetcher = ScriptedFetcher::new(vec![page(&["A", "B", "C", "D", "E", "F"])]);
        let outcome = crawler(fetcher.clone(), 100).search("чайник", 5).await;

        assert_eq!(titles(&outcome), vec!["A", "B", "C", "D", "E"]);
        assert_eq!(outcome.state, CrawlState::Done);
        assert_eq!(fetcher.requests().len(), 1);
        assert!(fetcher.requests()[0].contains("page=1"));
    }

    #[tokio::test]
    async fn test_failed_second_page_returns_partial_results() {
        let fetcher = ScriptedFetcher::new(vec![
            page(&["A", "B"]),
            Err(FetchError::Timeout {
                url: "page 2".to_string(),
            }),
        ]);
        let outcome = crawler(fetcher.clone(), 100).search("чайник", 5).await;

        assert_eq!(titles(&outcome), vec!["A", "B"]);
        assert_eq!(outcome.state, CrawlState::Aborted);
        assert_eq!(outcome.pages_fetched, 2);
    }

    #[tokio::test]
    async fn test_non_success_status_aborts() {
        let fetcher = ScriptedFetcher::new(vec![
            page(&["A"]),
            Ok(FetchedPage {
                status: 503,
                body: String::new(),
            }),
            page(&["B"]),
        ]);
        let outcome = crawler(fetcher.clone(), 100).search("чайник", 5).await;

        assert_eq!(titles(&outcome), vec!["A"]);
        assert_eq!(outcome.state, CrawlState::Aborted);
        assert_eq!(fetcher.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_stops_on_page_without_new_products() {
        let fetcher = ScriptedFetcher::new(vec![
            page(&["A", "B"]),
            page(&["A", "B"]),
            page(&["C"]),
        ]);
        let outcome = crawler(fetcher.clone(), 100).search("чайник", 10).await;

        assert_eq!(titles(&outcome), vec!["A", "B"]);
        assert!(outcome.is_complete());
        assert_eq!(fetcher.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_never_exceeds_max_pages() {
        let fetcher = ScriptedFetcher::new(vec![
            page(&["A"]),
            page(&["B"]),
            page(&["C"]),
            page(&["D"]),
        ]);
        let outcome = crawler(fetcher.clone(), 3).search("чайник", 10).await;

        assert_eq!(titles(&outcome), vec!["A", "B", "C"]);
        assert_eq!(outcome.state, CrawlState::Done);
        assert_eq!(outcome.pages_fetched, 3);
        assert_eq!(fetcher.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_titles_are_unique_across_pages() {
        let fetcher = ScriptedFetcher::new(vec![page(&["A", "B"]), page(&["B", "C", "A", "D"])]);
        let outcome = crawler(fetcher, 100).search("чайник", 4).await;

        assert_eq!(titles(&outcome), vec!["A", "B", "C", "D"]);
    }

    #[tokio::test]
    async fn test_cancelled_query_fetches_nothing() {
        let fetcher = ScriptedFetcher::new(vec![page(&["A"])]);
        let token = CancellationToken::new();
        token.cancel();

        let outcome = crawler(fetcher.clone(), 100)
            .search_with_cancellation("чайник", 5, token)
            .await;

        assert!(outcome.products.is_empty());
        assert_eq!(outcome.state, CrawlState::Aborted);
        assert!(fetcher.requests().is_empty());
    }

    #[tokio::test]
    async fn test_query_is_encoded_into_page_urls() {
        let fetcher = ScriptedFetcher::new(vec![page(&["A"]), page(&[])]);
        crawler(fetcher.clone(), 100).search("red kettle", 5).await;

        let requests = fetcher.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].contains("text=red+kettle"));
        assert!(requests[1].contains("page=2"));
    }

    #[test]
    fn test_delay_stays_within_bounds() {
        let config = CrawlerConfig {
            delay_min_ms: 500,
            delay_max_ms: 1500,
            ..CrawlerConfig::default()
        };
        for _ in 0..50 {
            let delay = config.next_delay();
            assert!(delay >= Duration::from_millis(500) && delay <= Duration::from_millis(1500));
        }
        assert!(config.clone().without_delay().next_delay().is_zero());
    }
}
