//! Search commands served over HTTP
//!
//! Only malformed input produces an error status; scraping problems show up
//! as a shorter (possibly empty) product list in a 200 response.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::application::search_service::{SearchError, SearchService};
use crate::domain::product::{SearchRequest, SearchResponse};

/// Shared state for request handlers
#[derive(Clone)]
pub struct ApiState {
    pub search_service: SearchService,
    /// Limit used when a request does not name one
    pub default_limit: usize,
}

/// Query string of `GET /search`
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
    pub limit: Option<i64>,
}

impl SearchParams {
    pub fn into_request(self, default_limit: usize) -> SearchRequest {
        let default_limit = i64::try_from(default_limit).unwrap_or(i64::MAX);
        SearchRequest::new(self.q, self.limit.unwrap_or(default_limit))
    }
}

/// Error body returned for rejected requests
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Rejection of a search request
#[derive(Debug)]
pub struct ApiError(SearchError);

impl From<SearchError> for ApiError {
    fn from(error: SearchError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            SearchError::InvalidLimit(_) => StatusCode::UNPROCESSABLE_ENTITY,
        };
        let body = ErrorBody {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Serialize)]
struct HealthStatus {
    status: &'static str,
    version: &'static str,
}

/// Build the HTTP router
pub fn router(search_service: SearchService, default_limit: usize) -> Router {
    Router::new()
        .route("/search", get(search_products))
        .route("/health", get(health))
        .with_state(ApiState {
            search_service,
            default_limit,
        })
}

/// Search products matching `q`
pub async fn search_products(
    State(state): State<ApiState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    info!("🔍 Search request: q='{}', limit={:?}", params.q, params.limit);

    let response = state
        .search_service
        .search(params.into_request(state.default_limit))
        .await
        .inspect_err(|e| warn!("Rejected search request: {}", e))?;

    Ok(Json(response))
}

async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::services::{FetchError, FetchedPage, PageFetcher, RequestHeaders};
    use crate::infrastructure::crawling::{CrawlerConfig, SearchCrawler};
    use crate::infrastructure::parsing::PageExtractor;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use std::sync::Arc;
    use tower::ServiceExt;

    struct CatalogFetcher;

    #[async_trait]
    impl PageFetcher for CatalogFetcher {
        async fn fetch(&self, url: &str, _headers: &RequestHeaders) -> Result<FetchedPage, FetchError> {
            if !url.contains("page=1") {
                return Ok(FetchedPage::ok("<html><body></body></html>"));
            }
            let cards: String = ["Чайник", "Тостер", "Миксер"]
                .iter()
                .map(|title| {
                    format!(
                        r#"<article data-auto="searchOrganic"><noframes data-apiary="patch">{{"widgets": {{"w": {{"e": {{"title": "{title}", "price": {{"value": 1999}}}}}}}}}}</noframes></article>"#
                    )
                })
                .collect();
            Ok(FetchedPage::ok(format!("<html><body>{cards}</body></html>")))
        }
    }

    fn app() -> Router {
        app_with_default_limit(5)
    }

    fn app_with_default_limit(default_limit: usize) -> Router {
        let crawler = SearchCrawler::new(
            Arc::new(CatalogFetcher),
            Arc::new(PageExtractor::new().unwrap()),
            CrawlerConfig::default().without_delay(),
        );
        router(SearchService::new(Arc::new(crawler)), default_limit)
    }

    async fn get_json(uri: &str) -> (StatusCode, serde_json::Value) {
        get_json_from(app(), uri).await
    }

    async fn get_json_from(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null))
    }

    #[tokio::test]
    async fn test_search_returns_products() {
        let (status, body) = get_json("/search?q=kitchen&limit=2").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["query"], "kitchen");
        assert_eq!(body["products"].as_array().unwrap().len(), 2);
        assert_eq!(body["products"][0]["title"], "Чайник");
        assert_eq!(body["products"][0]["price"], "1999 RUR");
        assert_eq!(body["products"][1]["title"], "Тостер");
    }

    #[tokio::test]
    async fn test_search_default_limit() {
        let (status, body) = get_json("/search?q=kitchen").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["products"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_configured_default_limit() {
        let (status, body) = get_json_from(app_with_default_limit(1), "/search?q=kitchen").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["products"].as_array().unwrap().len(), 1);
        assert_eq!(body["products"][0]["title"], "Чайник");
    }

    #[tokio::test]
    async fn test_non_positive_limit_is_unprocessable() {
        let (status, body) = get_json("/search?q=kitchen&limit=0").await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().contains("limit"));
    }

    #[tokio::test]
    async fn test_missing_query_is_bad_request() {
        let (status, _) = get_json("/search?limit=3").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get_json("/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }
}
