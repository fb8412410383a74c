//! Infrastructure layer: configuration, logging, HTML parsing, HTTP transport
//! and the pagination driver.

pub mod config; // Configuration file and defaults
pub mod crawling; // Pagination driver
pub mod http_client; // reqwest transport implementing PageFetcher
pub mod logging; // Logging infrastructure
pub mod parsing; // Search-result extraction pipeline
pub mod parsing_error; // Parsing error types

// Re-export commonly used items
pub use config::{AppConfig, ConfigManager};
pub use crawling::{CrawlerConfig, PaginationOutcome, SearchCrawler};
pub use http_client::{HttpClient, HttpClientConfig};
pub use logging::{get_log_directory, init_logging, init_logging_with_config};
pub use parsing::{PageExtractor, ParsingConfig, ParsingError, ParsingResult};
