//! Page-level extraction
//!
//! Walks the organic result cards of one fetched page in document order and
//! collects new products until the remaining capacity is reached.

use scraper::{Html, Selector};
use tracing::{debug, info};

use super::config::ParsingConfig;
use super::{compile_selector, CardExtractor, ExtractionResult, ParseContext, ParsingResult};
use crate::domain::product::Product;
use crate::domain::session::SeenTitles;

pub struct PageExtractor {
    card_container: Selector,
    card_extractor: CardExtractor,
}

impl PageExtractor {
    /// Create a page extractor with default selectors
    pub fn new() -> ParsingResult<Self> {
        Self::with_config(&ParsingConfig::default())
    }

    pub fn with_config(config: &ParsingConfig) -> ParsingResult<Self> {
        Ok(Self {
            card_container: compile_selector(&config.card_selectors.card_container)?,
            card_extractor: CardExtractor::with_config(config)?,
        })
    }

    /// Extract at most `context.remaining_capacity` new products.
    ///
    /// An empty result means the page contributed nothing new, which the
    /// pagination loop treats as the end of the results.
    pub fn extract_page(
        &self,
        html: &Html,
        context: &ParseContext,
        seen: &mut SeenTitles,
    ) -> Vec<Product> {
        let mut products = Vec::new();
        let mut cards_seen = 0usize;
        let mut skipped = 0usize;

        for (index, card) in html.select(&self.card_container).enumerate() {
            if products.len() >= context.remaining_capacity {
                debug!(
                    "Capacity {} reached on page {}, leaving remaining cards",
                    context.remaining_capacity, context.page
                );
                break;
            }
            cards_seen += 1;

            match self.card_extractor.extract(&card, seen, context.card(index)) {
                ExtractionResult::Extracted(product) => products.push(product),
                ExtractionResult::Skipped(reason) => {
                    skipped += 1;
                    debug!("Skipping card {} on page {}: {}", index, context.page, reason);
                }
            }
        }

        info!(
            "Page {}: {} new products from {} cards ({} skipped)",
            context.page,
            products.len(),
            cards_seen,
            skipped
        );

        products
    }

    /// Parse raw HTML and extract; parsing never fails, malformed markup is repaired
    pub fn extract_document(
        &self,
        body: &str,
        context: &ParseContext,
        seen: &mut SeenTitles,
    ) -> Vec<Product> {
        let html = Html::parse_document(body);
        self.extract_page(&html, context, seen)
    }
}
