//! Per-card extraction
//!
//! Combines the structured payload with the markup heuristics field by field
//! and turns the result into a `Product`. A card that cannot produce a new,
//! titled product, or whose payload is mistyped, is reported as skipped,
//! never as a failure.

use scraper::ElementRef;
use tracing::debug;

use super::config::ParsingConfig;
use super::{
    CardContext, MarkupFallbackExtractor, ParsingError, ParsingResult, StructuredPayloadExtractor,
};
use crate::domain::product::Product;
use crate::domain::session::SeenTitles;

/// Outcome of extracting one card
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionResult {
    Extracted(Product),
    Skipped(ParsingError),
}

impl ExtractionResult {
    pub fn into_product(self) -> Option<Product> {
        match self {
            Self::Extracted(product) => Some(product),
            Self::Skipped(_) => None,
        }
    }
}

pub struct CardExtractor {
    structured: StructuredPayloadExtractor,
    fallback: MarkupFallbackExtractor,
}

impl CardExtractor {
    pub fn new() -> ParsingResult<Self> {
        Self::with_config(&ParsingConfig::default())
    }

    pub fn with_config(config: &ParsingConfig) -> ParsingResult<Self> {
        Ok(Self {
            structured: StructuredPayloadExtractor::with_config(&config.card_selectors)?,
            fallback: MarkupFallbackExtractor::with_config(&config.fallback)?,
        })
    }

    /// Extract one card; the title is registered in `seen` only on success
    pub fn extract(
        &self,
        card: &ElementRef<'_>,
        seen: &mut SeenTitles,
        context: CardContext,
    ) -> ExtractionResult {
        let fields = match self.structured.extract(card, &context) {
            Ok(fields) => fields,
            Err(e) => return ExtractionResult::Skipped(e),
        };

        let Some(title) = fields.title.or_else(|| self.fallback.extract_title(card)) else {
            return ExtractionResult::Skipped(ParsingError::required_field_missing(
                "title",
                context.index,
            ));
        };

        if !seen.register(&title) {
            return ExtractionResult::Skipped(ParsingError::DuplicateTitle {
                title,
                card_index: context.index,
            });
        }

        let price = fields.price.or_else(|| self.fallback.extract_price(card));

        let characteristics = if fields.characteristics.is_empty() {
            self.fallback.extract_characteristics(card)
        } else {
            fields.characteristics
        };

        debug!(
            "Extracted card {} on page {}: '{}' ({} characteristics)",
            context.index,
            context.page,
            title,
            characteristics.len()
        );

        ExtractionResult::Extracted(Product {
            title,
            price,
            characteristics,
        })
    }
}
