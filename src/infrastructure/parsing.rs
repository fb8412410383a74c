//! HTML parsing infrastructure for search-result pages
//!
//! Extraction is layered: each card's embedded structured payload is read
//! first, then markup heuristics fill whatever fields are still missing.
//! Failures are contained at the card boundary.

pub mod card_extractor;
pub mod config;
pub mod context;
pub mod error;
pub mod markup_fallback;
pub mod page_extractor;
pub mod payload;
pub mod structured_extractor;

// Re-export public types
pub use card_extractor::{CardExtractor, ExtractionResult};
pub use config::{FallbackConfig, ParsingConfig, SearchCardSelectors};
pub use context::{CardContext, ParseContext};
pub use error::{ParsingError, ParsingResult};
pub use markup_fallback::MarkupFallbackExtractor;
pub use page_extractor::PageExtractor;
pub use payload::PayloadValue;
pub use structured_extractor::{StructuredFields, StructuredPayloadExtractor};

use scraper::{ElementRef, Selector};

/// Compile one CSS selector, reporting failures as a parsing error
pub fn compile_selector(selector: &str) -> ParsingResult<Selector> {
    Selector::parse(selector).map_err(|e| ParsingError::invalid_selector(selector, e))
}

/// Compile selectors in priority order; any invalid selector is an error
pub fn compile_selectors(selectors: &[String]) -> ParsingResult<Vec<Selector>> {
    selectors.iter().map(|s| compile_selector(s)).collect()
}

/// Text of an element with every text node trimmed and blank nodes dropped
pub fn stripped_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn test_stripped_text_joins_trimmed_nodes() {
        let html = Html::parse_fragment("<span>  Цвет: <b> Красный </b>\n</span>");
        let selector = compile_selector("span").unwrap();
        let span = html.select(&selector).next().unwrap();

        assert_eq!(stripped_text(&span), "Цвет:Красный");
    }

    #[test]
    fn test_invalid_selector_is_reported() {
        let err = compile_selector("article[data-auto=").unwrap_err();
        assert!(matches!(err, ParsingError::InvalidSelector { .. }));
    }

    #[test]
    fn test_compile_selectors_keeps_order() {
        let selectors = compile_selectors(&["noframes".to_string(), "script".to_string()]).unwrap();
        assert_eq!(selectors.len(), 2);
    }
}
