//! Parsing configuration for search-result extraction
//!
//! Centralized configuration for CSS selectors and text patterns.

use serde::{Deserialize, Serialize};

/// Main parsing configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsingConfig {
    /// Search card selectors
    pub card_selectors: SearchCardSelectors,

    /// Markup heuristics used when the structured payload is incomplete
    pub fallback: FallbackConfig,
}

/// CSS selectors for search-result pages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchCardSelectors {
    /// Selector for one organic result card
    pub card_container: String,

    /// Payload containers, in priority order; the first one that matches wins
    pub payload_containers: Vec<String>,
}

impl Default for SearchCardSelectors {
    fn default() -> Self {
        Self {
            card_container: "article[data-auto='searchOrganic']".to_string(),
            payload_containers: vec![
                "noframes[data-apiary='patch']".to_string(),
                "script[type='application/json']".to_string(),
            ],
        }
    }
}

/// Selectors and patterns for the markup heuristics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    /// Element carrying the product name
    pub title: String,

    /// Price pattern searched in rendered text nodes
    pub price_pattern: String,

    /// Inline elements considered for label/value pairs
    pub attribute_span: String,

    /// Class marker an attribute element must carry (substring of a class token)
    pub attribute_class_marker: String,

    /// Labels must be shorter than this many characters
    pub max_label_chars: usize,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            title: "span[itemprop='name']".to_string(),
            price_pattern: r"\d+\s*₽".to_string(),
            attribute_span: "span".to_string(),
            attribute_class_marker: "ds-text".to_string(),
            max_label_chars: 50,
        }
    }
}
