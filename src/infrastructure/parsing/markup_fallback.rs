//! Markup heuristics for fields missing from the structured payload
//!
//! Each heuristic is independent; the card extractor only calls the ones
//! whose field is still empty.

use std::collections::HashMap;

use regex::Regex;
use scraper::{ElementRef, Selector};
use tracing::trace;

use super::config::FallbackConfig;
use super::{compile_selector, stripped_text, ParsingError, ParsingResult};
use crate::domain::product::Characteristic;

/// Elements whose text is never rendered
const NON_RENDERED_ELEMENTS: &[&str] = &["script", "noframes", "style"];

pub struct MarkupFallbackExtractor {
    title: Selector,
    price_pattern: Regex,
    attribute_span: Selector,
    attribute_class_marker: String,
    max_label_chars: usize,
}

impl MarkupFallbackExtractor {
    pub fn new() -> ParsingResult<Self> {
        Self::with_config(&FallbackConfig::default())
    }

    pub fn with_config(config: &FallbackConfig) -> ParsingResult<Self> {
        let price_pattern =
            Regex::new(&config.price_pattern).map_err(|e| ParsingError::InvalidPattern {
                pattern: config.price_pattern.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            title: compile_selector(&config.title)?,
            price_pattern,
            attribute_span: compile_selector(&config.attribute_span)?,
            attribute_class_marker: config.attribute_class_marker.clone(),
            max_label_chars: config.max_label_chars,
        })
    }

    /// Text of the first element marked as the product name
    pub fn extract_title(&self, card: &ElementRef<'_>) -> Option<String> {
        card.select(&self.title)
            .next()
            .map(|element| stripped_text(&element))
            .filter(|title| !title.is_empty())
    }

    /// First price-looking substring of any rendered text node
    pub fn extract_price(&self, card: &ElementRef<'_>) -> Option<String> {
        card.descendants()
            .filter(|node| {
                !node.ancestors().any(|ancestor| {
                    ancestor
                        .value()
                        .as_element()
                        .is_some_and(|element| NON_RENDERED_ELEMENTS.contains(&element.name()))
                })
            })
            .filter_map(|node| node.value().as_text().map(|text| &**text))
            .find_map(|text| self.price_pattern.find(text))
            .map(|m| m.as_str().trim().to_string())
    }

    /// Label/value pairs from adjacent styled spans, deduplicated by label
    pub fn extract_characteristics(&self, card: &ElementRef<'_>) -> Vec<Characteristic> {
        let texts: Vec<String> = card
            .select(&self.attribute_span)
            .filter(|span| self.has_class_marker(span))
            .map(|span| stripped_text(&span))
            .collect();

        let pairs = texts.windows(2).filter_map(|pair| {
            let (label, value) = (&pair[0], &pair[1]);
            let name = self.normalize_label(label)?;
            if value.is_empty() {
                return None;
            }
            trace!("Attribute pair candidate: {} = {}", name, value);
            Some((name, value.clone()))
        });

        dedup_by_label_last_wins(pairs)
    }

    fn has_class_marker(&self, span: &ElementRef<'_>) -> bool {
        span.value()
            .classes()
            .any(|class| class.contains(self.attribute_class_marker.as_str()))
    }

    /// Label part of `"Name:"` style text; `None` when the text is not a label
    fn normalize_label(&self, text: &str) -> Option<String> {
        if !text.contains(':') || text.chars().count() >= self.max_label_chars {
            return None;
        }

        let name = text.split(':').next().unwrap_or_default().trim();
        (!name.is_empty()).then(|| name.to_string())
    }
}

/// Keeps each label at its first position with the value of its last occurrence
fn dedup_by_label_last_wins(pairs: impl IntoIterator<Item = (String, String)>) -> Vec<Characteristic> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut characteristics: Vec<Characteristic> = Vec::new();

    for (name, value) in pairs {
        match positions.get(&name) {
            Some(&index) => characteristics[index].value = value,
            None => {
                positions.insert(name.clone(), characteristics.len());
                characteristics.push(Characteristic::new(name, value));
            }
        }
    }

    characteristics
}
