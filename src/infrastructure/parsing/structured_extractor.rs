//! Structured payload extraction
//!
//! Search cards embed JSON "patches" describing their widgets. The payload is
//! expected to look like `{"widgets": {<widget>: {<entry>: {...}}}}`, where an
//! entry may carry `title`, `price` and `specs`. Scalar fields are taken from
//! the first entry that provides them; `specs` are accumulated from every
//! entry, without deduplication.
//!
//! Containers that are not mappings are passed over. A field that is present
//! with the wrong type fails the whole card with `PayloadTypeMismatch`.

use scraper::{ElementRef, Selector};
use serde_json::Value;
use tracing::debug;

use super::config::SearchCardSelectors;
use super::payload::PayloadValue;
use super::{compile_selectors, CardContext, ParsingError, ParsingResult};
use crate::domain::product::Characteristic;

/// Currency used when a payload price does not name one
pub const DEFAULT_CURRENCY: &str = "RUR";

fn type_mismatch(field: &str, expected: &str, value: PayloadValue<'_>) -> ParsingError {
    ParsingError::payload_type_mismatch(field, expected, value.kind())
}

/// Field of a mapping, with explicit `null` read as absent
fn present<'a>(entry: PayloadValue<'a>, key: &str) -> Option<PayloadValue<'a>> {
    entry.get(key).filter(|v| !v.is_null())
}

/// Fields recovered from a card's structured payload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuredFields {
    pub title: Option<String>,
    pub price: Option<String>,
    pub characteristics: Vec<Characteristic>,
}

impl StructuredFields {
    /// Merge one decoded payload document
    pub fn absorb_document(&mut self, document: PayloadValue<'_>) -> ParsingResult<()> {
        let Some(widgets) = document.get("widgets") else {
            return Ok(());
        };

        for widget in widgets.mapping_values() {
            for entry in widget.mapping_values().filter(|e| e.is_mapping()) {
                self.absorb_entry(entry)?;
            }
        }

        Ok(())
    }

    fn absorb_entry(&mut self, entry: PayloadValue<'_>) -> ParsingResult<()> {
        if self.title.is_none() {
            if let Some(title) = present(entry, "title") {
                let text = title
                    .as_str()
                    .ok_or_else(|| type_mismatch("title", "string", title))?;
                if !text.is_empty() {
                    self.title = Some(text.to_string());
                }
            }
        }

        if self.price.is_none() {
            if let Some(price) = present(entry, "price") {
                self.price = format_price(price)?;
            }
        }

        if let Some(specs) = present(entry, "specs") {
            if !specs.is_sequence() {
                return Err(type_mismatch("specs", "sequence", specs));
            }
            for spec in specs.sequence() {
                if !spec.is_mapping() {
                    return Err(type_mismatch("specs[]", "mapping", spec));
                }
                let Some(name) = present(spec, "name") else {
                    continue;
                };
                let name = name
                    .as_str()
                    .ok_or_else(|| type_mismatch("specs[].name", "string", name))?;
                let value = spec
                    .get("value")
                    .and_then(PayloadValue::to_display_text)
                    .unwrap_or_default();
                self.characteristics.push(Characteristic::new(name, value));
            }
        }

        Ok(())
    }
}

/// Render a payload price mapping as `"<value> <currency>"`
fn format_price(price: PayloadValue<'_>) -> ParsingResult<Option<String>> {
    if !price.is_mapping() {
        return Err(type_mismatch("price", "mapping", price));
    }

    let Some(value) = present(price, "value") else {
        return Ok(None);
    };
    if value.as_str().is_none() && !value.is_number() {
        return Err(type_mismatch("price.value", "number or string", value));
    }
    if !value.is_meaningful() {
        return Ok(None);
    }

    let amount = value.to_display_text();
    let currency = price
        .get("currency")
        .and_then(PayloadValue::to_display_text)
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

    Ok(amount.map(|amount| format!("{amount} {currency}")))
}

/// Decode one payload block
pub fn decode_block(block_index: usize, raw: &str) -> ParsingResult<Value> {
    serde_json::from_str(raw.trim()).map_err(|e| ParsingError::PayloadDecodeFailed {
        block_index,
        reason: e.to_string(),
    })
}

/// Reads embedded JSON payloads of a search card
pub struct StructuredPayloadExtractor {
    /// Payload container selectors in priority order
    payload_containers: Vec<Selector>,
}

impl StructuredPayloadExtractor {
    /// Create an extractor with default selectors
    pub fn new() -> ParsingResult<Self> {
        Self::with_config(&SearchCardSelectors::default())
    }

    /// Create an extractor with custom selector configuration
    pub fn with_config(selectors: &SearchCardSelectors) -> ParsingResult<Self> {
        Ok(Self {
            payload_containers: compile_selectors(&selectors.payload_containers)?,
        })
    }

    /// Extract title, price and specs
    ///
    /// Missing data stays empty and undecodable blocks are skipped; only a
    /// mistyped field is an error.
    pub fn extract(
        &self,
        card: &ElementRef<'_>,
        context: &CardContext,
    ) -> ParsingResult<StructuredFields> {
        let mut fields = StructuredFields::default();

        for (block_index, block) in self.locate_blocks(card).iter().enumerate() {
            let raw: String = block.text().collect();
            if raw.trim().is_empty() {
                continue;
            }

            match decode_block(block_index, &raw) {
                Ok(document) => fields.absorb_document(PayloadValue::new(&document))?,
                Err(e) => debug!(
                    "Skipping payload block on page {} card {}: {}",
                    context.page, context.index, e
                ),
            }
        }

        Ok(fields)
    }

    /// Blocks of the first container kind that matches anything in the card
    fn locate_blocks<'a>(&self, card: &ElementRef<'a>) -> Vec<ElementRef<'a>> {
        self.payload_containers
            .iter()
            .map(|selector| card.select(selector).collect::<Vec<_>>())
            .find(|blocks| !blocks.is_empty())
            .unwrap_or_default()
    }
}
