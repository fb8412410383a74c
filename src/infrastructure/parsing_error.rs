//! Parsing error types for search-result extraction
//!
//! Card-level problems are reported through these types and then downgraded
//! to skips; none of them is allowed to abort a page or a query.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParsingError {
    #[error("Required field '{field}' not found in card {card_index}")]
    RequiredFieldMissing { field: String, card_index: usize },

    #[error("Duplicate title '{title}' in card {card_index}")]
    DuplicateTitle { title: String, card_index: usize },

    #[error("Invalid CSS selector: {selector} - {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Invalid pattern: {pattern} - {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Payload block {block_index} could not be decoded: {reason}")]
    PayloadDecodeFailed { block_index: usize, reason: String },

    #[error("Payload field '{field}' has unexpected type: expected {expected}, got {found}")]
    PayloadTypeMismatch {
        field: String,
        expected: String,
        found: String,
    },
}

impl ParsingError {
    /// Create a required field missing error
    pub fn required_field_missing(field: &str, card_index: usize) -> Self {
        Self::RequiredFieldMissing {
            field: field.to_string(),
            card_index,
        }
    }

    /// Create an invalid selector error
    pub fn invalid_selector(selector: &str, reason: impl ToString) -> Self {
        Self::InvalidSelector {
            selector: selector.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a payload type mismatch error
    pub fn payload_type_mismatch(field: &str, expected: &str, found: &str) -> Self {
        Self::PayloadTypeMismatch {
            field: field.to_string(),
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }
}

pub type ParsingResult<T> = Result<T, ParsingError>;
