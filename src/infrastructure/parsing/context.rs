//! Parsing context for search-result extraction
//!
//! Provides context objects carried through one page and one card.

/// Context information for parsing one fetched page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseContext {
    /// Page number being parsed (1-based)
    pub page: u32,

    /// Products still wanted by the query; extraction stops once reached
    pub remaining_capacity: usize,
}

impl ParseContext {
    pub const fn new(page: u32, remaining_capacity: usize) -> Self {
        Self {
            page,
            remaining_capacity,
        }
    }

    /// Context for one card of this page
    pub const fn card(&self, index: usize) -> CardContext {
        CardContext {
            page: self.page,
            index,
        }
    }
}

/// Position of a card, used for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardContext {
    pub page: u32,
    pub index: usize,
}

impl CardContext {
    pub const fn new(page: u32, index: usize) -> Self {
        Self { page, index }
    }
}
