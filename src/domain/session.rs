//! Per-query pagination session state
//!
//! A `QuerySession` lives for exactly one query: it is created when the
//! pagination loop starts, mutated once per page and dropped with the loop.
//! Nothing in here is shared between queries.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::product::Product;

/// State of the pagination loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrawlState {
    Fetching,
    Extracting,
    Done,
    Aborted,
}

impl CrawlState {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Aborted)
    }
}

/// Titles already emitted during one query
#[derive(Debug, Clone, Default)]
pub struct SeenTitles(HashSet<String>);

impl SeenTitles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, title: &str) -> bool {
        self.0.contains(title)
    }

    /// Register a title; returns false when it was already present
    pub fn register(&mut self, title: &str) -> bool {
        if self.0.contains(title) {
            return false;
        }
        self.0.insert(title.to_string())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Mutable state of one query's pagination loop
#[derive(Debug)]
pub struct QuerySession {
    pub id: Uuid,
    pub query: String,
    pub limit: usize,
    pub page: u32,
    pub max_pages: u32,
    pub pages_fetched: u32,
    pub seen_titles: SeenTitles,
    pub products: Vec<Product>,
    pub state: CrawlState,
}

impl QuerySession {
    pub fn new(query: impl Into<String>, limit: usize, max_pages: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            query: query.into(),
            limit,
            page: 1,
            max_pages,
            pages_fetched: 0,
            seen_titles: SeenTitles::new(),
            products: Vec::new(),
            state: CrawlState::Fetching,
        }
    }

    pub fn collected(&self) -> usize {
        self.products.len()
    }

    pub fn remaining_capacity(&self) -> usize {
        self.limit.saturating_sub(self.products.len())
    }

    /// Loop condition: more products wanted and page bound not yet passed
    pub fn should_continue(&self) -> bool {
        !self.state.is_terminal() && self.collected() < self.limit && self.page <= self.max_pages
    }

    pub fn transition(&mut self, next: CrawlState) {
        tracing::trace!(session = %self.id, from = ?self.state, to = ?next, "session state transition");
        self.state = next;
    }

    /// Append the products of one page and move on to the next page
    pub fn accept_page(&mut self, products: Vec<Product>) {
        self.products.extend(products);
        self.page += 1;
        self.transition(CrawlState::Fetching);
    }

    /// Finish the session, yielding products truncated to the limit
    pub fn finish(mut self) -> (Vec<Product>, CrawlState, u32) {
        if !self.state.is_terminal() {
            self.state = CrawlState::Done;
        }
        self.products.truncate(self.limit);
        (self.products, self.state, self.pages_fetched)
    }
}
