use serde_json::Value;

use crate::models::domain::{Market, RatingStats, Review};

/// Reviews of one market, newest first, with the market's rating summary
#[derive(Debug, Clone, PartialEq)]
pub struct MarketReviews<'a> {
    pub market: &'a Market,
    pub stats: RatingStats,
    pub reviews: Vec<&'a Review>,
}

/// Outcome of loading a collection: parsed records plus the raw ones that did not parse
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<T> {
    pub items: Vec<T>,
    pub unreadable: Vec<Value>,
}

impl<T> Loaded<T> {
    /// Number of records left out of `items`
    pub fn skipped(&self) -> usize {
        self.unreadable.len()
    }
}

impl<T> Default for Loaded<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            unreadable: Vec::new(),
        }
    }
}
