use std::collections::HashMap;

use crate::core::distance::round2;
use crate::models::{RatingStats, Review};

/// Per-market rating aggregates computed from the live review collection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RatingIndex {
    stats: HashMap<u64, RatingStats>,
    skipped: usize,
}

impl RatingIndex {
    /// Stats for a market; markets without valid reviews report `{count: 0, avg: None}`
    pub fn get(&self, market_id: u64) -> RatingStats {
        self.stats.get(&market_id).copied().unwrap_or_default()
    }

    /// Number of reviews ignored because `market_id` or `rating` was malformed
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Number of markets with at least one valid review
    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }
}

/// Reduce reviews into per-market count and average rating
///
/// Reviews whose `market_id` or `rating` could not be read as integers are
/// skipped and counted. Averages are rounded to two decimals.
pub fn aggregate(reviews: &[Review]) -> RatingIndex {
    // i128 so that extreme stored ratings cannot overflow the sum
    let mut sums: HashMap<u64, (usize, i128)> = HashMap::new();
    let mut skipped = 0;

    for review in reviews {
        let (Some(market_id), Some(rating)) = (review.market_id, review.rating) else {
            skipped += 1;
            continue;
        };

        let entry = sums.entry(market_id).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += i128::from(rating);
    }

    if skipped > 0 {
        tracing::debug!("Skipped {} malformed reviews during rating aggregation", skipped);
    }

    let stats = sums
        .into_iter()
        .map(|(market_id, (count, sum))| {
            let avg = (count > 0).then(|| round2(sum as f64 / count as f64));
            (market_id, RatingStats { count, avg })
        })
        .collect();

    RatingIndex { stats, skipped }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(id: u64, market_id: Option<u64>, rating: Option<i64>) -> Review {
        Review {
            id,
            market_id,
            user_id: 0,
            login: "ivan".to_string(),
            rating,
            text: String::new(),
            created_at: String::new(),
        }
    }

    #[test]
    fn test_aggregate_average() {
        let index = aggregate(&[review(0, Some(1), Some(5)), review(1, Some(1), Some(3))]);

        assert_eq!(index.get(1), RatingStats { count: 2, avg: Some(4.0) });
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_aggregate_rounds_to_two_decimals() {
        let index = aggregate(&[
            review(0, Some(7), Some(5)),
            review(1, Some(7), Some(5)),
            review(2, Some(7), Some(4)),
        ]);

        assert_eq!(index.get(7).avg, Some(4.67));
    }

    #[test]
    fn test_missing_market_defaults_to_empty() {
        let index = aggregate(&[]);

        assert_eq!(index.get(42), RatingStats { count: 0, avg: None });
        assert!(index.is_empty());
    }

    #[test]
    fn test_malformed_reviews_are_skipped_and_counted() {
        let index = aggregate(&[
            review(0, Some(1), Some(4)),
            review(1, None, Some(1)),
            review(2, Some(1), None),
        ]);

        assert_eq!(index.get(1), RatingStats { count: 1, avg: Some(4.0) });
        assert_eq!(index.skipped(), 2);
    }

    #[test]
    fn test_extreme_stored_ratings_do_not_overflow() {
        let index = aggregate(&[
            review(0, Some(3), Some(i64::MAX)),
            review(1, Some(3), Some(i64::MAX)),
            review(2, Some(3), Some(i64::MIN)),
            review(3, Some(3), Some(i64::MIN)),
        ]);

        assert_eq!(index.get(3), RatingStats { count: 4, avg: Some(-0.5) });
    }
}
