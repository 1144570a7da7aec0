use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

use crate::core::aggregate;
use crate::models::{Loaded, Market, MarketReviews, Review, SessionUser};
use crate::services::storage::{load_json_list, next_id, now_iso, record_id, save_json_list, StorageError};

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;

/// Errors that can occur when changing reviews
#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("Отзыв не найден.")]
    NotFound(i64),

    #[error("Ошибка: можно удалять только свои отзывы.")]
    Forbidden,

    #[error("Ошибка: rating должен быть целым числом от 1 до 5.")]
    InvalidRating(i64),

    #[error("Ошибка: закончились свободные идентификаторы отзывов.")]
    IdsExhausted,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Review collection backed by `reviews.json`
///
/// Every successful mutation rewrites the whole file, including records that
/// could not be read. Ids come from a counter that starts above the largest
/// stored id, readable or not, and only moves forward.
#[derive(Debug)]
pub struct ReviewStore {
    path: PathBuf,
    reviews: Vec<Review>,
    unreadable: Vec<Value>,
    next_id: Option<u64>,
}

impl ReviewStore {
    /// Load reviews from disk, creating an empty file when it is missing
    pub fn load(path: &Path) -> Result<Self, StorageError> {
        let loaded = load_json_list::<Review>(path)?;
        tracing::info!("Loaded {} reviews from {}", loaded.items.len(), path.display());

        Ok(Self::from_loaded(path, loaded))
    }

    /// Wrap an in-memory collection persisted to `path`
    pub fn with_reviews(path: &Path, reviews: Vec<Review>) -> Self {
        Self::from_loaded(
            path,
            Loaded {
                items: reviews,
                unreadable: Vec::new(),
            },
        )
    }

    fn from_loaded(path: &Path, loaded: Loaded<Review>) -> Self {
        let ids = loaded.items.iter().map(|r| r.id);
        let next_id = next_id(ids.chain(loaded.unreadable.iter().filter_map(record_id)));

        Self {
            path: path.to_path_buf(),
            reviews: loaded.items,
            unreadable: loaded.unreadable,
            next_id,
        }
    }

    pub fn reviews(&self) -> &[Review] {
        &self.reviews
    }

    pub fn len(&self) -> usize {
        self.reviews.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reviews.is_empty()
    }

    /// Stored records that are kept on disk but could not be read
    pub fn unreadable(&self) -> &[Value] {
        &self.unreadable
    }

    /// Reviews of one market, newest first, with its live rating summary
    pub fn for_market<'a>(&'a self, market: &'a Market) -> MarketReviews<'a> {
        let mut reviews: Vec<&Review> = self
            .reviews
            .iter()
            .filter(|r| r.market_id == Some(market.id))
            .collect();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        MarketReviews {
            market,
            stats: aggregate(&self.reviews).get(market.id),
            reviews,
        }
    }

    /// Append a review by `author` and persist the collection
    ///
    /// The caller is responsible for checking that the market exists.
    pub fn add(&mut self, market_id: u64, author: &SessionUser, rating: i64, text: &str) -> Result<&Review, ReviewError> {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(ReviewError::InvalidRating(rating));
        }
        let id = self.next_id.ok_or(ReviewError::IdsExhausted)?;

        let review = Review {
            id,
            market_id: Some(market_id),
            user_id: author.id,
            login: author.login.clone(),
            rating: Some(rating),
            text: text.trim().to_string(),
            created_at: now_iso(),
        };

        self.reviews.push(review);
        if let Err(e) = save_json_list(&self.path, &self.reviews, &self.unreadable) {
            self.reviews.pop();
            tracing::error!("Failed to save reviews: {}", e);
            return Err(e.into());
        }
        self.next_id = id.checked_add(1);

        let review = &self.reviews[self.reviews.len() - 1];
        tracing::info!("Review {} added to market {} by {}", review.id, market_id, author.login);
        Ok(review)
    }

    /// Remove a review owned by `requester` and persist the collection
    ///
    /// Rejected deletions leave both memory and the file untouched.
    pub fn delete(&mut self, review_id: i64, requester: &SessionUser) -> Result<Review, ReviewError> {
        let index = u64::try_from(review_id)
            .ok()
            .and_then(|id| self.reviews.iter().position(|r| r.id == id))
            .ok_or(ReviewError::NotFound(review_id))?;

        if self.reviews[index].user_id != requester.id {
            tracing::debug!("User {} may not delete review {}", requester.id, review_id);
            return Err(ReviewError::Forbidden);
        }

        let removed = self.reviews.remove(index);
        if let Err(e) = save_json_list(&self.path, &self.reviews, &self.unreadable) {
            self.reviews.insert(index, removed);
            tracing::error!("Failed to save reviews: {}", e);
            return Err(e.into());
        }

        tracing::info!("Review {} deleted by {}", removed.id, requester.login);
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn author(id: u64) -> SessionUser {
        SessionUser {
            id,
            login: format!("user{id}"),
        }
    }

    #[test]
    fn test_add_assigns_increasing_ids_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reviews.json");
        let mut store = ReviewStore::load(&path).unwrap();

        assert_eq!(store.add(10, &author(1), 5, " great ").unwrap().id, 0);
        assert_eq!(store.add(10, &author(1), 4, "").unwrap().id, 1);

        let reloaded = ReviewStore::load(&path).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.reviews()[0].text, "great");
        assert_eq!(reloaded.reviews()[0].login, "user1");
    }

    #[test]
    fn test_ids_are_not_reused_after_delete() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ReviewStore::load(&dir.path().join("reviews.json")).unwrap();

        store.add(10, &author(1), 5, "").unwrap();
        let last = store.add(10, &author(1), 5, "").unwrap().id;
        store.delete(last as i64, &author(1)).unwrap();

        assert_eq!(store.add(10, &author(1), 5, "").unwrap().id, last + 1);
    }

    #[test]
    fn test_unreadable_records_survive_rewrite_and_reserve_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reviews.json");
        fs::write(
            &path,
            r#"[
  {"id": 0, "market_id": 1, "user_id": 1, "login": "user1", "rating": 5},
  {"id": 1, "market_id": 1, "user_id": null, "login": "legacy", "rating": 4}
]"#,
        )
        .unwrap();
        let mut store = ReviewStore::load(&path).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.unreadable().len(), 1);

        let id = store.add(1, &author(2), 3, "").unwrap().id;
        assert_eq!(id, 2);

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("legacy"));

        store.delete(0, &author(1)).unwrap();
        let reloaded = ReviewStore::load(&path).unwrap();
        assert_eq!(reloaded.reviews().iter().map(|r| r.id).collect::<Vec<_>>(), vec![2]);
        assert_eq!(reloaded.unreadable().len(), 1);
    }

    #[test]
    fn test_exhausted_ids_are_rejected_without_rewrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reviews.json");
        fs::write(&path, r#"[{"id": 18446744073709551615, "market_id": 1, "user_id": 1, "rating": 5}]"#).unwrap();
        let mut store = ReviewStore::load(&path).unwrap();
        let before = fs::read_to_string(&path).unwrap();

        assert!(matches!(store.add(1, &author(1), 4, ""), Err(ReviewError::IdsExhausted)));
        assert_eq!(store.len(), 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn test_rating_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ReviewStore::load(&dir.path().join("reviews.json")).unwrap();

        assert!(matches!(store.add(10, &author(1), 0, ""), Err(ReviewError::InvalidRating(0))));
        assert!(matches!(store.add(10, &author(1), 6, ""), Err(ReviewError::InvalidRating(6))));
        assert!(store.is_empty());
    }

    #[test]
    fn test_delete_foreign_review_is_rejected_without_rewrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reviews.json");
        let mut store = ReviewStore::load(&path).unwrap();
        store.add(10, &author(1), 5, "mine").unwrap();
        let before = fs::read_to_string(&path).unwrap();

        assert!(matches!(store.delete(0, &author(2)), Err(ReviewError::Forbidden)));
        assert!(matches!(store.delete(99, &author(1)), Err(ReviewError::NotFound(99))));
        assert_eq!(store.len(), 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn test_for_market_orders_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let market = Market::new(10, "M", "C", "S", "1", None, None);
        let review = |id: u64, market_id: u64, rating: i64, created_at: &str| Review {
            id,
            market_id: Some(market_id),
            user_id: 1,
            login: "user1".to_string(),
            rating: Some(rating),
            text: String::new(),
            created_at: created_at.to_string(),
        };
        let store = ReviewStore::with_reviews(
            &dir.path().join("reviews.json"),
            vec![
                review(0, 10, 5, "2024-01-01T00:00:00Z"),
                review(1, 11, 1, "2024-06-01T00:00:00Z"),
                review(2, 10, 2, "2024-03-01T00:00:00Z"),
            ],
        );

        let view = store.for_market(&market);

        assert_eq!(view.reviews.iter().map(|r| r.id).collect::<Vec<_>>(), vec![2, 0]);
        assert_eq!(view.stats.count, 2);
        assert_eq!(view.stats.avg, Some(3.5));
    }
}
