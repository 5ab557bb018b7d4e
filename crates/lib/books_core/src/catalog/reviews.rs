//! Review operations. Reviews are not cached.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use crate::models::{NewReview, Review, ReviewEdit};
use crate::store::{ReviewStore, StoreError};

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct ReviewOperator {
    store: Arc<dyn ReviewStore>,
}

impl ReviewOperator {
    pub fn new(store: Arc<dyn ReviewStore>) -> Self {
        Self { store }
    }

    /// Persist a new review stamped with the current time.
    pub async fn create_review(&self, review: &NewReview) -> Result<Review, ReviewError> {
        Ok(self.store.create_review(review, Utc::now()).await?)
    }

    pub async fn get_review(&self, id: &str) -> Result<Review, ReviewError> {
        Ok(self.store.get_review(id).await?)
    }

    pub async fn get_reviews_of_book(
        &self,
        book_id: i64,
        keyword: &str,
    ) -> Result<Vec<Review>, ReviewError> {
        Ok(self.store.get_reviews_of_book(book_id, keyword).await?)
    }

    /// Replace title and content. Both must be non-empty.
    pub async fn update_review(&self, id: &str, edit: &ReviewEdit) -> Result<Review, ReviewError> {
        if edit.title.is_empty() {
            return Err(ReviewError::Validation("title is required".into()));
        }
        if edit.content.is_empty() {
            return Err(ReviewError::Validation("content is required".into()));
        }
        Ok(self.store.update_review(id, edit, Utc::now()).await?)
    }

    pub async fn delete_review(&self, id: &str) -> Result<(), ReviewError> {
        Ok(self.store.delete_review(id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn operator() -> ReviewOperator {
        ReviewOperator::new(Arc::new(MemoryStore::default()))
    }

    fn review(book_id: i64, title: &str, content: &str) -> NewReview {
        NewReview {
            book_id,
            author: "reader".into(),
            title: title.into(),
            content: content.into(),
        }
    }

    #[tokio::test]
    async fn create_stamps_both_timestamps() {
        let op = operator();
        let created = op.create_review(&review(1, "Great", "Loved it")).await.unwrap();

        assert!(!created.id.is_empty());
        assert_eq!(created.created_at, created.updated_at);
        assert_eq!(op.get_review(&created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn update_rejects_empty_fields() {
        let op = operator();
        let created = op.create_review(&review(1, "Great", "Loved it")).await.unwrap();

        let err = op
            .update_review(
                &created.id,
                &ReviewEdit {
                    title: String::new(),
                    content: "x".into(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ReviewError::Validation(_)));

        let err = op
            .update_review(
                &created.id,
                &ReviewEdit {
                    title: "x".into(),
                    content: String::new(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ReviewError::Validation(_)));
    }

    #[tokio::test]
    async fn update_refreshes_updated_at() {
        let op = operator();
        let created = op.create_review(&review(1, "Great", "Loved it")).await.unwrap();

        let updated = op
            .update_review(
                &created.id,
                &ReviewEdit {
                    title: "Fine".into(),
                    content: "It was ok".into(),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "Fine");
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn listing_filters_by_keyword() {
        let op = operator();
        op.create_review(&review(1, "Great", "Loved it")).await.unwrap();
        op.create_review(&review(1, "Meh", "great pacing though")).await.unwrap();
        op.create_review(&review(1, "Bad", "no")).await.unwrap();
        op.create_review(&review(2, "Great", "other book")).await.unwrap();

        assert_eq!(op.get_reviews_of_book(1, "").await.unwrap().len(), 3);
        assert_eq!(op.get_reviews_of_book(1, "GREAT").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn deleted_review_is_not_found() {
        let op = operator();
        let created = op.create_review(&review(1, "Great", "Loved it")).await.unwrap();
        op.delete_review(&created.id).await.unwrap();

        let err = op.get_review(&created.id).await.unwrap_err();
        assert!(matches!(err, ReviewError::Store(StoreError::NotFound(_))));
    }
}
