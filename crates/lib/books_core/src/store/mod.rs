//! Storage collaborators.
//!
//! The operators only see these traits. Each backing technology gets its own
//! implementation: [`PgStore`] (relational: books, users), [`PgDocumentStore`]
//! (document: reviews as JSONB) and [`MemoryStore`] (everything, in-process).

pub mod documents;
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{Book, BookPatch, NewBook, NewReview, NewUser, Review, ReviewEdit, User};

pub use documents::PgDocumentStore;
pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Number of books per listing page when no size is configured.
pub const DEFAULT_PAGE_SIZE: u32 = 5;

/// Storage errors. Backend-specific codes are not interpreted beyond these.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("Document decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Books, kept in the relational store.
#[async_trait]
pub trait BookStore: Send + Sync {
    async fn create_book(&self, book: &NewBook) -> Result<Book, StoreError>;

    async fn get_book(&self, id: i64) -> Result<Book, StoreError>;

    /// One page of books starting at `offset`. A non-empty `keyword` filters on
    /// title or author (case-insensitive substring).
    async fn get_books(&self, offset: u32, keyword: &str) -> Result<Vec<Book>, StoreError>;

    async fn update_book(&self, id: i64, patch: &BookPatch) -> Result<Book, StoreError>;

    async fn delete_book(&self, id: i64) -> Result<(), StoreError>;
}

/// Reviews, kept in the document store.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    async fn create_review(
        &self,
        review: &NewReview,
        created_at: DateTime<Utc>,
    ) -> Result<Review, StoreError>;

    async fn get_review(&self, id: &str) -> Result<Review, StoreError>;

    /// Reviews of a book. A non-empty `keyword` filters on title or content
    /// (case-insensitive substring).
    async fn get_reviews_of_book(
        &self,
        book_id: i64,
        keyword: &str,
    ) -> Result<Vec<Review>, StoreError>;

    async fn update_review(
        &self,
        id: &str,
        edit: &ReviewEdit,
        updated_at: DateTime<Utc>,
    ) -> Result<Review, StoreError>;

    async fn delete_review(&self, id: &str) -> Result<(), StoreError>;
}

/// Users, kept in the relational store.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user. Fails with [`StoreError::Constraint`] on a duplicate email.
    async fn create_user(&self, user: &NewUser) -> Result<User, StoreError>;

    async fn get_user_by_email(&self, email: &str) -> Result<User, StoreError>;
}

/// `%keyword%` pattern for `ILIKE`, with LIKE wildcards in the keyword escaped.
pub(crate) fn like_pattern(keyword: &str) -> String {
    let escaped = keyword
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

/// Case-insensitive substring match used by the in-memory backend.
pub(crate) fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("rust"), "%rust%");
        assert_eq!(like_pattern("100%_sure"), "%100\\%\\_sure%");
    }

    #[test]
    fn contains_ci_ignores_case() {
        assert!(contains_ci("The Rust Book", "rUsT"));
        assert!(!contains_ci("The Rust Book", "go"));
    }
}
