//! Book and review operations.
//!
//! [`BookOperator`] puts a cache-aside layer in front of the paginated book
//! listing. Keyword searches always go to storage; plain offset pages are read
//! from the cache and populated on a miss. Entries expire with the cache TTL
//! and are never invalidated by book mutations.

pub mod reviews;

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::cache::{CacheError, CacheHelper};
use crate::models::{Book, BookPatch, NewBook};
use crate::store::{BookStore, StoreError};

pub use reviews::{ReviewError, ReviewOperator};

/// Key prefix of cached listing pages.
pub const BOOKS_KEY: &str = "lr-books";

/// Errors from book operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Cache key of the listing page starting at `offset`.
pub fn listing_key(offset: u32) -> String {
    format!("{BOOKS_KEY}-{offset}")
}

/// Book operations over a [`BookStore`], with cached listings.
#[derive(Clone)]
pub struct BookOperator {
    store: Arc<dyn BookStore>,
    cache: Arc<dyn CacheHelper>,
}

impl BookOperator {
    pub fn new(store: Arc<dyn BookStore>, cache: Arc<dyn CacheHelper>) -> Self {
        Self { store, cache }
    }

    /// One listing page.
    ///
    /// A non-empty `query` bypasses the cache entirely. Otherwise the page is
    /// served from `lr-books-{offset}` when present; on a miss it is read from
    /// storage and written back before returning. A cached value that does not
    /// decode is an error, not a miss.
    pub async fn get_books(&self, offset: u32, query: &str) -> Result<Vec<Book>, CatalogError> {
        if !query.is_empty() {
            return Ok(self.store.get_books(offset, query).await?);
        }

        let key = listing_key(offset);
        if let Some(cached) = self.cache.load(&key).await?
            && !cached.is_empty()
        {
            debug!(%key, "listing cache hit");
            return serde_json::from_str(&cached).map_err(|e| CacheError::Decode(e).into());
        }

        debug!(%key, "listing cache miss");
        let books = self.store.get_books(offset, "").await?;
        let encoded = serde_json::to_string(&books).map_err(CacheError::Encode)?;
        self.cache.save(&key, &encoded).await?;
        Ok(books)
    }

    pub async fn create_book(&self, book: &NewBook) -> Result<Book, CatalogError> {
        Ok(self.store.create_book(book).await?)
    }

    pub async fn get_book(&self, id: i64) -> Result<Book, CatalogError> {
        Ok(self.store.get_book(id).await?)
    }

    pub async fn update_book(&self, id: i64, patch: &BookPatch) -> Result<Book, CatalogError> {
        Ok(self.store.update_book(id, patch).await?)
    }

    pub async fn delete_book(&self, id: i64) -> Result<(), CatalogError> {
        Ok(self.store.delete_book(id).await?)
    }
}
