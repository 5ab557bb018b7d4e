//! In-process store for local runs and tests.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use super::{
    BookStore, DEFAULT_PAGE_SIZE, ReviewStore, StoreError, UserStore, contains_ci,
};
use crate::models::{Book, BookPatch, NewBook, NewReview, NewUser, Review, ReviewEdit, User};
use crate::uuid::uuidv7;

/// DashMap-backed implementation of every storage collaborator.
#[derive(Debug)]
pub struct MemoryStore {
    page_size: u32,
    next_book_id: AtomicI64,
    next_user_id: AtomicI64,
    books: DashMap<i64, Book>,
    /// Users keyed by email so that uniqueness is enforced by the entry API.
    users: DashMap<String, User>,
    reviews: DashMap<String, Review>,
}

impl MemoryStore {
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size,
            next_book_id: AtomicI64::new(1),
            next_user_id: AtomicI64::new(1),
            books: DashMap::new(),
            users: DashMap::new(),
            reviews: DashMap::new(),
        }
    }

    /// Flip the admin flag of a stored user. There is no HTTP route for this.
    pub fn set_admin(&self, email: &str, is_admin: bool) -> Result<(), StoreError> {
        let mut user = self
            .users
            .get_mut(email)
            .ok_or_else(|| StoreError::NotFound("user".to_string()))?;
        user.is_admin = is_admin;
        user.updated_at = Utc::now();
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

#[async_trait]
impl BookStore for MemoryStore {
    async fn create_book(&self, book: &NewBook) -> Result<Book, StoreError> {
        let now = Utc::now();
        let id = self.next_book_id.fetch_add(1, Ordering::SeqCst);
        let created = Book {
            id,
            title: book.title.clone(),
            author: book.author.clone(),
            published_at: book.published_at.clone(),
            description: book.description.clone(),
            isbn: book.isbn.clone(),
            total_pages: book.total_pages,
            created_at: now,
            updated_at: now,
        };
        self.books.insert(id, created.clone());
        Ok(created)
    }

    async fn get_book(&self, id: i64) -> Result<Book, StoreError> {
        self.books
            .get(&id)
            .map(|b| b.value().clone())
            .ok_or_else(|| StoreError::NotFound(format!("book {id}")))
    }

    async fn get_books(&self, offset: u32, keyword: &str) -> Result<Vec<Book>, StoreError> {
        let mut books: Vec<Book> = self
            .books
            .iter()
            .filter(|b| {
                keyword.is_empty() || contains_ci(&b.title, keyword) || contains_ci(&b.author, keyword)
            })
            .map(|b| b.value().clone())
            .collect();
        books.sort_by_key(|b| b.id);
        Ok(books
            .into_iter()
            .skip(offset as usize)
            .take(self.page_size as usize)
            .collect())
    }

    async fn update_book(&self, id: i64, patch: &BookPatch) -> Result<Book, StoreError> {
        let mut book = self
            .books
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("book {id}")))?;
        patch.apply_to(&mut book);
        book.updated_at = Utc::now();
        Ok(book.value().clone())
    }

    async fn delete_book(&self, id: i64) -> Result<(), StoreError> {
        self.books
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("book {id}")))
    }
}

#[async_trait]
impl ReviewStore for MemoryStore {
    async fn create_review(
        &self,
        review: &NewReview,
        created_at: DateTime<Utc>,
    ) -> Result<Review, StoreError> {
        let created = Review {
            id: uuidv7().to_string(),
            book_id: review.book_id,
            author: review.author.clone(),
            title: review.title.clone(),
            content: review.content.clone(),
            created_at,
            updated_at: created_at,
        };
        self.reviews.insert(created.id.clone(), created.clone());
        Ok(created)
    }

    async fn get_review(&self, id: &str) -> Result<Review, StoreError> {
        self.reviews
            .get(id)
            .map(|r| r.value().clone())
            .ok_or_else(|| StoreError::NotFound(format!("review {id}")))
    }

    async fn get_reviews_of_book(
        &self,
        book_id: i64,
        keyword: &str,
    ) -> Result<Vec<Review>, StoreError> {
        let mut reviews: Vec<Review> = self
            .reviews
            .iter()
            .filter(|r| r.book_id == book_id)
            .filter(|r| {
                keyword.is_empty()
                    || contains_ci(&r.title, keyword)
                    || contains_ci(&r.content, keyword)
            })
            .map(|r| r.value().clone())
            .collect();
        reviews.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(reviews)
    }

    async fn update_review(
        &self,
        id: &str,
        edit: &ReviewEdit,
        updated_at: DateTime<Utc>,
    ) -> Result<Review, StoreError> {
        let mut review = self
            .reviews
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(format!("review {id}")))?;
        review.title = edit.title.clone();
        review.content = edit.content.clone();
        review.updated_at = updated_at;
        Ok(review.value().clone())
    }

    async fn delete_review(&self, id: &str) -> Result<(), StoreError> {
        self.reviews
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("review {id}")))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: &NewUser) -> Result<User, StoreError> {
        match self.users.entry(user.email.clone()) {
            Entry::Occupied(_) => Err(StoreError::Constraint(format!(
                "email {} already registered",
                user.email
            ))),
            Entry::Vacant(slot) => {
                let now = Utc::now();
                let created = User {
                    id: self.next_user_id.fetch_add(1, Ordering::SeqCst),
                    email: user.email.clone(),
                    password_hash: user.password_hash.clone(),
                    salt: user.salt.clone(),
                    is_admin: false,
                    created_at: now,
                    updated_at: now,
                };
                slot.insert(created.clone());
                Ok(created)
            }
        }
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User, StoreError> {
        self.users
            .get(email)
            .map(|u| u.value().clone())
            .ok_or_else(|| StoreError::NotFound("user".to_string()))
    }
}
