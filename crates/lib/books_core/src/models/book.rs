//! Book records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored book. `id` is assigned by the relational store on create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    /// Free-form publication date as supplied by the client.
    pub published_at: String,
    pub description: String,
    pub isbn: String,
    pub total_pages: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating a book.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub published_at: String,
    pub description: String,
    pub isbn: String,
    pub total_pages: i32,
}

/// Partial update of a book. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub published_at: Option<String>,
    pub description: Option<String>,
    pub isbn: Option<String>,
    pub total_pages: Option<i32>,
}

impl BookPatch {
    /// Apply the patch onto an existing record, leaving `updated_at` to the caller.
    pub fn apply_to(&self, book: &mut Book) {
        if let Some(title) = &self.title {
            book.title = title.clone();
        }
        if let Some(author) = &self.author {
            book.author = author.clone();
        }
        if let Some(published_at) = &self.published_at {
            book.published_at = published_at.clone();
        }
        if let Some(description) = &self.description {
            book.description = description.clone();
        }
        if let Some(isbn) = &self.isbn {
            book.isbn = isbn.clone();
        }
        if let Some(total_pages) = self.total_pages {
            book.total_pages = total_pages;
        }
    }
}
