//! Review documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored review. `id` is an opaque string assigned by the document store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    pub book_id: i64,
    pub author: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating a review.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewReview {
    pub book_id: i64,
    pub author: String,
    pub title: String,
    pub content: String,
}

/// Editable part of a review. Both fields are required on update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewEdit {
    pub title: String,
    pub content: String,
}
