//! Document store: reviews kept as JSONB documents in PostgreSQL.
//!
//! Each review is one self-describing document in `reviews.doc`; only the id
//! and the owning book id are lifted into columns for lookup.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use super::{ReviewStore, StoreError, like_pattern};
use crate::models::{NewReview, Review, ReviewEdit};
use crate::uuid::uuidv7;

/// PostgreSQL JSONB-backed [`ReviewStore`].
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Review ids are UUIDs; anything else cannot name a stored document.
fn parse_id(id: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(id).map_err(|_| StoreError::NotFound(format!("review {id}")))
}

#[async_trait]
impl ReviewStore for PgDocumentStore {
    async fn create_review(
        &self,
        review: &NewReview,
        created_at: DateTime<Utc>,
    ) -> Result<Review, StoreError> {
        let id = uuidv7();
        let doc = Review {
            id: id.to_string(),
            book_id: review.book_id,
            author: review.author.clone(),
            title: review.title.clone(),
            content: review.content.clone(),
            created_at,
            updated_at: created_at,
        };
        sqlx::query("INSERT INTO reviews (id, book_id, doc) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(review.book_id)
            .bind(Json(&doc))
            .execute(&self.pool)
            .await?;
        Ok(doc)
    }

    async fn get_review(&self, id: &str) -> Result<Review, StoreError> {
        let uuid = parse_id(id)?;
        let doc = sqlx::query_scalar::<_, Json<Review>>("SELECT doc FROM reviews WHERE id = $1")
            .bind(uuid)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("review {id}")))?;
        Ok(doc.0)
    }

    async fn get_reviews_of_book(
        &self,
        book_id: i64,
        keyword: &str,
    ) -> Result<Vec<Review>, StoreError> {
        let docs = sqlx::query_scalar::<_, Json<Review>>(
            "SELECT doc FROM reviews \
             WHERE book_id = $1 \
               AND ($2 = '' OR doc->>'title' ILIKE $3 OR doc->>'content' ILIKE $3) \
             ORDER BY id",
        )
        .bind(book_id)
        .bind(keyword)
        .bind(like_pattern(keyword))
        .fetch_all(&self.pool)
        .await?;
        Ok(docs.into_iter().map(|d| d.0).collect())
    }

    async fn update_review(
        &self,
        id: &str,
        edit: &ReviewEdit,
        updated_at: DateTime<Utc>,
    ) -> Result<Review, StoreError> {
        let uuid = parse_id(id)?;
        let changes = json!({
            "title": edit.title,
            "content": edit.content,
            "updated_at": updated_at,
        });
        let doc = sqlx::query_scalar::<_, Json<Review>>(
            "UPDATE reviews SET doc = doc || $2 WHERE id = $1 RETURNING doc",
        )
        .bind(uuid)
        .bind(Json(changes))
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("review {id}")))?;
        Ok(doc.0)
    }

    async fn delete_review(&self, id: &str) -> Result<(), StoreError> {
        let uuid = parse_id(id)?;
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(uuid)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("review {id}")));
        }
        Ok(())
    }
}
