//! Relational store: books and users in PostgreSQL.

use async_trait::async_trait;
use sqlx::PgPool;

use super::{BookStore, StoreError, UserStore, like_pattern};
use crate::models::{Book, BookPatch, NewBook, NewUser, User};

const BOOK_COLUMNS: &str =
    "id, title, author, published_at, description, isbn, total_pages, created_at, updated_at";

const USER_COLUMNS: &str = "id, email, password_hash, salt, is_admin, created_at, updated_at";

/// PostgreSQL-backed [`BookStore`] and [`UserStore`].
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    page_size: u32,
}

impl PgStore {
    pub fn new(pool: PgPool, page_size: u32) -> Self {
        Self { pool, page_size }
    }
}

/// Map a unique violation to [`StoreError::Constraint`], anything else to `Db`.
fn map_insert_error(e: sqlx::Error) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Constraint(db.message().to_string())
        }
        _ => StoreError::Db(e),
    }
}

#[async_trait]
impl BookStore for PgStore {
    async fn create_book(&self, book: &NewBook) -> Result<Book, StoreError> {
        let sql = format!(
            "INSERT INTO books (title, author, published_at, description, isbn, total_pages) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {BOOK_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Book>(&sql)
            .bind(&book.title)
            .bind(&book.author)
            .bind(&book.published_at)
            .bind(&book.description)
            .bind(&book.isbn)
            .bind(book.total_pages)
            .fetch_one(&self.pool)
            .await
            .map_err(map_insert_error)?;
        Ok(created)
    }

    async fn get_book(&self, id: i64) -> Result<Book, StoreError> {
        let sql = format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = $1");
        sqlx::query_as::<_, Book>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("book {id}")))
    }

    async fn get_books(&self, offset: u32, keyword: &str) -> Result<Vec<Book>, StoreError> {
        let sql = format!(
            "SELECT {BOOK_COLUMNS} FROM books \
             WHERE ($1 = '' OR title ILIKE $2 OR author ILIKE $2) \
             ORDER BY id \
             OFFSET $3 LIMIT $4"
        );
        let books = sqlx::query_as::<_, Book>(&sql)
            .bind(keyword)
            .bind(like_pattern(keyword))
            .bind(i64::from(offset))
            .bind(i64::from(self.page_size))
            .fetch_all(&self.pool)
            .await?;
        Ok(books)
    }

    async fn update_book(&self, id: i64, patch: &BookPatch) -> Result<Book, StoreError> {
        let sql = format!(
            "UPDATE books SET \
                title = COALESCE($2, title), \
                author = COALESCE($3, author), \
                published_at = COALESCE($4, published_at), \
                description = COALESCE($5, description), \
                isbn = COALESCE($6, isbn), \
                total_pages = COALESCE($7, total_pages), \
                updated_at = now() \
             WHERE id = $1 \
             RETURNING {BOOK_COLUMNS}"
        );
        sqlx::query_as::<_, Book>(&sql)
            .bind(id)
            .bind(patch.title.as_deref())
            .bind(patch.author.as_deref())
            .bind(patch.published_at.as_deref())
            .bind(patch.description.as_deref())
            .bind(patch.isbn.as_deref())
            .bind(patch.total_pages)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("book {id}")))
    }

    async fn delete_book(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("book {id}")));
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, user: &NewUser) -> Result<User, StoreError> {
        let sql = format!(
            "INSERT INTO users (email, password_hash, salt) VALUES ($1, $2, $3) \
             RETURNING {USER_COLUMNS}"
        );
        let created = sqlx::query_as::<_, User>(&sql)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.salt)
            .fetch_one(&self.pool)
            .await
            .map_err(map_insert_error)?;
        Ok(created)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound("user".to_string()))
    }
}
