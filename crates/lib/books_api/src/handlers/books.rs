//! Book request handlers.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use books_core::models::{Book, BookPatch, NewBook};
use serde::Deserialize;

use crate::AppState;
use crate::error::{AppError, AppResult};

/// Listing query: `o` is the page offset, `q` a free-text search.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListBooksQuery {
    pub o: Option<String>,
    pub q: Option<String>,
}

impl ListBooksQuery {
    fn offset(&self) -> AppResult<u32> {
        match self.o.as_deref() {
            None | Some("") => Ok(0),
            Some(raw) => raw
                .parse()
                .map_err(|_| AppError::BadRequest("Invalid offset".into())),
        }
    }
}

/// `GET /books?o=&q=`: one page of books; offset pages come from the cache.
pub async fn list_books(
    State(state): State<AppState>,
    query: Result<Query<ListBooksQuery>, QueryRejection>,
) -> AppResult<Json<Vec<Book>>> {
    let Query(query) = query?;
    let offset = query.offset()?;
    let books = state
        .books
        .get_books(offset, query.q.as_deref().unwrap_or_default())
        .await?;
    Ok(Json(books))
}

/// `GET /books/{id}`
pub async fn get_book(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<Book>> {
    let Path(id) = id?;
    Ok(Json(state.books.get_book(id).await?))
}

/// `POST /books`: requires `author`.
pub async fn create_book(
    State(state): State<AppState>,
    body: Result<Json<NewBook>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let Json(body) = body?;
    let book = state.books.create_book(&body).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// `PUT /books/{id}`: requires `author`. Absent fields are left unchanged.
pub async fn update_book(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<BookPatch>, JsonRejection>,
) -> AppResult<Json<Book>> {
    let Path(id) = id?;
    let Json(patch) = body?;
    Ok(Json(state.books.update_book(id, &patch).await?))
}

/// `DELETE /books/{id}`: requires `author`.
pub async fn delete_book(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<StatusCode> {
    let Path(id) = id?;
    state.books.delete_book(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
