//! Review request handlers.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use books_core::models::{NewReview, Review, ReviewEdit};
use serde::Deserialize;

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReviewSearchQuery {
    pub q: String,
}

/// `GET /books/{id}/reviews?q=`
pub async fn list_reviews_of_book(
    State(state): State<AppState>,
    book_id: Result<Path<i64>, PathRejection>,
    query: Result<Query<ReviewSearchQuery>, QueryRejection>,
) -> AppResult<Json<Vec<Review>>> {
    let Path(book_id) = book_id?;
    let Query(query) = query?;
    Ok(Json(state.reviews.get_reviews_of_book(book_id, &query.q).await?))
}

/// `GET /reviews/{id}`
pub async fn get_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Review>> {
    Ok(Json(state.reviews.get_review(&id).await?))
}

/// `POST /reviews`: requires `user`. A review without an author is credited
/// to the caller.
pub async fn create_review(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(claims)): Extension<AuthenticatedUser>,
    body: Result<Json<NewReview>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Review>)> {
    let Json(mut body) = body?;
    if body.author.is_empty() {
        body.author = claims.user_name;
    }
    let review = state.reviews.create_review(&body).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

/// `PUT /reviews/{id}`: requires `user`.
pub async fn update_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<ReviewEdit>, JsonRejection>,
) -> AppResult<Json<Review>> {
    let Json(edit) = body?;
    Ok(Json(state.reviews.update_review(&id, &edit).await?))
}

/// `DELETE /reviews/{id}`: requires `user`.
pub async fn delete_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.reviews.delete_review(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
