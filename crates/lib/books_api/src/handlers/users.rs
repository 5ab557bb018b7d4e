//! Sign-up and sign-in handlers.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use books_core::models::{UserCredential, UserToken, UserView};
use tracing::{info, warn};

use crate::AppState;
use crate::error::{AppError, AppResult};

/// `POST /users`: create a user from an email/password pair.
pub async fn sign_up(
    State(state): State<AppState>,
    body: Result<Json<UserCredential>, JsonRejection>,
) -> AppResult<(StatusCode, Json<UserView>)> {
    let Json(credential) = body?;
    let user = state.users.create_user(&credential).await?;
    info!(user_id = user.id, "user signed up");
    Ok((StatusCode::CREATED, Json(user)))
}

/// `POST /users/sign-in`: exchange credentials for a bearer token.
///
/// Every failure answers the same 401 so callers cannot tell an unknown email
/// from a wrong password.
pub async fn sign_in(
    State(state): State<AppState>,
    body: Result<Json<UserCredential>, JsonRejection>,
) -> AppResult<Json<UserToken>> {
    let Json(credential) = body?;
    let signed_in = state.users.sign_in(&credential).await.map_err(|e| {
        warn!(error = %e, "sign-in failed");
        AppError::Unauthorized("invalid credentials".into())
    })?;
    Ok(Json(signed_in))
}
