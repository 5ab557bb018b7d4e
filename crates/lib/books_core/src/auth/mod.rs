//! Credential issuance and token authority.
//!
//! [`TokenKeeper`] signs and verifies bearer tokens carrying a
//! [`UserPermission`](crate::models::UserPermission); [`UserOperator`] turns
//! email/password pairs into stored users and signed-in tokens.

pub mod jwt;
pub mod password;
pub mod users;

use thiserror::Error;

use crate::store::StoreError;

pub use jwt::{TokenError, TokenKeeper};
pub use users::UserOperator;

/// Authentication and authorization errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("User not found")]
    NotFound,

    #[error("Invalid credentials")]
    WrongCredentials,

    #[error("Insufficient permission")]
    Forbidden,

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}
