//! Permission gate: Bearer token extraction and level check.

use std::sync::Arc;

use axum::http::header::AUTHORIZATION;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use books_core::auth::{AuthError, TokenKeeper};
use books_core::models::{UserClaims, UserPermission};
use tracing::debug;

use crate::error::AppError;

/// Claims of the caller, inserted into request extensions by [`require_permission`].
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub UserClaims);

/// State of one gate: the authority and the level it demands.
#[derive(Clone)]
pub struct PermissionGate {
    keeper: Arc<TokenKeeper>,
    required: UserPermission,
}

impl PermissionGate {
    pub fn new(keeper: Arc<TokenKeeper>, required: UserPermission) -> Self {
        Self { keeper, required }
    }
}

/// Axum middleware: reads `Authorization`, strips an optional `Bearer ` prefix
/// and lets the request through only when the token holds the gate's level.
///
/// Missing header, unusable token and insufficient level are all 401.
pub async fn require_permission(
    State(gate): State<PermissionGate>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Unauthorized("token is required".into()))?;
    let token = header.strip_prefix("Bearer ").unwrap_or(header);

    let claims = match gate.keeper.require(token, gate.required) {
        Ok(claims) => claims,
        Err(AuthError::Token(e)) => return Err(AppError::Unauthorized(e.to_string())),
        Err(e) => {
            debug!(required = %gate.required, error = %e, "permission denied");
            return Err(AppError::Unauthorized("Unauthorized".into()));
        }
    };

    request.extensions_mut().insert(AuthenticatedUser(claims));
    Ok(next.run(request).await)
}
