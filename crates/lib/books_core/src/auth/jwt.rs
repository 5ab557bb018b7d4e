//! Bearer token signing and verification (HS256).

use std::path::{Path, PathBuf};

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, decode_header, encode,
};
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use thiserror::Error;
use tracing::{info, warn};

use super::AuthError;
use crate::models::{UserClaims, UserPermission};

/// Token validity used when none is configured.
pub const DEFAULT_TOKEN_VALIDITY_HOURS: i64 = 24;

#[derive(Debug, Error)]
pub enum TokenError {
    /// Bad signature, malformed token or expired.
    #[error("Invalid token")]
    InvalidToken,

    /// Signature verified but the payload is not a [`UserClaims`].
    #[error("Token claims could not be decoded: {0}")]
    ClaimsDecode(String),

    #[error("Token signing failed: {0}")]
    Signing(String),
}

/// Issues and verifies stateless bearer tokens.
#[derive(Clone)]
pub struct TokenKeeper {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validity: Duration,
}

impl TokenKeeper {
    pub fn new(secret: &[u8], validity: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validity,
        }
    }

    /// Sign a token expiring `validity` from now.
    pub fn issue_token(
        &self,
        user_id: i64,
        user_name: &str,
        permission: UserPermission,
    ) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = UserClaims {
            user_id,
            user_name: user_name.to_string(),
            permission,
            iat: now.timestamp(),
            exp: (now + self.validity).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify the signature and expiry, returning the claims.
    ///
    /// Expiry is inclusive with no leeway: `exp == now` is already expired.
    pub fn verify_and_decode(&self, token: &str) -> Result<UserClaims, TokenError> {
        // The header is parsed before the signature is checked; a JSON error
        // there is a malformed token, not a claims mismatch.
        decode_header(token).map_err(|_| TokenError::InvalidToken)?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;

        let data = decode::<UserClaims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::Json(_) => TokenError::ClaimsDecode(e.to_string()),
                _ => TokenError::InvalidToken,
            }
        })?;
        if data.claims.exp <= Utc::now().timestamp() {
            return Err(TokenError::InvalidToken);
        }
        Ok(data.claims)
    }

    /// Whether the token holder has at least `required`. A token that does not
    /// verify is an error, never `false`.
    pub fn authorize(&self, token: &str, required: UserPermission) -> Result<bool, TokenError> {
        Ok(self.verify_and_decode(token)?.permission >= required)
    }

    /// Gate form of [`authorize`](Self::authorize): the decoded claims on
    /// success, [`AuthError::Token`] when the token is unusable and
    /// [`AuthError::Forbidden`] when the level is too low.
    pub fn require(&self, token: &str, required: UserPermission) -> Result<UserClaims, AuthError> {
        let claims = self.verify_and_decode(token)?;
        if claims.permission >= required {
            Ok(claims)
        } else {
            Err(AuthError::Forbidden)
        }
    }
}

/// Resolve the signing secret: `JWT_SECRET`, else the persisted secret file,
/// else a freshly generated one written to that file.
pub fn resolve_jwt_secret() -> String {
    if let Ok(secret) = std::env::var("JWT_SECRET")
        && !secret.is_empty()
    {
        return secret;
    }
    resolve_jwt_secret_at(&jwt_secret_path())
}

/// File-backed part of [`resolve_jwt_secret`].
pub fn resolve_jwt_secret_at(secret_path: &Path) -> String {
    if let Ok(existing) = std::fs::read_to_string(secret_path) {
        let trimmed = existing.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    let secret: String = rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect();
    if let Some(parent) = secret_path.parent()
        && let Err(e) = std::fs::create_dir_all(parent)
    {
        warn!(path = %parent.display(), error = %e, "cannot create secret directory");
    }
    match std::fs::write(secret_path, &secret) {
        Ok(()) => info!(path = %secret_path.display(), "generated new JWT secret"),
        Err(e) => warn!(path = %secret_path.display(), error = %e, "generated JWT secret not persisted"),
    }
    secret
}

fn jwt_secret_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("books")
        .join("jwt-secret")
}
