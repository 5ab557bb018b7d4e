//! Authentication domain models.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored user, including credential material. Never serialized.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub salt: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a new user; the hash is computed before storage is reached.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub salt: String,
}

/// Sign-up / sign-in request body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserCredential {
    pub email: String,
    pub password: String,
}

/// Public-safe projection of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
    pub id: i64,
    pub email: String,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
        }
    }
}

/// Result of a successful sign-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserToken {
    #[serde(flatten)]
    pub user: UserView,
    pub token: String,
}

/// Permission levels, ordered `None < User < Author < Admin`.
///
/// Holding a level grants every level below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserPermission {
    None,
    User,
    Author,
    Admin,
}

impl UserPermission {
    /// Level granted at sign-in. `Author` is never derived here.
    pub fn from_admin_flag(is_admin: bool) -> Self {
        if is_admin { Self::Admin } else { Self::User }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::User => "user",
            Self::Author => "author",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for UserPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JWT claims embedded in bearer tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserClaims {
    pub user_id: i64,
    /// Sign-in identity (the user's email).
    pub user_name: String,
    pub permission: UserPermission,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiry (unix timestamp).
    pub exp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_levels_are_totally_ordered() {
        let levels = [
            UserPermission::None,
            UserPermission::User,
            UserPermission::Author,
            UserPermission::Admin,
        ];
        for pair in levels.windows(2) {
            assert!(pair[0] < pair[1], "{} should sort below {}", pair[0], pair[1]);
        }
        assert!(UserPermission::Admin >= UserPermission::User);
    }

    #[test]
    fn admin_flag_maps_to_two_levels() {
        assert_eq!(UserPermission::from_admin_flag(true), UserPermission::Admin);
        assert_eq!(UserPermission::from_admin_flag(false), UserPermission::User);
    }

    #[test]
    fn permission_serializes_lowercase() {
        let json = serde_json::to_string(&UserPermission::Author).unwrap();
        assert_eq!(json, "\"author\"");
    }

    #[test]
    fn user_token_flattens_user() {
        let token = UserToken {
            user: UserView {
                id: 3,
                email: "a@x.com".into(),
            },
            token: "t".into(),
        };
        let value = serde_json::to_value(&token).unwrap();
        assert_eq!(value, serde_json::json!({"id": 3, "email": "a@x.com", "token": "t"}));
    }
}
