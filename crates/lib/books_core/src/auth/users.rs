//! User sign-up and sign-in.

use std::sync::Arc;

use tracing::debug;

use super::jwt::TokenKeeper;
use super::password::{MAX_PASSWORD_LEN, generate_salt, hash_password, verify_password};
use super::{AuthError, TokenError};
use crate::models::{NewUser, UserCredential, UserPermission, UserToken, UserView};
use crate::store::{StoreError, UserStore};

/// Issues credentials: stores salted password hashes and signs tokens.
#[derive(Clone)]
pub struct UserOperator {
    store: Arc<dyn UserStore>,
    keeper: Arc<TokenKeeper>,
    bcrypt_cost: u32,
}

impl UserOperator {
    pub fn new(store: Arc<dyn UserStore>, keeper: Arc<TokenKeeper>, bcrypt_cost: u32) -> Self {
        Self {
            store,
            keeper,
            bcrypt_cost,
        }
    }

    /// Register a user. Empty fields are rejected before anything is hashed or stored.
    pub async fn create_user(&self, credential: &UserCredential) -> Result<UserView, AuthError> {
        validate(credential)?;

        let salt = generate_salt();
        let password_hash = hash_password(&credential.password, &salt, self.bcrypt_cost)?;
        let user = self
            .store
            .create_user(&NewUser {
                email: credential.email.clone(),
                password_hash,
                salt,
            })
            .await?;
        debug!(user_id = user.id, "user created");
        Ok(UserView::from(&user))
    }

    /// Check the credential and issue a token carrying the user's level.
    pub async fn sign_in(&self, credential: &UserCredential) -> Result<UserToken, AuthError> {
        validate(credential)?;

        let user = match self.store.get_user_by_email(&credential.email).await {
            Ok(user) => user,
            Err(StoreError::NotFound(_)) => return Err(AuthError::NotFound),
            Err(e) => return Err(e.into()),
        };
        if !verify_password(&credential.password, &user.salt, &user.password_hash)? {
            return Err(AuthError::WrongCredentials);
        }

        let permission = UserPermission::from_admin_flag(user.is_admin);
        let token = self.keeper.issue_token(user.id, &user.email, permission)?;
        debug!(user_id = user.id, %permission, "user signed in");
        Ok(UserToken {
            user: UserView::from(&user),
            token,
        })
    }

    pub fn has_permission(&self, token: &str, required: UserPermission) -> Result<bool, TokenError> {
        self.keeper.authorize(token, required)
    }
}

fn validate(credential: &UserCredential) -> Result<(), AuthError> {
    if credential.email.is_empty() {
        return Err(AuthError::Validation("email is required".into()));
    }
    if credential.password.is_empty() {
        return Err(AuthError::Validation("password is required".into()));
    }
    if credential.password.len() > MAX_PASSWORD_LEN {
        return Err(AuthError::Validation(format!(
            "password must be at most {MAX_PASSWORD_LEN} bytes"
        )));
    }
    Ok(())
}
