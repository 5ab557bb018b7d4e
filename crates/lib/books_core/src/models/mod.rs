//! Domain models.
//!
//! These are internal domain models shared by the storage adapters, the
//! operators and the HTTP layer.

pub mod auth;
pub mod book;
pub mod review;

pub use auth::{NewUser, User, UserClaims, UserCredential, UserPermission, UserToken, UserView};
pub use book::{Book, BookPatch, NewBook};
pub use review::{NewReview, Review, ReviewEdit};
