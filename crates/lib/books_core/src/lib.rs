//! # books_core
//!
//! Core domain logic for the books catalog.
//!
//! Storage and cache backends are reached through the collaborator traits in
//! [`store`] and [`cache`]; the operators in [`catalog`] and [`auth`] receive
//! them at construction.

pub mod auth;
pub mod cache;
pub mod catalog;
pub mod migrate;
pub mod models;
pub mod store;
pub mod uuid;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_not_empty() {
        assert!(!version().is_empty());
    }
}
