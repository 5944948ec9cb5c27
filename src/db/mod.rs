// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer.
//!
//! Handlers only see the [`UserStore`] and [`SessionStore`] traits.
//! [`PostgresDb`] backs them in the server; [`InMemoryDb`] backs the tests.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryDb;
pub use postgres::PostgresDb;

use crate::error::AppError;
use crate::models::{Session, User};
use async_trait::async_trait;

/// Persistent storage for users.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user, or overwrite the tokens of an existing one, in a single
    /// atomic step. Returns the row as stored.
    ///
    /// A re-login replaces the display name unless the new one is `None`.
    async fn upsert_user(&self, user: &User) -> Result<User, AppError>;

    /// Look up a user by Spotify ID.
    async fn find_user(&self, id: &str) -> Result<Option<User>, AppError>;
}

/// Server-side session records.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create_session(&self, session: &Session) -> Result<(), AppError>;

    async fn get_session(&self, id: &str) -> Result<Option<Session>, AppError>;

    /// Delete a session. Deleting an unknown id is not an error.
    async fn delete_session(&self, id: &str) -> Result<(), AppError>;

    /// Delete every session past its expiry. Returns how many were removed.
    async fn delete_expired_sessions(&self) -> Result<u64, AppError>;
}
