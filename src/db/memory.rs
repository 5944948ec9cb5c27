// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process user and session storage.
//!
//! Mirrors the Postgres upsert semantics so the HTTP layer behaves the same
//! against either backend. Nothing survives a restart.

use crate::db::{SessionStore, UserStore};
use crate::error::AppError;
use crate::models::{Session, User};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

#[derive(Default)]
pub struct InMemoryDb {
    users: DashMap<String, User>,
    sessions: DashMap<String, Session>,
}

impl InMemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

#[async_trait]
impl UserStore for InMemoryDb {
    async fn upsert_user(&self, user: &User) -> Result<User, AppError> {
        // The entry guard holds the shard lock, so concurrent upserts of the
        // same id serialize here.
        let stored = match self.users.entry(user.id.clone()) {
            Entry::Occupied(mut entry) => {
                let row = entry.get_mut();
                if user.display_name.is_some() {
                    row.display_name = user.display_name.clone();
                }
                row.access_token = user.access_token.clone();
                row.refresh_token = user.refresh_token.clone();
                row.expires_in = user.expires_in;
                row.clone()
            }
            Entry::Vacant(entry) => entry.insert(user.clone()).value().clone(),
        };
        Ok(stored)
    }

    async fn find_user(&self, id: &str) -> Result<Option<User>, AppError> {
        Ok(self.users.get(id).map(|row| row.value().clone()))
    }
}

#[async_trait]
impl SessionStore for InMemoryDb {
    async fn create_session(&self, session: &Session) -> Result<(), AppError> {
        match self.sessions.entry(session.id.clone()) {
            Entry::Occupied(_) => Err(AppError::Database(format!(
                "duplicate session id {}",
                session.id
            ))),
            Entry::Vacant(entry) => {
                entry.insert(session.clone());
                Ok(())
            }
        }
    }

    async fn get_session(&self, id: &str) -> Result<Option<Session>, AppError> {
        Ok(self.sessions.get(id).map(|s| s.value().clone()))
    }

    async fn delete_session(&self, id: &str) -> Result<(), AppError> {
        self.sessions.remove(id);
        Ok(())
    }

    async fn delete_expired_sessions(&self) -> Result<u64, AppError> {
        let before = self.sessions.len();
        self.sessions.retain(|_, session| !session.is_expired());
        Ok(before.saturating_sub(self.sessions.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn user(id: &str, name: Option<&str>, access: &str, refresh: &str) -> User {
        User {
            id: id.to_string(),
            display_name: name.map(str::to_string),
            access_token: access.to_string(),
            refresh_token: refresh.to_string(),
            expires_in: 3600,
        }
    }

    #[tokio::test]
    async fn test_upsert_creates_single_row_per_id() {
        let db = InMemoryDb::new();

        db.upsert_user(&user("alice", Some("Alice"), "a1", "r1"))
            .await
            .unwrap();
        db.upsert_user(&user("alice", Some("Alice"), "a2", "r2"))
            .await
            .unwrap();

        assert_eq!(db.user_count(), 1);
    }

    #[tokio::test]
    async fn test_find_returns_latest_tokens() {
        let db = InMemoryDb::new();

        db.upsert_user(&user("alice", Some("Alice"), "a1", "r1"))
            .await
            .unwrap();
        let mut relogin = user("alice", Some("Alice"), "a2", "r2");
        relogin.expires_in = 1800;
        db.upsert_user(&relogin).await.unwrap();

        let found = db.find_user("alice").await.unwrap().unwrap();
        assert_eq!(found.access_token, "a2");
        assert_eq!(found.refresh_token, "r2");
        assert_eq!(found.expires_in, 1800);
    }

    #[tokio::test]
    async fn test_relogin_updates_display_name() {
        let db = InMemoryDb::new();

        db.upsert_user(&user("alice", Some("Alice"), "a1", "r1"))
            .await
            .unwrap();
        let stored = db
            .upsert_user(&user("alice", Some("Alice B."), "a2", "r2"))
            .await
            .unwrap();

        assert_eq!(stored.display_name.as_deref(), Some("Alice B."));
    }

    #[tokio::test]
    async fn test_relogin_without_display_name_keeps_existing() {
        let db = InMemoryDb::new();

        db.upsert_user(&user("alice", Some("Alice"), "a1", "r1"))
            .await
            .unwrap();
        let stored = db
            .upsert_user(&user("alice", None, "a2", "r2"))
            .await
            .unwrap();

        assert_eq!(stored.display_name.as_deref(), Some("Alice"));
        assert_eq!(stored.access_token, "a2");
    }

    #[tokio::test]
    async fn test_find_unknown_user() {
        let db = InMemoryDb::new();
        assert!(db.find_user("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let db = InMemoryDb::new();
        let session = Session {
            id: "s1".to_string(),
            user_id: "alice".to_string(),
            expires_at: Utc::now() + Duration::hours(1),
        };

        db.create_session(&session).await.unwrap();
        assert!(db.create_session(&session).await.is_err());
        assert_eq!(db.get_session("s1").await.unwrap(), Some(session));

        db.delete_session("s1").await.unwrap();
        assert!(db.get_session("s1").await.unwrap().is_none());
        db.delete_session("s1").await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_expired_sessions_keeps_live_ones() {
        let db = InMemoryDb::new();
        for (id, offset) in [("old", -60), ("older", -3600), ("live", 3600)] {
            db.create_session(&Session {
                id: id.to_string(),
                user_id: "alice".to_string(),
                expires_at: Utc::now() + Duration::seconds(offset),
            })
            .await
            .unwrap();
        }

        assert_eq!(db.delete_expired_sessions().await.unwrap(), 2);
        assert_eq!(db.session_count(), 1);
        assert!(db.get_session("live").await.unwrap().is_some());
    }
}
