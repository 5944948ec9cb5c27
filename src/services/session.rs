// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Login sessions.
//!
//! The browser holds `<session_id>.<hmac_hex>`; the server holds the session
//! row mapping that id to a user id. The user itself is re-read on every
//! request.

use crate::db::{SessionStore, UserStore};
use crate::error::AppError;
use crate::models::{Session, User};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use std::sync::Arc;

type HmacSha256 = Hmac<Sha256>;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "sid";

/// Creates, resolves and destroys login sessions.
#[derive(Clone)]
pub struct SessionManager {
    sessions: Arc<dyn SessionStore>,
    users: Arc<dyn UserStore>,
    signing_key: Vec<u8>,
    ttl: Duration,
}

impl SessionManager {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        users: Arc<dyn UserStore>,
        signing_key: Vec<u8>,
        ttl_secs: i64,
    ) -> Self {
        Self {
            sessions,
            users,
            signing_key,
            ttl: Duration::seconds(ttl_secs),
        }
    }

    /// Session lifetime, also used as the cookie `Max-Age`.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Start a session for `user` and return the cookie value.
    ///
    /// Only the user's id is stored. Expired sessions of any user are swept
    /// first.
    pub async fn establish(&self, user: &User) -> Result<String, AppError> {
        let swept = self.sessions.delete_expired_sessions().await?;
        if swept > 0 {
            tracing::debug!(swept, "Expired sessions removed");
        }

        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);

        let session = Session {
            id: hex::encode(bytes),
            user_id: user.id.clone(),
            expires_at: Utc::now() + self.ttl,
        };
        self.sessions.create_session(&session).await?;

        tracing::info!(user_id = %user.id, "Session established");
        self.sign(&session.id)
    }

    /// Resolve a cookie value to the user it belongs to.
    ///
    /// Returns `Ok(None)` when the request is simply unauthenticated and
    /// `Err(AppError::Authentication)` when a store lookup fails.
    pub async fn resolve(&self, cookie_value: &str) -> Result<Option<User>, AppError> {
        let Some(session_id) = self.verify(cookie_value) else {
            return Ok(None);
        };

        let session = self
            .sessions
            .get_session(session_id)
            .await
            .map_err(|e| AppError::Authentication(e.to_string()))?;
        let Some(session) = session else {
            return Ok(None);
        };

        if session.is_expired() {
            tracing::debug!(user_id = %session.user_id, "Session expired");
            self.sessions
                .delete_session(&session.id)
                .await
                .map_err(|e| AppError::Authentication(e.to_string()))?;
            return Ok(None);
        }

        self.users
            .find_user(&session.user_id)
            .await
            .map_err(|e| AppError::Authentication(e.to_string()))
    }

    /// Delete the server-side session behind a cookie, if it verifies.
    pub async fn destroy(&self, cookie_value: &str) -> Result<(), AppError> {
        if let Some(session_id) = self.verify(cookie_value) {
            self.sessions.delete_session(session_id).await?;
        }
        Ok(())
    }

    fn sign(&self, session_id: &str) -> Result<String, AppError> {
        let mut mac = HmacSha256::new_from_slice(&self.signing_key)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("HMAC init failed: {}", e)))?;
        mac.update(session_id.as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());
        Ok(format!("{}.{}", session_id, signature))
    }

    /// Check the cookie signature and return the session id it carries.
    fn verify<'a>(&self, cookie_value: &'a str) -> Option<&'a str> {
        let (session_id, signature_hex) = cookie_value.split_once('.')?;
        let signature = hex::decode(signature_hex).ok()?;

        let mut mac = HmacSha256::new_from_slice(&self.signing_key).ok()?;
        mac.update(session_id.as_bytes());
        mac.verify_slice(&signature).ok()?;

        Some(session_id)
    }
}
