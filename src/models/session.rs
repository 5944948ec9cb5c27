//! Server-side login session.

use chrono::{DateTime, Utc};

/// A login session, referenced from the browser by its opaque `id`.
///
/// Only the user's primary key is kept; the full user is looked up on
/// every request.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Check if session is expired
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}
