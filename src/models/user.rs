//! User model for storage and API.

use serde::Deserialize;

/// User row stored in the `users` table.
///
/// One row per Spotify account. Tokens are opaque and must never be logged.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct User {
    /// Spotify user ID (primary key)
    pub id: String,
    /// Spotify display name (Spotify allows it to be unset)
    pub display_name: Option<String>,
    /// Current access token
    pub access_token: String,
    /// Refresh token issued alongside the access token
    pub refresh_token: String,
    /// Access token lifetime in seconds, as reported at login
    pub expires_in: i64,
}

/// Profile fields read from the Spotify `/v1/me` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SpotifyProfile {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}
