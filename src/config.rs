// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Everything is read once at startup. A `.env` file in the working
//! directory is honoured for local development.

use std::env;

/// Default lifetime of a login session (30 days).
const DEFAULT_SESSION_TTL_SECS: i64 = 30 * 24 * 60 * 60;

/// Longest accepted session lifetime (10 years).
const MAX_SESSION_TTL_SECS: i64 = 10 * 365 * 24 * 60 * 60;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Spotify OAuth client ID (public)
    pub spotify_client_id: String,
    /// Redirect URI registered with Spotify for the OAuth callback
    pub spotify_callback_url: String,
    /// Frontend base URL; successful logins land on `<frontend>/play`
    pub frontend_url: String,
    /// The single origin allowed to make credentialed cross-origin requests
    pub cors_origin: String,
    /// Server port
    pub port: u16,
    /// Lifetime of a login session in seconds
    pub session_ttl_secs: i64,
    /// Whether the session cookie carries the `Secure` attribute
    pub cookie_secure: bool,
    /// Upper bound on pooled Postgres connections
    pub database_max_connections: u32,

    // --- Secrets ---
    /// Postgres connection string
    pub database_url: String,
    /// Spotify OAuth client secret
    pub spotify_client_secret: String,
    /// HMAC key for session cookies and OAuth state (raw bytes)
    pub session_secret: Vec<u8>,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            spotify_client_id: "test_client_id".to_string(),
            spotify_callback_url: "http://localhost:8080/auth/spotify/callback".to_string(),
            frontend_url: "http://localhost:5173/".to_string(),
            cors_origin: "http://localhost:5173".to_string(),
            port: 8080,
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            cookie_secure: false,
            database_max_connections: 5,
            database_url: "postgres://localhost/spotiplay_test".to_string(),
            spotify_client_secret: "test_secret".to_string(),
            session_secret: b"test_session_secret_32_bytes!!!!".to_vec(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            spotify_client_id: required("SPOTIFY_CLIENT_ID")?,
            spotify_callback_url: required("SPOTIFY_CALLBACK_URL")?,
            frontend_url: env::var("FRONTEND")
                .unwrap_or_else(|_| "http://localhost:5173/".to_string()),
            cors_origin: env::var("CORS_ORIGIN").unwrap_or_else(|_| {
                "https://frontend-production-cae1.up.railway.app".to_string()
            }),
            port: parse_or("PORT", 8080)?,
            session_ttl_secs: check_session_ttl(parse_or(
                "SESSION_TTL_SECS",
                DEFAULT_SESSION_TTL_SECS,
            )?)?,
            cookie_secure: parse_or("SESSION_COOKIE_SECURE", false)?,
            database_max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 5)?,

            database_url: required("DATABASE_URL")?,
            spotify_client_secret: required("SPOTIFY_CLIENT_SECRET")?,
            session_secret: required("SESSION_SECRET")?.into_bytes(),
        })
    }

    /// Where the browser is sent after a successful login.
    pub fn post_login_url(&self) -> String {
        format!("{}/play", self.frontend_url.trim_end_matches('/'))
    }
}

/// Read a required variable, trimming stray whitespace from secret injection.
fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .map(|v| v.trim().to_string())
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(name))
}

/// Session lifetimes must be positive and small enough to add to "now".
fn check_session_ttl(secs: i64) -> Result<i64, ConfigError> {
    if (1..=MAX_SESSION_TTL_SECS).contains(&secs) {
        Ok(secs)
    } else {
        Err(ConfigError::Invalid("SESSION_TTL_SECS", secs.to_string()))
    }
}

fn parse_or<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => Ok(value),
            Err(_) => Err(ConfigError::Invalid(name, raw)),
        },
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
