// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Spotify OAuth client.
//!
//! Handles:
//! - Building the authorization URL with the fixed scope set
//! - Exchanging an authorization code for tokens
//! - Fetching the authenticated user's profile

use crate::error::AppError;
use crate::models::SpotifyProfile;
use async_trait::async_trait;
use serde::Deserialize;

/// Scopes requested on every login.
pub const SPOTIFY_SCOPES: &[&str] = &[
    "user-top-read",
    "app-remote-control",
    "user-modify-playback-state",
];

const AUTHORIZE_URL: &str = "https://accounts.spotify.com/authorize";
const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const API_BASE_URL: &str = "https://api.spotify.com/v1";

/// Everything a successful authorization-code exchange yields.
#[derive(Debug, Clone)]
pub struct OAuthGrant {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
    pub profile: SpotifyProfile,
}

/// An OAuth authorization-code provider.
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// URL the browser is redirected to in order to grant consent.
    fn authorize_url(&self, state: &str) -> String;

    /// Exchange an authorization code for tokens and the user's profile.
    async fn exchange_code(&self, code: &str) -> Result<OAuthGrant, AppError>;
}

/// Token response from Spotify.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

/// Spotify API client.
#[derive(Clone)]
pub struct SpotifyClient {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    callback_url: String,
}

impl SpotifyClient {
    /// Create a new Spotify client with OAuth credentials.
    pub fn new(client_id: String, client_secret: String, callback_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            client_id,
            client_secret,
            callback_url,
        }
    }

    /// Exchange an authorization code at the token endpoint.
    pub async fn request_token(&self, code: &str) -> Result<TokenResponse, AppError> {
        let response = self
            .http
            .post(TOKEN_URL)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.callback_url.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::SpotifyApi(format!("Token request failed: {}", e)))?;

        check_response_json(response).await
    }

    /// Get the profile of the user who owns `access_token`.
    pub async fn get_profile(&self, access_token: &str) -> Result<SpotifyProfile, AppError> {
        let response = self
            .http
            .get(format!("{}/me", API_BASE_URL))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::SpotifyApi(e.to_string()))?;

        check_response_json(response).await
    }
}

#[async_trait]
impl OAuthProvider for SpotifyClient {
    fn authorize_url(&self, state: &str) -> String {
        format!(
            "{}?response_type=code&client_id={}&redirect_uri={}&scope={}&state={}",
            AUTHORIZE_URL,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.callback_url),
            urlencoding::encode(&SPOTIFY_SCOPES.join(" ")),
            urlencoding::encode(state),
        )
    }

    async fn exchange_code(&self, code: &str) -> Result<OAuthGrant, AppError> {
        let token = self.request_token(code).await?;
        let profile = self.get_profile(&token.access_token).await?;

        Ok(OAuthGrant {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_in: token.expires_in,
            profile,
        })
    }
}

/// Check response and parse JSON body.
async fn check_response_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, AppError> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status.as_u16() == 429 {
            tracing::warn!("Spotify rate limit hit (429)");
        }

        return Err(AppError::SpotifyApi(format!("HTTP {}: {}", status, body)));
    }

    response
        .json()
        .await
        .map_err(|e| AppError::SpotifyApi(format!("JSON parse error: {}", e)))
}
