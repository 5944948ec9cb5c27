// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Spotify OAuth authentication routes.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Redirect,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::services::oauth_state::{self, STATE_MAX_AGE_SECS};
use crate::services::{complete_login, SESSION_COOKIE};
use crate::AppState;

/// Cookie binding an OAuth callback to the browser that started the login.
pub const NONCE_COOKIE: &str = "oauth_nonce";

const CALLBACK_PATH: &str = "/auth/spotify/callback";

/// Where the browser lands when a login does not complete.
const FAILURE_REDIRECT: &str = "/login";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login/spotify", get(login_start))
        .route(CALLBACK_PATH, get(auth_callback))
        .route("/login", get(login_failed))
        .route("/auth/logout", post(logout))
}

/// Start OAuth flow - redirect to Spotify authorization.
async fn login_start(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect)> {
    let nonce = oauth_state::new_nonce();
    let signed_state = oauth_state::sign_state(
        &nonce,
        chrono::Utc::now().timestamp_millis(),
        &state.config.session_secret,
    )?;

    tracing::info!(
        client_id = %state.config.spotify_client_id,
        "Starting OAuth flow, redirecting to Spotify"
    );

    let jar = jar.add(nonce_cookie(&state.config, nonce));
    Ok((jar, Redirect::temporary(&state.oauth.authorize_url(&signed_state))))
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// OAuth callback - exchange code for tokens, store the user, create session.
async fn auth_callback(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> Result<(CookieJar, Redirect)> {
    let expected_nonce = jar.get(NONCE_COOKIE).map(|c| c.value().to_string());
    let jar = jar.remove(Cookie::build(NONCE_COOKIE).path(CALLBACK_PATH));

    let code = match check_callback(
        &params,
        expected_nonce.as_deref(),
        &state.config.session_secret,
        chrono::Utc::now().timestamp_millis(),
    ) {
        Ok(code) => code,
        Err(reason) => {
            tracing::warn!(reason, "Rejecting OAuth callback");
            return Ok((jar, Redirect::temporary(FAILURE_REDIRECT)));
        }
    };

    tracing::info!("Exchanging authorization code for tokens");

    let grant = match state.oauth.exchange_code(code).await {
        Ok(grant) => grant,
        Err(e) => {
            tracing::warn!(error = %e, "Spotify code exchange failed");
            return Ok((jar, Redirect::temporary(FAILURE_REDIRECT)));
        }
    };

    let outcome = complete_login(state.users.as_ref(), &state.sessions, grant).await?;

    tracing::info!(user_id = %outcome.user.id, "OAuth successful, user and session stored");

    let jar = jar.add(session_cookie(
        &state.config,
        outcome.session_cookie,
        state.sessions.ttl().num_seconds(),
    ));
    Ok((jar, Redirect::temporary(&state.config.post_login_url())))
}

/// Validate the callback parameters and return the authorization code.
fn check_callback<'a>(
    params: &'a CallbackParams,
    expected_nonce: Option<&str>,
    secret: &[u8],
    now_ms: i64,
) -> std::result::Result<&'a str, &'static str> {
    if let Some(error) = &params.error {
        tracing::warn!(error = %error, "OAuth error from Spotify");
        return Err("provider reported an error");
    }

    let state = params.state.as_deref().ok_or("missing state")?;
    let nonce = oauth_state::verify_state(state, secret, now_ms).ok_or("invalid state")?;
    if expected_nonce != Some(nonce.as_str()) {
        return Err("state does not match this browser");
    }

    params.code.as_deref().ok_or("missing code")
}

/// Landing page for failed logins.
async fn login_failed() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "error": "login_failed",
            "details": "Spotify login was denied or could not be completed",
        })),
    )
}

/// Logout - delete the server-side session and clear the cookie.
async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode)> {
    if let Some(value) = jar.get(SESSION_COOKIE).map(|c| c.value().to_string()) {
        state.sessions.destroy(&value).await?;
        tracing::info!("Session destroyed");
    }

    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    Ok((jar, StatusCode::NO_CONTENT))
}

fn session_cookie(config: &Config, value: String, ttl_secs: i64) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.cookie_secure)
        .max_age(time::Duration::seconds(ttl_secs))
        .build()
}

fn nonce_cookie(config: &Config, nonce: String) -> Cookie<'static> {
    Cookie::build((NONCE_COOKIE, nonce))
        .path(CALLBACK_PATH)
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.cookie_secure)
        .max_age(time::Duration::seconds(STATE_MAX_AGE_SECS))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"secret_key";
    const NOW: i64 = 1_767_225_600_000;

    fn params(code: Option<&str>, state: Option<String>, error: Option<&str>) -> CallbackParams {
        CallbackParams {
            code: code.map(str::to_string),
            state,
            error: error.map(str::to_string),
        }
    }

    #[test]
    fn test_check_callback_accepts_matching_nonce() {
        let state = oauth_state::sign_state("n1", NOW, SECRET).unwrap();
        let p = params(Some("the-code"), Some(state), None);
        assert_eq!(check_callback(&p, Some("n1"), SECRET, NOW), Ok("the-code"));
    }

    #[test]
    fn test_check_callback_rejects_other_browser() {
        let state = oauth_state::sign_state("n1", NOW, SECRET).unwrap();
        let p = params(Some("the-code"), Some(state), None);
        assert!(check_callback(&p, Some("n2"), SECRET, NOW).is_err());
        assert!(check_callback(&p, None, SECRET, NOW).is_err());
    }

    #[test]
    fn test_check_callback_rejects_provider_denial() {
        let state = oauth_state::sign_state("n1", NOW, SECRET).unwrap();
        let p = params(None, Some(state), Some("access_denied"));
        assert!(check_callback(&p, Some("n1"), SECRET, NOW).is_err());
    }

    #[test]
    fn test_check_callback_requires_code_and_state() {
        let state = oauth_state::sign_state("n1", NOW, SECRET).unwrap();
        assert!(check_callback(&params(None, Some(state), None), Some("n1"), SECRET, NOW).is_err());
        assert!(check_callback(&params(Some("c"), None, None), Some("n1"), SECRET, NOW).is_err());
    }

    #[test]
    fn test_session_cookie_attributes() {
        let mut config = Config::default();
        let cookie = session_cookie(&config, "abc.def".to_string(), 60).to_string();
        assert!(cookie.starts_with("sid=abc.def"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("Max-Age=60"));
        assert!(!cookie.contains("Secure"));

        config.cookie_secure = true;
        let cookie = session_cookie(&config, "abc.def".to_string(), 60).to_string();
        assert!(cookie.contains("Secure"));
    }
}
