// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request},
    response::Response,
    Router,
};
use spotiplay_backend::config::Config;
use spotiplay_backend::db::{InMemoryDb, SessionStore, UserStore};
use spotiplay_backend::error::AppError;
use spotiplay_backend::models::SpotifyProfile;
use spotiplay_backend::routes::create_router;
use spotiplay_backend::services::{OAuthGrant, OAuthProvider, SessionManager};
use spotiplay_backend::AppState;
use std::sync::Arc;
use tower::ServiceExt;

/// Check if a Postgres database is available via environment variable.
#[allow(dead_code)]
pub fn database_available() -> bool {
    std::env::var("DATABASE_URL").is_ok()
}

/// Skip test with message if no database is configured.
#[macro_export]
macro_rules! require_database {
    () => {
        if !crate::common::database_available() {
            eprintln!("⚠️  Skipping: DATABASE_URL not set");
            return;
        }
    };
}

/// OAuth provider stand-in.
///
/// Codes look like `user_id:access_token[:display name]`; the code `deny`
/// fails the exchange.
pub struct StubProvider;

#[async_trait]
impl OAuthProvider for StubProvider {
    fn authorize_url(&self, state: &str) -> String {
        format!("https://accounts.example.test/authorize?client_id=test&state={}", state)
    }

    async fn exchange_code(&self, code: &str) -> Result<OAuthGrant, AppError> {
        let mut parts = code.splitn(3, ':');
        let (Some(id), Some(access_token)) = (parts.next(), parts.next()) else {
            return Err(AppError::SpotifyApi("HTTP 400: invalid_grant".to_string()));
        };

        Ok(OAuthGrant {
            access_token: access_token.to_string(),
            refresh_token: format!("refresh-{}", access_token),
            expires_in: 3600,
            profile: SpotifyProfile {
                id: id.to_string(),
                display_name: parts.next().map(str::to_string),
            },
        })
    }
}

/// Build app state over arbitrary stores.
#[allow(dead_code)]
pub fn create_state(
    config: Config,
    users: Arc<dyn UserStore>,
    sessions: Arc<dyn SessionStore>,
) -> Arc<AppState> {
    let sessions = SessionManager::new(
        sessions,
        users.clone(),
        config.session_secret.clone(),
        config.session_ttl_secs,
    );

    Arc::new(AppState {
        config,
        users,
        sessions,
        oauth: Arc::new(StubProvider),
    })
}

/// Create a test app over an in-memory database.
/// Returns the router and the database for inspection.
#[allow(dead_code)]
pub fn create_test_app() -> (Router, Arc<InMemoryDb>) {
    let db = Arc::new(InMemoryDb::new());
    let state = create_state(Config::default(), db.clone(), db.clone());
    (create_router(state), db)
}

#[allow(dead_code)]
pub async fn get(app: &Router, uri: &str, cookie: Option<&str>) -> Response {
    let mut request = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    app.clone()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

#[allow(dead_code)]
pub fn set_cookie_headers(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}

#[allow(dead_code)]
pub fn find_cookie(response: &Response, name: &str) -> Option<String> {
    set_cookie_headers(response)
        .into_iter()
        .find(|value| value.starts_with(&format!("{name}=")))
}

/// `name=value` pair of a Set-Cookie header, ready for a Cookie header.
#[allow(dead_code)]
pub fn cookie_pair(set_cookie: &str) -> String {
    set_cookie.split(';').next().unwrap().to_string()
}

#[allow(dead_code)]
pub fn location(response: &Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .expect("missing Location header")
        .to_str()
        .unwrap()
        .to_string()
}

/// Begin a login and return the nonce cookie pair and the signed state.
#[allow(dead_code)]
pub async fn start_login(app: &Router) -> (String, String) {
    let response = get(app, "/login/spotify", None).await;
    let nonce = find_cookie(&response, "oauth_nonce").expect("nonce cookie");
    let state = location(&response)
        .split("state=")
        .nth(1)
        .expect("state parameter")
        .to_string();
    (cookie_pair(&nonce), state)
}

/// Run a full login with `code` and return the session cookie pair.
#[allow(dead_code)]
pub async fn login(app: &Router, code: &str) -> String {
    let (nonce, state) = start_login(app).await;
    let response = get(
        app,
        &format!("/auth/spotify/callback?code={}&state={}", code, state),
        Some(&nonce),
    )
    .await;
    let sid = find_cookie(&response, "sid").expect("session cookie");
    cookie_pair(&sid)
}

#[allow(dead_code)]
pub async fn body_json(response: Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
