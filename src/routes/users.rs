// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Read endpoints for the logged-in user.

use crate::middleware::auth::AuthUser;
use crate::AppState;
use axum::{routing::get, Extension, Json, Router};
use std::sync::Arc;

/// User routes (require a session).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users/name", get(get_name))
        .route("/users/token", get(get_token))
}

/// Display name of the current user, as a JSON string (or null).
async fn get_name(Extension(auth): Extension<AuthUser>) -> Json<Option<String>> {
    Json(auth.user.display_name)
}

/// Current Spotify access token, as a JSON string.
async fn get_token(Extension(auth): Extension<AuthUser>) -> Json<String> {
    Json(auth.user.access_token)
}
