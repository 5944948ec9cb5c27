// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Spotiplay backend: Spotify login and session-gated user endpoints.
//!
//! This crate authenticates users through Spotify's authorization-code
//! flow, keeps their tokens in Postgres and serves them back to the
//! frontend behind a server-side session cookie.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::UserStore;
use services::{OAuthProvider, SessionManager};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub users: Arc<dyn UserStore>,
    pub sessions: SessionManager,
    pub oauth: Arc<dyn OAuthProvider>,
}
