// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod login;
pub mod oauth_state;
pub mod session;
pub mod spotify;

pub use login::{complete_login, LoginOutcome};
pub use session::{SessionManager, SESSION_COOKIE};
pub use spotify::{OAuthGrant, OAuthProvider, SpotifyClient};
