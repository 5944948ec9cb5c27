// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Completion step of a successful Spotify login.

use crate::db::UserStore;
use crate::error::AppError;
use crate::models::User;
use crate::services::session::SessionManager;
use crate::services::spotify::OAuthGrant;

/// Outcome of a completed login.
#[derive(Debug)]
pub struct LoginOutcome {
    pub user: User,
    /// Value for the session cookie
    pub session_cookie: String,
}

/// Persist the user behind `grant` and start a session for them.
///
/// Database failures propagate unchanged; nothing is retried.
pub async fn complete_login(
    users: &dyn UserStore,
    sessions: &SessionManager,
    grant: OAuthGrant,
) -> Result<LoginOutcome, AppError> {
    let user = users
        .upsert_user(&User {
            id: grant.profile.id,
            display_name: grant.profile.display_name,
            access_token: grant.access_token,
            refresh_token: grant.refresh_token,
            expires_in: grant.expires_in,
        })
        .await?;

    tracing::info!(user_id = %user.id, "User stored");

    let session_cookie = sessions.establish(&user).await?;

    Ok(LoginOutcome {
        user,
        session_cookie,
    })
}
