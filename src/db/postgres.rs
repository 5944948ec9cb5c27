// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Postgres-backed user and session storage.

use crate::db::{SessionStore, UserStore};
use crate::error::AppError;
use crate::models::{Session, User};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};

/// Postgres database client.
#[derive(Clone)]
pub struct PostgresDb {
    pool: PgPool,
}

impl PostgresDb {
    /// Connect to Postgres and apply pending migrations.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Postgres: {}", e)))?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Migration failed");
                AppError::Internal(anyhow::anyhow!("Migration failed: {}", e))
            })?;

        tracing::info!("Database connected and migrated successfully");

        Ok(Self { pool })
    }
}

#[async_trait]
impl UserStore for PostgresDb {
    async fn upsert_user(&self, user: &User) -> Result<User, AppError> {
        let stored = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, display_name, access_token, refresh_token, expires_in)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                display_name = COALESCE(EXCLUDED.display_name, users.display_name),
                access_token = EXCLUDED.access_token,
                refresh_token = EXCLUDED.refresh_token,
                expires_in = EXCLUDED.expires_in,
                updated_at = now()
            RETURNING id, display_name, access_token, refresh_token, expires_in
            "#,
        )
        .bind(&user.id)
        .bind(&user.display_name)
        .bind(&user.access_token)
        .bind(&user.refresh_token)
        .bind(user.expires_in)
        .fetch_one(&self.pool)
        .await?;

        Ok(stored)
    }

    async fn find_user(&self, id: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, display_name, access_token, refresh_token, expires_in FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}

#[async_trait]
impl SessionStore for PostgresDb {
    async fn create_session(&self, session: &Session) -> Result<(), AppError> {
        sqlx::query("INSERT INTO sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(&session.id)
            .bind(&session.user_id)
            .bind(session.expires_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn get_session(&self, id: &str) -> Result<Option<Session>, AppError> {
        let session = sqlx::query_as::<_, Session>(
            "SELECT id, user_id, expires_at FROM sessions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    async fn delete_session(&self, id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_expired_sessions(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= now()")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
