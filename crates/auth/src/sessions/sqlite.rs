//! SQLite session storage implementation.

use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use incantation_core::auth::{
    AuthError, PendingLogin, Result, Session, SessionAttributes, SessionId, SessionRepository,
    PENDING_LOGIN_TTL_SECS,
};
use sqlx::SqlitePool;

type PendingLoginRow = (String, String, Option<String>);

/// SQLite-backed session storage.
#[derive(Debug, Clone)]
pub struct SqliteSessionStore {
    pool: SqlitePool,
}

impl SqliteSessionStore {
    /// Creates a new SQLite session store.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Runs database migrations to create required tables.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                attributes TEXT NOT NULL,
                created_at TEXT NOT NULL,
                expires_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_sessions_expires_at ON sessions(expires_at);

            CREATE TABLE IF NOT EXISTS pending_logins (
                state TEXT PRIMARY KEY,
                pkce_verifier TEXT NOT NULL,
                created_at TEXT NOT NULL,
                return_to TEXT
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(())
    }
}

fn storage_error(e: impl std::fmt::Display) -> AuthError {
    AuthError::Storage(e.to_string())
}

/// Fixed-width UTC timestamps so string comparison matches time order.
fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)
        .map_err(storage_error)?
        .with_timezone(&Utc))
}

fn pending_login_from_row(
    (pkce_verifier, created_at, return_to): PendingLoginRow,
) -> Result<PendingLogin> {
    Ok(PendingLogin {
        pkce_verifier,
        created_at: parse_timestamp(&created_at)?,
        return_to,
    })
}

#[async_trait]
impl SessionRepository for SqliteSessionStore {
    async fn create_session(&self, session: &Session) -> Result<()> {
        let attributes = serde_json::to_string(&session.attributes).map_err(storage_error)?;

        sqlx::query(
            "INSERT INTO sessions (id, attributes, created_at, expires_at) VALUES (?, ?, ?, ?)",
        )
        .bind(session.id.as_str())
        .bind(attributes)
        .bind(format_timestamp(session.created_at))
        .bind(format_timestamp(session.expires_at))
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(())
    }

    async fn get_session(&self, id: &SessionId) -> Result<Option<Session>> {
        let row = sqlx::query_as::<_, (String, String, String, String)>(
            "SELECT id, attributes, created_at, expires_at FROM sessions WHERE id = ?",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        match row {
            Some((id, attributes, created_at, expires_at)) => {
                let attributes: SessionAttributes =
                    serde_json::from_str(&attributes).map_err(storage_error)?;

                Ok(Some(Session {
                    id: SessionId::new(id),
                    attributes,
                    created_at: parse_timestamp(&created_at)?,
                    expires_at: parse_timestamp(&expires_at)?,
                }))
            }
            None => Ok(None),
        }
    }

    async fn delete_session(&self, id: &SessionId) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(())
    }

    async fn store_pending_login(&self, state: &str, flow: &PendingLogin) -> Result<()> {
        sqlx::query(
            "INSERT OR REPLACE INTO pending_logins (state, pkce_verifier, created_at, return_to) VALUES (?, ?, ?, ?)",
        )
        .bind(state)
        .bind(&flow.pkce_verifier)
        .bind(format_timestamp(flow.created_at))
        .bind(&flow.return_to)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(())
    }

    async fn take_pending_login(&self, state: &str) -> Result<Option<PendingLogin>> {
        // SELECT and DELETE in one transaction so a state can only be consumed once
        let mut tx = self.pool.begin().await.map_err(storage_error)?;

        let row = sqlx::query_as::<_, PendingLoginRow>(
            "SELECT pkce_verifier, created_at, return_to FROM pending_logins WHERE state = ?",
        )
        .bind(state)
        .fetch_optional(&mut *tx)
        .await
        .map_err(storage_error)?;

        if row.is_some() {
            sqlx::query("DELETE FROM pending_logins WHERE state = ?")
                .bind(state)
                .execute(&mut *tx)
                .await
                .map_err(storage_error)?;
        }

        tx.commit().await.map_err(storage_error)?;

        row.map(pending_login_from_row).transpose()
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let removed = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(format_timestamp(now))
            .execute(&self.pool)
            .await
            .map_err(storage_error)?
            .rows_affected();

        let cutoff = now - Duration::seconds(PENDING_LOGIN_TTL_SECS);
        sqlx::query("DELETE FROM pending_logins WHERE created_at <= ?")
            .bind(format_timestamp(cutoff))
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(removed)
    }
}
