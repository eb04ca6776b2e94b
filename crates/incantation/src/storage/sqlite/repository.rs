//! SQLite repository implementation.
//!
//! Implements the repository traits from `incantation_core::storage` using SQLite.

use async_trait::async_trait;
use rusqlite::{OptionalExtension, Row};
use tokio_rusqlite::Connection;

use incantation_core::storage::{RepositoryError, Result, User, UserRepository};

use super::error::map_tokio_rusqlite_error;
use super::schema;

/// Helper to wrap rusqlite errors for tokio_rusqlite closures.
fn wrap_err(e: rusqlite::Error) -> tokio_rusqlite::Error {
    tokio_rusqlite::Error::Rusqlite(e)
}

/// Expected columns: id, sub
fn row_to_user(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        sub: row.get(1)?,
    })
}

/// SQLite-based repository implementation.
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Creates a new repository with a file-based database.
    ///
    /// The database file will be created if it doesn't exist.
    /// Schema tables are created automatically.
    pub async fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    /// Creates a new repository with an in-memory database.
    pub async fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    async fn init_schema(conn: &Connection) -> Result<()> {
        conn.call(|conn| {
            conn.execute_batch(schema::CREATE_TABLES).map_err(wrap_err)?;
            Ok(())
        })
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))
    }
}

#[async_trait]
impl UserRepository for SqliteRepository {
    async fn get_user_by_sub(&self, sub: &str) -> Result<Option<User>> {
        let sub_owned = sub.to_string();

        self.conn
            .call(move |conn| {
                conn.query_row(schema::SELECT_USER_BY_SUB, [&sub_owned], row_to_user)
                    .optional()
                    .map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "User", sub))
    }

    async fn create_user(&self, sub: &str) -> Result<User> {
        let sub_owned = sub.to_string();

        self.conn
            .call(move |conn| {
                conn.execute(schema::INSERT_USER, [&sub_owned])
                    .map_err(wrap_err)?;
                Ok(User {
                    id: conn.last_insert_rowid(),
                    sub: sub_owned,
                })
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "User", sub))
    }
}
