//! SQLite-backed persistence for todos.
//!
//! Every operation is a single parameterized statement against the `todos`
//! table. There is no query builder and no existence check around writes:
//! update and delete of a missing id succeed with zero rows affected.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use thiserror::Error;
use tracing::debug;

use crate::model::{Todo, TodoInput};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS todos (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        title       TEXT    NOT NULL,
        description TEXT    NOT NULL DEFAULT '',
        completed   BOOLEAN NOT NULL DEFAULT 0,
        created_at  TEXT    NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
        start_time  TEXT,
        end_time    TEXT,
        progress    REAL    NOT NULL DEFAULT 0
    )
"#;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("todo {0} not found")]
    NotFound(i64),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Handle to the todo table. Cheap to clone; clones share one pool.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a pool for `url`, creating the database file if needed, and
    /// verify it answers before returning.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        let store = Self::new(pool);
        store.ping().await?;
        Ok(store)
    }

    /// Private in-memory database with the schema applied.
    ///
    /// Pinned to one connection that never expires, since each SQLite
    /// `:memory:` connection is its own database.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        let store = Self::new(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Create the `todos` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// All todos, newest first.
    pub async fn list(&self) -> Result<Vec<Todo>, StoreError> {
        let todos = sqlx::query_as::<_, Todo>(
            r#"
            SELECT id, title, description, completed, created_at, start_time, end_time, progress
            FROM todos
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(todos)
    }

    pub async fn get(&self, id: i64) -> Result<Todo, StoreError> {
        sqlx::query_as::<_, Todo>(
            r#"
            SELECT id, title, description, completed, created_at, start_time, end_time, progress
            FROM todos
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound(id))
    }

    /// Insert a new row and return it with the id and `created_at` the
    /// database assigned.
    pub async fn insert(&self, input: &TodoInput) -> Result<Todo, StoreError> {
        let (id, created_at): (i64, DateTime<Utc>) = sqlx::query_as(
            r#"
            INSERT INTO todos (title, description, completed, start_time, end_time, progress)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id, created_at
            "#,
        )
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.completed)
        .bind(input.start_time)
        .bind(input.end_time)
        .bind(input.progress)
        .fetch_one(&self.pool)
        .await?;

        debug!(id, "inserted todo");
        Ok(input.clone().into_todo(id, created_at))
    }

    /// Overwrite every mutable column of `id`.
    ///
    /// Returns the row's `created_at`, or `None` when no row has that id.
    pub async fn update(
        &self,
        id: i64,
        input: &TodoInput,
    ) -> Result<Option<DateTime<Utc>>, StoreError> {
        let created_at = sqlx::query_scalar::<_, DateTime<Utc>>(
            r#"
            UPDATE todos
            SET title = ?, description = ?, completed = ?, start_time = ?, end_time = ?, progress = ?
            WHERE id = ?
            RETURNING created_at
            "#,
        )
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.completed)
        .bind(input.start_time)
        .bind(input.end_time)
        .bind(input.progress)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        debug!(id, matched = created_at.is_some(), "updated todo");
        Ok(created_at)
    }

    /// Remove `id`. Returns the number of rows removed.
    pub async fn delete(&self, id: i64) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM todos WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        debug!(id, rows = result.rows_affected(), "deleted todo");
        Ok(result.rows_affected())
    }
}
