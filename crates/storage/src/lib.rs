use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use shared::domain::{Todo, TodoId};

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // Every connection to an in-memory database is a separate database.
        let max_connections = if is_memory_url(database_url) { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    pub async fn insert_todo(&self, content: &str) -> Result<Todo> {
        let row = sqlx::query(
            "INSERT INTO todos (content, created_at) VALUES (?, ?)
             RETURNING id, content, created_at",
        )
        .bind(content)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .context("failed to insert todo")?;
        todo_from_row(&row)
    }

    /// Returns `false` when no row had the given id.
    pub async fn delete_todo(&self, todo_id: TodoId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM todos WHERE id = ?")
            .bind(todo_id.0)
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to delete todo {todo_id}"))?;
        Ok(result.rows_affected() > 0)
    }

    /// All todos in insertion order.
    pub async fn list_todos(&self) -> Result<Vec<Todo>> {
        let rows = sqlx::query("SELECT id, content, created_at FROM todos ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await
            .context("failed to list todos")?;
        rows.iter().map(todo_from_row).collect()
    }

    pub async fn clear_todos(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM todos")
            .execute(&self.pool)
            .await
            .context("failed to clear todos")?;
        Ok(result.rows_affected())
    }
}

fn todo_from_row(row: &SqliteRow) -> Result<Todo> {
    Ok(Todo {
        id: TodoId(row.try_get::<i64, _>("id")?),
        content: row.try_get::<String, _>("content")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

fn is_memory_url(database_url: &str) -> bool {
    database_url.starts_with("sqlite::memory:") || database_url.contains("mode=memory")
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if is_memory_url(database_url) || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
