use chrono::Utc;
use sqlx::SqlitePool;

use crate::models::{Action, QueueRow};

pub async fn insert(pool: &SqlitePool, action: &Action) -> Result<QueueRow, sqlx::Error> {
    let payload = serde_json::to_string(action).map_err(|e| sqlx::Error::Encode(Box::new(e)))?;
    sqlx::query_as::<_, QueueRow>(
        "INSERT INTO queue (action, created_at) VALUES (?, ?)
         RETURNING id, action, created_at",
    )
    .bind(payload)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
}

/// Oldest entry with an id strictly greater than `after`.
pub async fn next_after(pool: &SqlitePool, after: i64) -> Result<Option<QueueRow>, sqlx::Error> {
    sqlx::query_as::<_, QueueRow>(
        "SELECT id, action, created_at FROM queue
         WHERE id > ? ORDER BY id ASC LIMIT 1",
    )
    .bind(after)
    .fetch_optional(pool)
    .await
}

pub async fn list(pool: &SqlitePool) -> Result<Vec<QueueRow>, sqlx::Error> {
    sqlx::query_as::<_, QueueRow>("SELECT id, action, created_at FROM queue ORDER BY id ASC")
        .fetch_all(pool)
        .await
}

pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM queue")
        .fetch_one(pool)
        .await
}

pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM queue WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_all(pool: &SqlitePool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM queue").execute(pool).await?;
    Ok(result.rows_affected())
}
