use std::time::Duration;

use serde::Serialize;
use sqlx::SqlitePool;
use tokio::sync::Mutex;

use crate::db;
use crate::models::{Action, Decoded, QueuedAction};
use crate::replay::ReplayHandler;

/// Durable FIFO of actions that could not reach the backend.
///
/// Entries are replayed oldest first and removed only once their replay
/// succeeds. A failing entry halts the drain and stays at the head.
pub struct OfflineQueue {
    pool: SqlitePool,
    drain_lock: Mutex<()>,
    replay_timeout: Duration,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DrainReport {
    /// Ids replayed and removed, in replay order.
    pub replayed: Vec<i64>,
    /// Ids removed without replay because their action type is unknown.
    pub skipped: Vec<i64>,
    pub remaining: i64,
    pub halted: Option<DrainHalt>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DrainHalt {
    pub id: i64,
    pub error: String,
}

impl OfflineQueue {
    pub fn new(pool: SqlitePool, replay_timeout: Duration) -> Self {
        Self {
            pool,
            drain_lock: Mutex::new(()),
            replay_timeout,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn enqueue(&self, action: &Action) -> Result<QueuedAction, sqlx::Error> {
        let row = db::queue::insert(&self.pool, action).await?;
        tracing::info!("Action {} enqueued for sync (id={})", action.kind(), row.id);
        Ok(row.into())
    }

    /// Replay stored actions in id order until the queue is empty or one fails.
    ///
    /// Drains never overlap; a second caller waits for the running drain.
    pub async fn drain<H>(&self, handler: &H) -> Result<DrainReport, sqlx::Error>
    where
        H: ReplayHandler + ?Sized,
    {
        let _guard = self.drain_lock.lock().await;
        let mut report = DrainReport::default();
        let mut last_id = 0;

        while let Some(row) = db::queue::next_after(&self.pool, last_id).await? {
            last_id = row.id;
            let entry = QueuedAction::from(row);

            let outcome = match entry.decode() {
                Decoded::Known(action) => self.replay_one(handler, &action).await.map(|()| true),
                Decoded::UnknownKind(kind) => {
                    tracing::warn!("Skipping queued action {} with unknown type '{kind}'", entry.id);
                    Ok(false)
                }
                Decoded::Malformed(error) => Err(error),
            };

            match outcome {
                Ok(replayed) => {
                    db::queue::delete(&self.pool, entry.id).await?;
                    if replayed {
                        tracing::info!("Action {} synced", entry.id);
                        report.replayed.push(entry.id);
                    } else {
                        report.skipped.push(entry.id);
                    }
                }
                Err(error) => {
                    tracing::warn!("Failed to sync action {}: {error}", entry.id);
                    report.halted = Some(DrainHalt {
                        id: entry.id,
                        error,
                    });
                    break;
                }
            }
        }

        report.remaining = db::queue::count(&self.pool).await?;
        Ok(report)
    }

    async fn replay_one<H>(&self, handler: &H, action: &Action) -> Result<(), String>
    where
        H: ReplayHandler + ?Sized,
    {
        match tokio::time::timeout(self.replay_timeout, handler.replay(action)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(e.message),
            Err(_) => Err(format!("Replay timed out after {:?}", self.replay_timeout)),
        }
    }

    pub async fn pending(&self) -> Result<Vec<QueuedAction>, sqlx::Error> {
        let rows = db::queue::list(&self.pool).await?;
        Ok(rows.into_iter().map(QueuedAction::from).collect())
    }

    pub async fn len(&self) -> Result<i64, sqlx::Error> {
        db::queue::count(&self.pool).await
    }

    pub async fn is_empty(&self) -> Result<bool, sqlx::Error> {
        Ok(self.len().await? == 0)
    }

    /// Manually drop one entry, e.g. a poisoned head that keeps failing.
    pub async fn remove(&self, id: i64) -> Result<bool, sqlx::Error> {
        let removed = db::queue::delete(&self.pool, id).await?;
        if removed {
            tracing::info!("Queued action {id} removed manually");
        }
        Ok(removed)
    }

    pub async fn clear(&self) -> Result<u64, sqlx::Error> {
        let removed = db::queue::delete_all(&self.pool).await?;
        tracing::info!("Offline queue cleared ({removed} actions)");
        Ok(removed)
    }
}
