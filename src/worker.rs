use tokio::sync::watch;

use crate::queue::{DrainReport, OfflineQueue};
use crate::replay::ReplayHandler;
use crate::state::SharedState;

/// Drain the queue every time connectivity comes back, and retry on every
/// tick while online with entries left, until shutdown is signaled.
pub async fn run(state: SharedState, mut shutdown: watch::Receiver<bool>) {
    let mut online = state.connectivity.subscribe();
    let mut retry = tokio::time::interval(state.config.probe_interval);
    retry.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    retry.tick().await;
    tracing::debug!("Sync worker started");

    loop {
        if *shutdown.borrow() {
            break;
        }

        if *online.borrow_and_update() && has_pending(&state.queue).await {
            let _ = sync_once(&state.queue, state.replayer.as_ref()).await;
        }

        tokio::select! {
            _ = retry.tick() => {}
            changed = online.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = shutdown.changed() => {}
        }
    }

    tracing::debug!("Sync worker stopped");
}

async fn has_pending(queue: &OfflineQueue) -> bool {
    match queue.is_empty().await {
        Ok(empty) => !empty,
        Err(e) => {
            tracing::error!("Failed to read queue length: {e}");
            false
        }
    }
}

/// Run one drain and log its outcome. Storage errors are logged, not propagated.
pub async fn sync_once(queue: &OfflineQueue, replayer: &dyn ReplayHandler) -> Option<DrainReport> {
    match queue.drain(replayer).await {
        Ok(report) => {
            if let Some(halt) = &report.halted {
                tracing::warn!(
                    "Sync halted at action {} ({} replayed, {} remaining): {}",
                    halt.id,
                    report.replayed.len(),
                    report.remaining,
                    halt.error
                );
            } else if !report.replayed.is_empty() || !report.skipped.is_empty() {
                tracing::info!(
                    "Sync complete: {} replayed, {} skipped",
                    report.replayed.len(),
                    report.skipped.len()
                );
            }
            Some(report)
        }
        Err(e) => {
            tracing::error!("Sync failed: {e}");
            None
        }
    }
}
