use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};

/// Tracks whether the remote side is reachable.
///
/// The signal is online only when the link flag is up and the last probe got
/// an HTTP response back. Subscribers see every change through a watch channel.
pub struct Connectivity {
    link_up: AtomicBool,
    online: watch::Sender<bool>,
    check_lock: Mutex<()>,
    client: reqwest::Client,
    probe_url: String,
    interval: Duration,
}

impl Connectivity {
    pub fn new(probe_url: &str, interval: Duration, timeout: Duration) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| format!("Failed to build probe client: {e}"))?;

        let (online, _) = watch::channel(false);

        Ok(Self {
            link_up: AtomicBool::new(true),
            online,
            check_lock: Mutex::new(()),
            client,
            probe_url: probe_url.to_string(),
            interval,
        })
    }

    pub fn is_online(&self) -> bool {
        *self.online.borrow()
    }

    pub fn link_up(&self) -> bool {
        self.link_up.load(Ordering::SeqCst)
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.online.subscribe()
    }

    /// Raise or drop the link flag and re-evaluate immediately.
    pub async fn set_link(&self, up: bool) -> bool {
        self.link_up.store(up, Ordering::SeqCst);
        tracing::info!("Link marked {}", if up { "up" } else { "down" });
        if !up {
            // Offline right away, even while a probe is still in flight.
            self.publish(false);
        }
        self.check().await
    }

    /// Probe now and publish the result. Returns the new state.
    ///
    /// Checks run one at a time, so a slow probe cannot publish after a newer one.
    pub async fn check(&self) -> bool {
        let _guard = self.check_lock.lock().await;
        let reachable = self.link_up() && self.probe().await;
        // The link may have dropped while the probe was in flight.
        let online = reachable && self.link_up();

        self.publish(online);
        online
    }

    fn publish(&self, online: bool) {
        let changed = self.online.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        });
        if changed {
            tracing::info!("Connectivity status: {}", if online { "online" } else { "offline" });
        }
    }

    async fn probe(&self) -> bool {
        match self.client.get(&self.probe_url).send().await {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!("Connectivity probe to {} failed: {e}", self.probe_url);
                false
            }
        }
    }
}

/// Probe periodically until shutdown is signaled.
pub async fn run(connectivity: Arc<Connectivity>, mut shutdown: watch::Receiver<bool>) {
    tracing::debug!("Connectivity prober started");

    loop {
        if *shutdown.borrow() {
            break;
        }

        connectivity.check().await;

        tokio::select! {
            _ = tokio::time::sleep(connectivity.interval) => {}
            _ = shutdown.changed() => {}
        }
    }

    tracing::debug!("Connectivity prober stopped");
}
