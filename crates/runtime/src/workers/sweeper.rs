//! Periodic expiry sweep for a [`PositionCache`].

use std::sync::{Arc, Weak};
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

use crate::cache::PositionCache;

/// Worker that sweeps a cache on a fixed interval.
///
/// Holds only a weak reference, so it stops on its own once the cache is
/// dropped.
pub struct CacheSweeper<V> {
    cache: Weak<PositionCache<V>>,
    interval: Duration,
}

impl<V> CacheSweeper<V>
where
    V: Clone + Serialize + Send + Sync + 'static,
{
    pub fn new(cache: &Arc<PositionCache<V>>) -> Self {
        Self {
            cache: Arc::downgrade(cache),
            interval: cache.config().sweep_interval,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Spawns the worker on the current tokio runtime.
    pub fn spawn(self) -> SweeperHandle {
        SweeperHandle {
            handle: tokio::spawn(self.run()),
        }
    }

    /// Main worker loop
    pub async fn run(self) {
        info!("CacheSweeper started: interval={:?}", self.interval);

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let Some(cache) = self.cache.upgrade() else {
                debug!("Cache dropped, shutting down CacheSweeper");
                break;
            };
            let removed = cache.sweep_expired();
            if removed > 0 {
                debug!(removed, remaining = cache.len(), "CacheSweeper pass");
            }
        }
    }
}

/// Owns the sweeper task and aborts it on drop.
#[derive(Debug)]
pub struct SweeperHandle {
    handle: JoinHandle<()>,
}

impl SweeperHandle {
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn abort(&self) {
        self.handle.abort();
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
