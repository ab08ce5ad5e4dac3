// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Periodic background sweep of expired graphs

use log::{debug, warn};
use std::sync::Weak;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::GraphCacheManager;

/// Owner side of a running sweep task
///
/// Dropping the handle closes the shutdown channel, which also ends the task.
pub(crate) struct SweeperHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// Spawn the sweep loop; the first sweep runs one `period` after start
pub(crate) fn spawn<G: Send + Sync + 'static>(
    runtime: &Handle,
    cache: Weak<GraphCacheManager<G>>,
    period: Duration,
) -> SweeperHandle {
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

    let task = runtime.spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        debug!("Graph cache sweep received shutdown signal");
                        break;
                    }
                }

                _ = ticker.tick() => {
                    let Some(cache) = cache.upgrade() else {
                        debug!("Graph cache dropped, stopping sweep");
                        break;
                    };

                    cache.record_background_tick();
                    let removed = cache.sweep_expired();
                    if removed > 0 {
                        debug!(
                            "Sweep removed {} expired graphs ({} remaining)",
                            removed,
                            cache.size()
                        );
                    }
                }
            }
        }
    });

    SweeperHandle { shutdown_tx, task }
}

impl SweeperHandle {
    #[cfg(test)]
    pub(crate) fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Signal the task, wait up to `grace` for it to finish, then abort it
    pub(crate) async fn stop(self, grace: Duration) {
        let SweeperHandle {
            shutdown_tx,
            mut task,
        } = self;

        // The receiver is gone if the task already exited
        let _ = shutdown_tx.send(true);

        match tokio::time::timeout(grace, &mut task).await {
            Ok(Ok(())) => debug!("Graph cache sweep stopped"),
            Ok(Err(e)) => warn!("Graph cache sweep ended abnormally: {}", e),
            Err(_) => {
                warn!(
                    "Graph cache sweep did not stop within {:?}, aborting",
                    grace
                );
                task.abort();
            }
        }
    }
}
