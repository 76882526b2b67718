//! Cancellable background refresh of a server-side list.
//!
//! A [`Poller`] owns one tokio task that refetches its [`PollSource`] on every tick of a
//! fixed interval and whenever the source's [`QueryKey`] is invalidated. Results are
//! published through a `watch` channel. A failed refresh is logged and the previous
//! snapshot stays in place; the next tick retries.
//!
//! While at least one [`FrozenView`] is alive, refreshes are skipped so a view showing
//! a point-in-time snapshot does not change underneath the user. A fetch already in
//! flight when the view is opened is discarded on arrival. Dropping the last
//! guard resumes polling on the next tick. Dropping the poller stops the task.

use crate::query::{QueryClient, QueryKey};
use async_trait::async_trait;
use bordereau_core::{ErrorMetadata, ScanResult};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Something a [`Poller`] can refetch.
#[async_trait]
pub trait PollSource: Send + Sync + 'static {
    type Output: Send + Sync + 'static;

    /// Invalidations of this key trigger an immediate refetch.
    fn key(&self) -> QueryKey;

    async fn fetch(&self) -> ScanResult<Self::Output>;
}

/// One successful fetch.
#[derive(Debug)]
pub struct Snapshot<T> {
    pub data: T,
    pub fetched_at: DateTime<Utc>,
    /// Increments with every successful fetch, starting at 1.
    pub generation: u64,
}

type SnapshotCell<T> = Option<Arc<Snapshot<T>>>;

pub struct Poller<T> {
    key: QueryKey,
    snapshots: watch::Receiver<SnapshotCell<T>>,
    frozen: Arc<watch::Sender<usize>>,
    refresh_tx: mpsc::Sender<()>,
    shutdown_tx: mpsc::Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl<T: Send + Sync + 'static> Poller<T> {
    /// Spawn the refresh task. The first fetch happens immediately.
    pub fn spawn<S>(source: S, interval: Duration, queries: &QueryClient) -> Self
    where
        S: PollSource<Output = T>,
    {
        let key = source.key();
        let (snapshot_tx, snapshots) = watch::channel(None);
        let (frozen, frozen_rx) = watch::channel(0usize);
        let (refresh_tx, refresh_rx) = mpsc::channel(1);
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let worker = PollWorker {
            source,
            interval,
            snapshot_tx,
            frozen_rx,
            generation: 0,
        };
        let invalidations = queries.subscribe();
        let handle = tokio::spawn(worker.run(invalidations, refresh_rx, shutdown_rx));

        tracing::info!(
            query = key.as_str(),
            interval_secs = interval.as_secs(),
            "Poller started"
        );

        Self {
            key,
            snapshots,
            frozen: Arc::new(frozen),
            refresh_tx,
            shutdown_tx,
            handle: Some(handle),
        }
    }

    pub fn key(&self) -> QueryKey {
        self.key
    }

    /// Latest successful snapshot, if any fetch has succeeded yet.
    pub fn latest(&self) -> Option<Arc<Snapshot<T>>> {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified on every new snapshot.
    pub fn subscribe(&self) -> watch::Receiver<SnapshotCell<T>> {
        self.snapshots.clone()
    }

    /// Wait for the next snapshot newer than `generation`.
    pub async fn wait_for_generation(&self, generation: u64) -> Option<Arc<Snapshot<T>>> {
        let mut rx = self.snapshots.clone();
        let result = rx
            .wait_for(|cell| cell.as_ref().is_some_and(|s| s.generation > generation))
            .await;
        match result {
            Ok(cell) => cell.clone(),
            Err(_) => None,
        }
    }

    /// Suspend refreshes until the returned guard (and every other live guard) is dropped.
    pub fn freeze(&self) -> FrozenView {
        self.frozen.send_modify(|count| *count += 1);
        tracing::debug!(query = self.key.as_str(), "Polling suspended");
        FrozenView {
            key: self.key,
            frozen: Arc::clone(&self.frozen),
        }
    }

    pub fn is_frozen(&self) -> bool {
        *self.frozen.borrow() > 0
    }

    /// Ask for a refetch now. Ignored while frozen, coalesced if one is already queued.
    pub fn refresh(&self) {
        let _ = self.refresh_tx.try_send(());
    }

    /// Stop the task and wait for it to exit.
    pub async fn shutdown(mut self) {
        let _ = self.shutdown_tx.send(()).await;
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl<T> Drop for Poller<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

/// Keeps a poller suspended while alive.
#[must_use = "polling resumes as soon as the guard is dropped"]
pub struct FrozenView {
    key: QueryKey,
    frozen: Arc<watch::Sender<usize>>,
}

impl Drop for FrozenView {
    fn drop(&mut self) {
        self.frozen
            .send_modify(|count| *count = count.saturating_sub(1));
        tracing::debug!(query = self.key.as_str(), "Polling resumed");
    }
}

struct PollWorker<S: PollSource> {
    source: S,
    interval: Duration,
    snapshot_tx: watch::Sender<SnapshotCell<S::Output>>,
    frozen_rx: watch::Receiver<usize>,
    generation: u64,
}

impl<S: PollSource> PollWorker<S> {
    async fn run(
        mut self,
        mut invalidations: broadcast::Receiver<QueryKey>,
        mut refresh_rx: mpsc::Receiver<()>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        let key = self.source.key();
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => break,
                _ = interval.tick() => self.refresh("tick").await,
                Some(()) = refresh_rx.recv() => self.refresh("manual").await,
                received = invalidations.recv() => match received {
                    Ok(invalidated) if invalidated == key => self.refresh("invalidated").await,
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!(query = key.as_str(), skipped, "Invalidations lagged");
                        self.refresh("invalidated").await;
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }

        tracing::info!(query = key.as_str(), "Poller stopped");
    }

    async fn refresh(&mut self, trigger: &'static str) {
        let key = self.source.key().as_str();
        if *self.frozen_rx.borrow() > 0 {
            tracing::debug!(query = key, trigger, "Refresh skipped while frozen");
            return;
        }

        match self.source.fetch().await {
            Ok(_) if *self.frozen_rx.borrow() > 0 => {
                tracing::debug!(query = key, trigger, "Frozen during fetch, result dropped");
            }
            Ok(data) => {
                self.generation += 1;
                let snapshot = Snapshot {
                    data,
                    fetched_at: Utc::now(),
                    generation: self.generation,
                };
                self.snapshot_tx.send_replace(Some(Arc::new(snapshot)));
                tracing::debug!(query = key, trigger, generation = self.generation, "Refreshed");
            }
            Err(e) => {
                tracing::warn!(
                    query = key,
                    trigger,
                    error_code = e.error_code(),
                    error = %e,
                    "Background refresh failed, keeping previous snapshot"
                );
            }
        }
    }
}
