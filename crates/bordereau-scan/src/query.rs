//! Server-state cache keys and invalidation.
//!
//! The client never patches cached lists after a mutation. It publishes the affected
//! key instead, and every subscriber (usually a [`crate::Poller`]) refetches from the
//! server.

use tokio::sync::broadcast;

const INVALIDATION_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    ScanQueue,
    RejectedBordereaux,
    CompletedScans,
}

impl QueryKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKey::ScanQueue => "scan_queue",
            QueryKey::RejectedBordereaux => "rejected_bordereaux",
            QueryKey::CompletedScans => "completed_scans",
        }
    }
}

/// Handle used to publish and observe invalidations. Clones share one channel.
#[derive(Debug, Clone)]
pub struct QueryClient {
    tx: broadcast::Sender<QueryKey>,
}

impl QueryClient {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(INVALIDATION_CAPACITY);
        Self { tx }
    }

    /// Mark `key` stale. Having no subscriber is fine.
    pub fn invalidate(&self, key: QueryKey) {
        let receivers = self.tx.send(key).unwrap_or(0);
        tracing::debug!(query = key.as_str(), receivers, "Query invalidated");
    }

    pub fn invalidate_all(&self, keys: &[QueryKey]) {
        for key in keys {
            self.invalidate(*key);
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<QueryKey> {
        self.tx.subscribe()
    }
}

impl Default for QueryClient {
    fn default() -> Self {
        Self::new()
    }
}
