//! Background refresh: interval ticks, suspension, invalidation and failures.
//!
//! These run on a paused clock, so sleeps advance virtual time instantly.

mod helpers;

use async_trait::async_trait;
use bordereau_core::models::ScanQueueItem;
use bordereau_core::{ScanError, ScanResult};
use bordereau_scan::{PollSource, Poller, QueryClient, QueryKey, ScanQueueSource};
use helpers::fixtures::queue_item;
use helpers::{Call, FakeBackend};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const INTERVAL: Duration = Duration::from_secs(30);

struct CountingSource {
    fetches: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
}

#[async_trait]
impl PollSource for CountingSource {
    type Output = usize;

    fn key(&self) -> QueryKey {
        QueryKey::ScanQueue
    }

    async fn fetch(&self) -> ScanResult<usize> {
        let n = self.fetches.fetch_add(1, Ordering::SeqCst) + 1;
        if self.failing.load(Ordering::SeqCst) {
            return Err(ScanError::Transport("connection refused".to_string()));
        }
        Ok(n)
    }
}

/// Each fetch takes `FETCH_TIME` of (virtual) time.
struct SlowSource {
    fetches: Arc<AtomicUsize>,
}

const FETCH_TIME: Duration = Duration::from_secs(5);

#[async_trait]
impl PollSource for SlowSource {
    type Output = usize;

    fn key(&self) -> QueryKey {
        QueryKey::ScanQueue
    }

    async fn fetch(&self) -> ScanResult<usize> {
        let n = self.fetches.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(FETCH_TIME).await;
        Ok(n)
    }
}

fn counting() -> (CountingSource, Arc<AtomicUsize>, Arc<AtomicBool>) {
    let fetches = Arc::new(AtomicUsize::new(0));
    let failing = Arc::new(AtomicBool::new(false));
    let source = CountingSource {
        fetches: Arc::clone(&fetches),
        failing: Arc::clone(&failing),
    };
    (source, fetches, failing)
}

#[tokio::test(start_paused = true)]
async fn test_fetches_on_start_and_every_interval() {
    let (source, fetches, _) = counting();
    let poller = Poller::spawn(source, INTERVAL, &QueryClient::new());

    let first = poller.wait_for_generation(0).await.unwrap();
    assert_eq!(first.data, 1);

    tokio::time::sleep(INTERVAL * 2 + Duration::from_secs(1)).await;
    assert_eq!(fetches.load(Ordering::SeqCst), 3);
    assert_eq!(poller.latest().unwrap().generation, 3);
}

#[tokio::test(start_paused = true)]
async fn test_frozen_view_suspends_until_dropped() {
    let (source, fetches, _) = counting();
    let queries = QueryClient::new();
    let poller = Poller::spawn(source, INTERVAL, &queries);
    poller.wait_for_generation(0).await.unwrap();

    let view = poller.freeze();
    assert!(poller.is_frozen());
    tokio::time::sleep(INTERVAL * 3 + Duration::from_secs(5)).await;
    queries.invalidate(QueryKey::ScanQueue);
    poller.refresh();
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(fetches.load(Ordering::SeqCst), 1);

    drop(view);
    assert!(!poller.is_frozen());
    tokio::time::sleep(INTERVAL).await;
    assert_eq!(fetches.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_overlapping_frozen_views() {
    let (source, fetches, _) = counting();
    let poller = Poller::spawn(source, INTERVAL, &QueryClient::new());
    poller.wait_for_generation(0).await.unwrap();

    let first = poller.freeze();
    let second = poller.freeze();
    drop(first);
    tokio::time::sleep(INTERVAL * 2 + Duration::from_secs(5)).await;
    assert_eq!(fetches.load(Ordering::SeqCst), 1);

    drop(second);
    tokio::time::sleep(INTERVAL).await;
    assert_eq!(fetches.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_fetch_in_flight_when_frozen_is_discarded() {
    let fetches = Arc::new(AtomicUsize::new(0));
    let source = SlowSource {
        fetches: Arc::clone(&fetches),
    };
    let poller = Poller::spawn(source, INTERVAL, &QueryClient::new());
    poller.wait_for_generation(0).await.unwrap();

    // Second tick fires at 30 s and its fetch runs until 35 s.
    tokio::time::sleep(INTERVAL - FETCH_TIME + Duration::from_secs(2)).await;
    assert_eq!(fetches.load(Ordering::SeqCst), 2);
    let view = poller.freeze();
    tokio::time::sleep(FETCH_TIME * 2).await;

    let frozen = poller.latest().unwrap();
    assert_eq!(frozen.generation, 1);
    assert_eq!(frozen.data, 1);

    drop(view);
    let resumed = poller.wait_for_generation(1).await.unwrap();
    assert_eq!(resumed.generation, 2);
    assert_eq!(resumed.data, 3);
}

#[tokio::test(start_paused = true)]
async fn test_invalidation_right_after_spawn_is_not_lost() {
    let (source, fetches, _) = counting();
    let queries = QueryClient::new();
    let poller = Poller::spawn(source, Duration::from_secs(3600), &queries);
    queries.invalidate(QueryKey::ScanQueue);

    poller.wait_for_generation(0).await.unwrap();
    let second = tokio::time::timeout(Duration::from_secs(10), poller.wait_for_generation(1))
        .await
        .expect("invalidation sent before the task started was dropped")
        .unwrap();

    assert_eq!(second.generation, 2);
    assert_eq!(fetches.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_invalidation_triggers_refetch() {
    let (source, fetches, _) = counting();
    let queries = QueryClient::new();
    let poller = Poller::spawn(source, INTERVAL, &queries);
    poller.wait_for_generation(0).await.unwrap();

    queries.invalidate(QueryKey::RejectedBordereaux);
    queries.invalidate(QueryKey::ScanQueue);
    let snapshot = poller.wait_for_generation(1).await.unwrap();

    assert_eq!(snapshot.data, 2);
    assert_eq!(fetches.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_failed_refresh_keeps_previous_snapshot() {
    let (source, fetches, failing) = counting();
    let poller = Poller::spawn(source, INTERVAL, &QueryClient::new());
    poller.wait_for_generation(0).await.unwrap();

    failing.store(true, Ordering::SeqCst);
    tokio::time::sleep(INTERVAL + Duration::from_secs(1)).await;
    assert_eq!(fetches.load(Ordering::SeqCst), 2);
    let kept = poller.latest().unwrap();
    assert_eq!(kept.generation, 1);
    assert_eq!(kept.data, 1);

    failing.store(false, Ordering::SeqCst);
    let recovered = poller.wait_for_generation(1).await.unwrap();
    assert_eq!(recovered.data, 3);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_poller_stops_polling() {
    let (source, fetches, _) = counting();
    let poller = Poller::spawn(source, INTERVAL, &QueryClient::new());
    poller.wait_for_generation(0).await.unwrap();

    drop(poller);
    tokio::time::sleep(INTERVAL * 4).await;
    assert_eq!(fetches.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_scan_queue_source_polls_backend() {
    let backend = Arc::new(FakeBackend::new().with_queue(vec![queue_item("B1")]));
    let poller: Poller<Vec<ScanQueueItem>> = Poller::spawn(
        ScanQueueSource::new(Arc::clone(&backend)),
        INTERVAL,
        &QueryClient::new(),
    );

    let snapshot = poller.wait_for_generation(0).await.unwrap();
    assert_eq!(snapshot.data[0].id, "B1");
    assert_eq!(poller.key(), QueryKey::ScanQueue);

    poller.shutdown().await;
    tokio::time::sleep(INTERVAL * 2).await;
    assert_eq!(backend.count(|c| matches!(c, Call::ScanQueue)), 1);
}
