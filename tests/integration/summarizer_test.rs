//! Summary Scheduler Integration Tests
//!
//! Verifies the compression trigger policy against a real store and fake
//! summarizers: exact trigger counts, the minimum-interval floor, and
//! failure isolation.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use draftmate_core::services::memory::store::ProjectMemoryStore;
use draftmate_core::{AppError, AppResult, ChatTurn, MemorySettings, SummaryScheduler, Summarizer};

/// Summarizer that counts invocations and returns a versioned summary
struct CountingSummarizer {
    calls: AtomicUsize,
}

impl CountingSummarizer {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Summarizer for CountingSummarizer {
    async fn summarize(&self, _existing: &str, _turns: &[ChatTurn]) -> AppResult<String> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("summary v{}", n))
    }
}

/// Summarizer that always fails
struct FailingSummarizer;

#[async_trait]
impl Summarizer for FailingSummarizer {
    async fn summarize(&self, _existing: &str, _turns: &[ChatTurn]) -> AppResult<String> {
        Err(AppError::llm("model unavailable"))
    }
}

async fn open_store(tmp: &tempfile::TempDir) -> Arc<ProjectMemoryStore> {
    Arc::new(
        ProjectMemoryStore::open(tmp.path().join("memory"))
            .await
            .unwrap(),
    )
}

/// Append one user+assistant exchange and notify the scheduler
async fn exchange(
    store: &Arc<ProjectMemoryStore>,
    scheduler: &SummaryScheduler,
    settings: &MemorySettings,
    i: usize,
) {
    store
        .append_turn(&ChatTurn::new("user", format!("question {}", i), "m"))
        .await
        .unwrap();
    store
        .append_turn(&ChatTurn::new("assistant", format!("answer {}", i), "m"))
        .await
        .unwrap();
    scheduler.on_pair_appended(settings).await;
}

#[tokio::test]
async fn test_compression_fires_exactly_once_per_threshold() {
    let tmp = tempfile::tempdir().unwrap();
    let store = open_store(&tmp).await;
    let summarizer = CountingSummarizer::new();
    let scheduler = SummaryScheduler::new(store.clone(), summarizer.clone());

    let settings = MemorySettings {
        summarize_every_n_turns: 12,
        ..Default::default()
    };

    // 24 turns = 12 exchanges: compression after the 6th and 12th
    for i in 0..12 {
        exchange(&store, &scheduler, &settings, i).await;
    }

    assert_eq!(summarizer.calls(), 2);
    assert_eq!(store.load_summary().await, "summary v2");
    assert_eq!(scheduler.pending_turns(), 0);
}

#[tokio::test]
async fn test_no_compression_below_threshold() {
    let tmp = tempfile::tempdir().unwrap();
    let store = open_store(&tmp).await;
    let summarizer = CountingSummarizer::new();
    let scheduler = SummaryScheduler::new(store.clone(), summarizer.clone());

    let settings = MemorySettings {
        summarize_every_n_turns: 12,
        ..Default::default()
    };

    for i in 0..5 {
        exchange(&store, &scheduler, &settings, i).await;
    }

    assert_eq!(summarizer.calls(), 0);
    assert_eq!(scheduler.pending_turns(), 10);
    assert_eq!(store.load_summary().await, "");
}

#[tokio::test]
async fn test_threshold_floor_guards_tiny_settings() {
    let tmp = tempfile::tempdir().unwrap();
    let store = open_store(&tmp).await;
    let summarizer = CountingSummarizer::new();
    let scheduler = SummaryScheduler::new(store.clone(), summarizer.clone());

    // A configured threshold of 0 still compresses only every 4 turns
    let settings = MemorySettings {
        summarize_every_n_turns: 0,
        ..Default::default()
    };

    exchange(&store, &scheduler, &settings, 0).await;
    assert_eq!(summarizer.calls(), 0);

    exchange(&store, &scheduler, &settings, 1).await;
    assert_eq!(summarizer.calls(), 1);

    exchange(&store, &scheduler, &settings, 2).await;
    assert_eq!(summarizer.calls(), 1);

    exchange(&store, &scheduler, &settings, 3).await;
    assert_eq!(summarizer.calls(), 2);
}

#[tokio::test]
async fn test_failed_compression_keeps_previous_summary() {
    let tmp = tempfile::tempdir().unwrap();
    let store = open_store(&tmp).await;
    store.save_summary("the good summary").await.unwrap();

    let scheduler = SummaryScheduler::new(store.clone(), Arc::new(FailingSummarizer));
    let settings = MemorySettings {
        summarize_every_n_turns: 4,
        ..Default::default()
    };

    for i in 0..2 {
        exchange(&store, &scheduler, &settings, i).await;
    }

    // The failure is swallowed and the stored summary is untouched
    assert_eq!(store.load_summary().await, "the good summary");
    // The counter was still reset, so the next window is a fresh one
    assert_eq!(scheduler.pending_turns(), 0);
}

#[tokio::test]
async fn test_compression_skipped_on_empty_conversation() {
    let tmp = tempfile::tempdir().unwrap();
    let store = open_store(&tmp).await;
    let summarizer = CountingSummarizer::new();
    let scheduler = SummaryScheduler::new(store.clone(), summarizer.clone());

    let settings = MemorySettings {
        summarize_every_n_turns: 4,
        ..Default::default()
    };

    // Notify without actually appending turns — nothing to compress
    scheduler.on_pair_appended(&settings).await;
    scheduler.on_pair_appended(&settings).await;

    assert_eq!(summarizer.calls(), 0);
    assert_eq!(store.load_summary().await, "");
}
