//! Shared test support: recording sinks and a manual clock
//!
//! The service takes its sinks and clock through injection, so these fakes
//! let tests assert on what was dispatched without real I/O and steer
//! wall-clock-dependent behavior deterministically.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_lot::Mutex;

use loftlog_core::{BatchSink, Clock, ConsoleSink, LogEntry, SinkError};

/// Batch sink that records every dispatched batch
#[derive(Default)]
pub struct RecordingBatchSink {
    batches: Mutex<Vec<Vec<LogEntry>>>,
}

impl RecordingBatchSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn batch_count(&self) -> usize {
        self.batches.lock().len()
    }

    pub fn total_entries(&self) -> usize {
        self.batches.lock().iter().map(|b| b.len()).sum()
    }

    pub fn batches(&self) -> Vec<Vec<LogEntry>> {
        self.batches.lock().clone()
    }
}

#[async_trait]
impl BatchSink for RecordingBatchSink {
    async fn dispatch(&self, entries: Vec<LogEntry>) -> Result<(), SinkError> {
        self.batches.lock().push(entries);
        Ok(())
    }
}

/// Batch sink that always fails
#[derive(Default)]
pub struct FailingBatchSink;

#[async_trait]
impl BatchSink for FailingBatchSink {
    async fn dispatch(&self, _entries: Vec<LogEntry>) -> Result<(), SinkError> {
        Err(SinkError::Dispatch("collector unreachable".to_string()))
    }
}

/// Console sink that captures emitted lines and notes
#[derive(Default)]
pub struct CapturingConsoleSink {
    pub lines: Mutex<Vec<String>>,
    pub notes: Mutex<Vec<String>>,
}

impl CapturingConsoleSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn line_count(&self) -> usize {
        self.lines.lock().len()
    }
}

impl ConsoleSink for CapturingConsoleSink {
    fn emit(&self, entry: &LogEntry) {
        self.lines.lock().push(format!(
            "{} [{}] {}",
            entry.timestamp.to_rfc3339(),
            entry.category.as_str().to_uppercase(),
            entry.message
        ));
    }

    fn note(&self, message: &str) {
        self.notes.lock().push(message.to_string());
    }
}

/// Console sink that panics on every emit
#[derive(Default)]
pub struct PanickingConsoleSink;

impl ConsoleSink for PanickingConsoleSink {
    fn emit(&self, _entry: &LogEntry) {
        panic!("console sink fault");
    }

    fn note(&self, _message: &str) {
        panic!("console sink note fault");
    }
}

/// Clock under test control
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new() -> Arc<Self> {
        Self::starting_at(Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap())
    }

    pub fn starting_at(start: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(start),
        })
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// Let spawned dispatch tasks run to completion
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

/// Opt-in tracing output for debugging test runs (`RUST_LOG=debug`)
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
