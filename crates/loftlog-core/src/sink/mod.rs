//! Output ports for the logging service
//!
//! Two independent, injectable sinks: the console (synchronous, always on)
//! and an external batch destination (asynchronous, flush-driven). The clock
//! is a seam too so tests can steer timestamps.

mod console;
mod file;

pub use console::TracingConsoleSink;
pub use file::{FileSinkConfig, JsonLinesFileSink};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::LogEntry;

/// Sink-side failure
///
/// Never escapes the service: dispatch failures are reported on the console
/// and swallowed.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("dispatch failed: {0}")]
    Dispatch(String),
}

/// Synchronous console output port
///
/// One line per entry, mirrored at log time. Human-readable diagnostics
/// only; the exact format carries no stability guarantee beyond timestamp
/// and category being present.
pub trait ConsoleSink: Send + Sync {
    /// Mirror a single entry
    fn emit(&self, entry: &LogEntry);

    /// Best-effort internal diagnostic (flush summaries, dispatch failures)
    fn note(&self, message: &str);
}

/// Asynchronous batch output port
///
/// Receives buffer snapshots from flush (production mode) and single
/// critical entries out of band. Fire-and-forget from the service's point
/// of view.
#[async_trait]
pub trait BatchSink: Send + Sync {
    async fn dispatch(&self, entries: Vec<LogEntry>) -> Result<(), SinkError>;
}

/// Batch sink that discards everything (default seam)
#[derive(Debug, Default)]
pub struct NoopBatchSink;

#[async_trait]
impl BatchSink for NoopBatchSink {
    async fn dispatch(&self, _entries: Vec<LogEntry>) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Wall-clock seam
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// System wall clock
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
