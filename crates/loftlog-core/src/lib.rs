//! # Loftlog Core
//!
//! Buffered structured logging service for the Loftlog rental platform.
//!
//! Callers hand entries to a process-wide [`LoggingService`]; the service
//! stamps them with a timestamp, mirrors them to the console sink, buffers
//! them in memory, and flushes the buffer to an external batch sink
//! periodically, when the buffer bound is reached, and immediately on
//! critical severity. The live buffer answers filtered queries and
//! aggregate statistics.
//!
//! ## Modules
//!
//! - `domain` - Entry taxonomy, filter/statistics types, configuration
//! - `sink` - Output ports (console, batch) and the clock seam
//! - `service` - The `LoggingService` and caller facades
//!
//! ## Usage
//!
//! ```ignore
//! use loftlog_core::{LogCategory, LoggerConfig, LoggingService};
//!
//! let logs = LoggingService::spawn(LoggerConfig::default());
//! logs.info(LogCategory::System, "application started");
//! // ... on exit
//! logs.shutdown();
//! ```
//!
//! Logging is strictly best-effort: nothing inside this crate can fail a
//! caller's business operation or crash the host process.

pub mod domain;
pub mod service;
pub mod sink;

// Re-export commonly used types
pub use domain::*;
pub use service::*;
pub use sink::{
    BatchSink, Clock, ConsoleSink, FileSinkConfig, JsonLinesFileSink, NoopBatchSink, SinkError,
    SystemClock, TracingConsoleSink,
};
