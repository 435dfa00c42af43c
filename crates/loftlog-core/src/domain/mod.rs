//! Domain types for the logging service
//!
//! - Entry taxonomy (`LogLevel`, `LogCategory`) and the immutable `LogEntry`
//! - Query types (`LogFilter`, `LogStats`)
//! - Service configuration (`LoggerConfig`, `RuntimeMode`)

mod config;
mod entry;
mod filter;

pub use config::{LoggerConfig, RuntimeMode};
pub use entry::{
    generate_request_id, ErrorDetails, LogCategory, LogContext, LogEntry, LogLevel,
    PerformanceMetrics,
};
pub use filter::{LogFilter, LogStats};
