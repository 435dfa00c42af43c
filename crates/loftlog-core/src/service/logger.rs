//! The logging service: buffered ingestion, periodic flush, query/statistics
//!
//! One instance per process, shared as `Arc<LoggingService>` through
//! dependency injection. Ingestion is synchronous and infallible; the only
//! asynchronous work is the fire-and-forget dispatch to the batch sink and
//! the background flush timer.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;

use crate::domain::{
    ErrorDetails, LogCategory, LogContext, LogEntry, LogFilter, LogLevel, LogStats, LoggerConfig,
    PerformanceMetrics, RuntimeMode,
};
use crate::sink::{BatchSink, Clock, ConsoleSink, NoopBatchSink, SystemClock, TracingConsoleSink};

/// Default `get_recent` result bound
pub const DEFAULT_QUERY_LIMIT: usize = 100;

/// Trailing window for `LogStats::recent_errors` (minutes)
const RECENT_ERROR_WINDOW_MINUTES: i64 = 60;

/// Structured logging service
///
/// Accepts entries from callers, stamps them with a timestamp, mirrors them
/// to the console sink synchronously, buffers them in memory, and flushes
/// the buffer to the batch sink periodically, on buffer-full, and on
/// critical severity. Logging is strictly best-effort: no fault inside the
/// service ever propagates to a caller.
pub struct LoggingService {
    config: LoggerConfig,
    buffer: Mutex<Vec<LogEntry>>,
    console: Arc<dyn ConsoleSink>,
    batch: Arc<dyn BatchSink>,
    clock: Arc<dyn Clock>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_done: AtomicBool,
}

impl LoggingService {
    /// Create the service with default sinks and start the flush timer
    ///
    /// Must be called within a tokio runtime; the timer runs until
    /// [`shutdown`](Self::shutdown).
    pub fn spawn(config: LoggerConfig) -> Arc<Self> {
        Self::spawn_with_sinks(
            config,
            Arc::new(TracingConsoleSink::new()),
            Arc::new(NoopBatchSink),
        )
    }

    /// Create the service with injected sinks and start the flush timer
    pub fn spawn_with_sinks(
        config: LoggerConfig,
        console: Arc<dyn ConsoleSink>,
        batch: Arc<dyn BatchSink>,
    ) -> Arc<Self> {
        Self::spawn_with_parts(config, console, batch, Arc::new(SystemClock))
    }

    /// Fully injected constructor (sinks and clock)
    pub fn spawn_with_parts(
        config: LoggerConfig,
        console: Arc<dyn ConsoleSink>,
        batch: Arc<dyn BatchSink>,
        clock: Arc<dyn Clock>,
    ) -> Arc<Self> {
        let (shutdown_tx, _) = watch::channel(false);
        let service = Arc::new(Self {
            config,
            buffer: Mutex::new(Vec::new()),
            console,
            batch,
            clock,
            shutdown_tx,
            shutdown_done: AtomicBool::new(false),
        });
        service.start_flush_timer();
        service
    }

    /// Background task flushing every `flush_interval` until shutdown
    fn start_flush_timer(self: &Arc<Self>) {
        let service = Arc::clone(self);
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let interval = self.config.flush_interval;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // The first tick resolves immediately
            ticker.tick().await;

            loop {
                tokio::select! {
                    // One failed flush must not stop the schedule
                    _ = ticker.tick() => {
                        let _ = catch_unwind(AssertUnwindSafe(|| service.flush()));
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }
        });
    }

    /// Start building an entry; terminal `emit()` appends it
    pub fn entry(
        &self,
        level: LogLevel,
        category: LogCategory,
        message: impl Into<String>,
    ) -> EntryBuilder<'_> {
        EntryBuilder {
            service: self,
            level,
            category,
            message: message.into(),
            context: None,
            data: None,
            error: None,
            performance: None,
            tags: Vec::new(),
        }
    }

    pub fn debug(&self, message: impl Into<String>) {
        self.entry(LogLevel::Debug, LogCategory::System, message).emit();
    }

    pub fn info(&self, category: LogCategory, message: impl Into<String>) {
        self.entry(LogLevel::Info, category, message).emit();
    }

    pub fn warn(&self, category: LogCategory, message: impl Into<String>) {
        self.entry(LogLevel::Warn, category, message).emit();
    }

    pub fn error(
        &self,
        category: LogCategory,
        message: impl Into<String>,
        source: Option<&(dyn std::error::Error + 'static)>,
    ) {
        let mut builder = self.entry(LogLevel::Error, category, message);
        if let Some(err) = source {
            builder = builder.error(self.error_details(err, LogLevel::Error));
        }
        builder.emit();
    }

    /// Log at critical severity; dispatches the entry to the batch sink out
    /// of band and forces a flush before returning
    pub fn critical(
        &self,
        category: LogCategory,
        message: impl Into<String>,
        source: Option<&(dyn std::error::Error + 'static)>,
    ) {
        let mut builder = self.entry(LogLevel::Critical, category, message);
        if let Some(err) = source {
            builder = builder.error(self.error_details(err, LogLevel::Critical));
        }
        builder.emit();
    }

    /// Backtraces are captured only in development mode or at Critical level
    fn error_details(&self, err: &(dyn std::error::Error + 'static), level: LogLevel) -> ErrorDetails {
        let include_stack = self.config.mode.is_development() || level == LogLevel::Critical;
        ErrorDetails::from_error(err, include_stack)
    }

    // --- Domain-shaped helpers -------------------------------------------

    pub fn log_reservation(
        &self,
        action: &str,
        reservation_id: &str,
        user_id: Option<&str>,
        data: Option<serde_json::Value>,
    ) {
        let mut context = LogContext::new()
            .with_reservation_id(reservation_id)
            .with_operation(action);
        context.user_id = user_id.map(String::from);

        let mut builder = self
            .entry(
                LogLevel::Info,
                LogCategory::Reservation,
                format!("Reservation {}", action),
            )
            .context(context);
        if let Some(data) = data {
            builder = builder.data(data);
        }
        builder.emit();
    }

    pub fn log_validation(&self, field: &str, reason: &str, value: Option<serde_json::Value>) {
        self.entry(
            LogLevel::Warn,
            LogCategory::Validation,
            format!("Validation failed for {}", field),
        )
        .data(serde_json::json!({
            "field": field,
            "reason": reason,
            "value": value,
        }))
        .emit();
    }

    pub fn log_database(
        &self,
        operation: &str,
        table: &str,
        duration_ms: u64,
        source: Option<&(dyn std::error::Error + 'static)>,
    ) {
        let level = if source.is_some() {
            LogLevel::Error
        } else {
            LogLevel::Info
        };
        let mut builder = self
            .entry(level, LogCategory::Database, format!("{} on {}", operation, table))
            .context(LogContext::new().with_operation(operation))
            .data(serde_json::json!({"table": table}))
            .performance(PerformanceMetrics::from_duration_ms(duration_ms));
        if let Some(err) = source {
            builder = builder.error(self.error_details(err, level));
        }
        builder.emit();
    }

    /// Severity derives from the HTTP status: >= 400 logs at warn
    pub fn log_api(
        &self,
        method: &str,
        path: &str,
        status: u16,
        duration_ms: u64,
        context: Option<LogContext>,
    ) {
        let level = if status >= 400 {
            LogLevel::Warn
        } else {
            LogLevel::Info
        };
        let mut builder = self
            .entry(level, LogCategory::Api, format!("{} {} -> {}", method, path, status))
            .data(serde_json::json!({
                "method": method,
                "path": path,
                "status": status,
            }))
            .performance(PerformanceMetrics::from_duration_ms(duration_ms));
        if let Some(context) = context {
            builder = builder.context(context);
        }
        builder.emit();
    }

    pub fn log_performance(&self, operation: &str, duration_ms: u64, memory_usage: Option<u64>) {
        self.entry(
            LogLevel::Info,
            LogCategory::Performance,
            format!("{} completed", operation),
        )
        .context(LogContext::new().with_operation(operation))
        .performance(PerformanceMetrics {
            duration_ms,
            memory_usage,
            cpu_usage: None,
        })
        .emit();
    }

    /// Security entries carry the `"security"` tag
    pub fn log_security(
        &self,
        event: &str,
        level: LogLevel,
        context: Option<LogContext>,
        data: Option<serde_json::Value>,
    ) {
        let mut builder = self
            .entry(level, LogCategory::Security, event)
            .tag("security");
        if let Some(context) = context {
            builder = builder.context(context);
        }
        if let Some(data) = data {
            builder = builder.data(data);
        }
        builder.emit();
    }

    // --- Ingestion --------------------------------------------------------

    /// Append a finished entry: console mirror, buffer, bound/critical flush
    fn record(&self, entry: LogEntry) {
        // Debug lines are suppressed on the console outside development;
        // the buffer still receives the entry either way.
        if entry.level != LogLevel::Debug || self.config.mode.is_development() {
            // A faulty console sink must not take down the caller
            let _ = catch_unwind(AssertUnwindSafe(|| self.console.emit(&entry)));
        }

        let critical = entry.level == LogLevel::Critical;
        if critical {
            self.dispatch_out_of_band(entry.clone());
        }

        let reached_bound = {
            let mut buffer = self.buffer.lock();
            buffer.push(entry);
            buffer.len() >= self.config.max_buffer_size
        };

        if reached_bound || critical {
            self.flush();
        }
    }

    /// Console diagnostic shielded like `emit`: a faulty sink must not take
    /// down the caller
    fn note_safely(&self, message: &str) {
        let _ = catch_unwind(AssertUnwindSafe(|| self.console.note(message)));
    }

    /// Immediate single-entry dispatch for critical severity, in addition to
    /// the periodic batch path
    fn dispatch_out_of_band(&self, entry: LogEntry) {
        let sink = Arc::clone(&self.batch);
        let console = Arc::clone(&self.console);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = sink.dispatch(vec![entry]).await {
                        console.note(&format!("critical dispatch failed: {}", e));
                    }
                });
            }
            Err(_) => self.note_safely("critical dispatch skipped: no async runtime"),
        }
    }

    /// Snapshot and clear the buffer in one synchronous step, then hand the
    /// snapshot to exactly one dispatch path
    ///
    /// Entries logged while a dispatch is in flight land in the fresh buffer
    /// and are neither lost nor double-flushed. A flush with an empty buffer
    /// is a no-op. Dispatch failures are reported on the console and
    /// swallowed.
    pub fn flush(&self) {
        let snapshot = {
            let mut buffer = self.buffer.lock();
            if buffer.is_empty() {
                return;
            }
            std::mem::take(&mut *buffer)
        };

        match self.config.mode {
            RuntimeMode::Production => {
                let count = snapshot.len();
                let sink = Arc::clone(&self.batch);
                let console = Arc::clone(&self.console);
                match tokio::runtime::Handle::try_current() {
                    Ok(handle) => {
                        handle.spawn(async move {
                            if let Err(e) = sink.dispatch(snapshot).await {
                                console.note(&format!(
                                    "batch dispatch failed ({} entries): {}",
                                    count, e
                                ));
                            }
                        });
                    }
                    Err(_) => self.note_safely(&format!(
                        "batch dispatch skipped ({} entries): no async runtime",
                        count
                    )),
                }
            }
            RuntimeMode::Development => {
                self.note_safely(&format!("flushed {} entries", snapshot.len()));
            }
        }
    }

    // --- Read side --------------------------------------------------------

    /// Query the live buffer; results descend by timestamp, truncated to
    /// `limit`
    pub fn get_logs(&self, filter: &LogFilter, limit: usize) -> Vec<LogEntry> {
        let mut matched: Vec<LogEntry> = {
            let buffer = self.buffer.lock();
            buffer.iter().filter(|e| filter.matches(e)).cloned().collect()
        };
        matched.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        matched.truncate(limit);
        matched
    }

    /// `get_logs` with the default limit of 100
    pub fn get_recent(&self, filter: &LogFilter) -> Vec<LogEntry> {
        self.get_logs(filter, DEFAULT_QUERY_LIMIT)
    }

    /// Single-pass aggregate statistics over the live buffer
    ///
    /// Every level and category key is present even at zero;
    /// `recent_errors` counts Error/Critical entries within the trailing
    /// 60 minutes.
    pub fn get_stats(&self) -> LogStats {
        let cutoff = self.clock.now() - chrono::Duration::minutes(RECENT_ERROR_WINDOW_MINUTES);
        let buffer = self.buffer.lock();

        let mut stats = LogStats::empty();
        for entry in buffer.iter() {
            stats.total += 1;
            *stats.by_level.entry(entry.level).or_insert(0) += 1;
            *stats.by_category.entry(entry.category).or_insert(0) += 1;
            if entry.is_error() && entry.timestamp > cutoff {
                stats.recent_errors += 1;
            }
        }
        stats
    }

    /// Empty the buffer without flushing (test/maintenance use)
    pub fn clear(&self) {
        self.buffer.lock().clear();
    }

    /// Stop the flush timer and perform one final flush; idempotent
    pub fn shutdown(&self) {
        if self.shutdown_done.swap(true, Ordering::SeqCst) {
            return;
        }
        let _ = self.shutdown_tx.send(true);
        self.flush();
    }

    pub(crate) fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }
}

/// Builder returned by [`LoggingService::entry`]
///
/// The timestamp is stamped at `emit()`, not at builder creation.
pub struct EntryBuilder<'a> {
    service: &'a LoggingService,
    level: LogLevel,
    category: LogCategory,
    message: String,
    context: Option<LogContext>,
    data: Option<serde_json::Value>,
    error: Option<ErrorDetails>,
    performance: Option<PerformanceMetrics>,
    tags: Vec<String>,
}

impl EntryBuilder<'_> {
    pub fn context(mut self, context: LogContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn error(mut self, error: ErrorDetails) -> Self {
        self.error = Some(error);
        self
    }

    pub fn performance(mut self, performance: PerformanceMetrics) -> Self {
        self.performance = Some(performance);
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Stamp the timestamp and append the entry; never fails outward
    pub fn emit(self) {
        let mut entry = LogEntry::new(
            self.service.clock().now(),
            self.level,
            self.category,
            self.message,
        );
        entry.context = self.context;
        entry.data = self.data;
        entry.error = self.error;
        entry.performance = self.performance;
        if !self.tags.is_empty() {
            entry.tags = Some(self.tags);
        }
        self.service.record(entry);
    }
}
