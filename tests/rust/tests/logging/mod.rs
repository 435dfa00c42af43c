//! End-to-end tests for the logging service public contract

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Duration;
use pretty_assertions::assert_eq;

use loftlog_core::{
    Clock, FileSinkConfig, JsonLinesFileSink, LogCategory, LogContext, LogEntry, LogFilter,
    LogLevel, LoggerConfig, LoggingService, NoopBatchSink, TracingConsoleSink,
};
use tests::{
    settle, CapturingConsoleSink, FailingBatchSink, ManualClock, PanickingConsoleSink,
    RecordingBatchSink,
};

fn dev_service() -> Arc<LoggingService> {
    LoggingService::spawn(LoggerConfig::development())
}

#[tokio::test]
async fn append_order_equals_call_order() {
    let svc = dev_service();
    for i in 0..20 {
        svc.info(LogCategory::System, format!("entry {}", i));
    }

    let stats = svc.get_stats();
    assert_eq!(stats.total, 20);

    // Oldest entry comes last in the descending view
    let logs = svc.get_logs(&LogFilter::new(), 100);
    assert_eq!(logs.len(), 20);
    assert_eq!(logs.last().unwrap().message, "entry 0");
}

#[tokio::test]
async fn buffer_bound_triggers_automatic_flush() {
    let sink = RecordingBatchSink::new();
    let svc = LoggingService::spawn_with_sinks(
        LoggerConfig::production().with_max_buffer_size(5),
        Arc::new(TracingConsoleSink::new()),
        sink.clone(),
    );

    for i in 0..6 {
        svc.info(LogCategory::Api, format!("entry {}", i));
    }
    settle().await;

    assert!(svc.get_stats().total <= 5);
    assert_eq!(sink.batch_count(), 1);
    assert_eq!(sink.batches()[0].len(), 5);
    // The entry logged after the flush stays buffered
    assert_eq!(svc.get_stats().total, 1);
}

#[tokio::test]
async fn stats_contain_every_enum_key() {
    let svc = dev_service();

    // Empty buffer still reports all keys at zero
    let stats = svc.get_stats();
    assert_eq!(stats.total, 0);
    assert_eq!(stats.by_level.len(), LogLevel::ALL.len());
    assert_eq!(stats.by_category.len(), LogCategory::ALL.len());
    assert_eq!(stats.by_level[&LogLevel::Critical], 0);
    assert_eq!(stats.by_category[&LogCategory::Payment], 0);

    svc.warn(LogCategory::Validation, "check-in before check-out");
    let stats = svc.get_stats();
    assert_eq!(stats.by_level[&LogLevel::Warn], 1);
    assert_eq!(stats.by_category[&LogCategory::Validation], 1);
    assert_eq!(stats.by_category[&LogCategory::Payment], 0);
}

#[tokio::test]
async fn filters_are_exact_and_and_combined() {
    let svc = dev_service();
    svc.info(LogCategory::Api, "request served");
    svc.error(LogCategory::Database, "statement failed", None);

    let by_category = svc.get_recent(&LogFilter::new().with_category(LogCategory::Api));
    assert_eq!(by_category.len(), 1);
    assert_eq!(by_category[0].message, "request served");

    let by_level = svc.get_recent(&LogFilter::new().with_level(LogLevel::Error));
    assert_eq!(by_level.len(), 1);
    assert_eq!(by_level[0].message, "statement failed");
}

#[tokio::test]
async fn results_descend_by_timestamp() {
    let clock = ManualClock::new();
    let svc = LoggingService::spawn_with_parts(
        LoggerConfig::development(),
        Arc::new(TracingConsoleSink::new()),
        Arc::new(NoopBatchSink),
        clock.clone(),
    );

    svc.info(LogCategory::System, "first");
    clock.advance(Duration::seconds(1));
    svc.info(LogCategory::System, "second");
    clock.advance(Duration::seconds(1));
    svc.info(LogCategory::System, "third");

    let logs = svc.get_logs(&LogFilter::new(), 10);
    let messages: Vec<&str> = logs.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(messages, vec!["third", "second", "first"]);
}

#[tokio::test]
async fn critical_flushes_immediately_and_dispatches_out_of_band() {
    let sink = RecordingBatchSink::new();
    let svc = LoggingService::spawn_with_sinks(
        LoggerConfig::production(),
        Arc::new(TracingConsoleSink::new()),
        sink.clone(),
    );

    svc.info(LogCategory::System, "before");
    svc.critical(LogCategory::Payment, "charge double-booked", None);

    // Buffer empty without waiting for the periodic timer
    assert_eq!(svc.get_stats().total, 0);

    settle().await;

    // One single-entry out-of-band dispatch plus the forced flush batch
    assert_eq!(sink.batch_count(), 2);
    let batches = sink.batches();
    let single = batches.iter().find(|b| b.len() == 1).unwrap();
    assert_eq!(single[0].level, LogLevel::Critical);
    let flushed = batches.iter().find(|b| b.len() == 2).unwrap();
    assert_eq!(flushed[0].message, "before");
}

#[tokio::test]
async fn faulty_console_sink_never_reaches_the_caller() {
    let svc = LoggingService::spawn_with_sinks(
        LoggerConfig::development(),
        Arc::new(PanickingConsoleSink),
        Arc::new(NoopBatchSink),
    );

    let before = svc.get_stats().total;
    svc.info(LogCategory::System, "must not panic");
    assert_eq!(svc.get_stats().total, before + 1);
}

#[tokio::test]
async fn faulty_console_diagnostics_never_reach_the_caller() {
    // A buffer-full log call in development mode runs the flush (and its
    // console summary) synchronously on the caller's stack.
    let svc = LoggingService::spawn_with_sinks(
        LoggerConfig::development().with_max_buffer_size(1),
        Arc::new(PanickingConsoleSink),
        Arc::new(NoopBatchSink),
    );

    svc.info(LogCategory::System, "fills the buffer");
    assert_eq!(svc.get_stats().total, 0);

    // Same discipline on the forced critical flush
    svc.critical(LogCategory::Payment, "charge double-booked", None);
    assert_eq!(svc.get_stats().total, 0);
}

#[tokio::test]
async fn awkward_payloads_are_carried_verbatim() {
    let svc = dev_service();
    let deep = serde_json::json!({
        "a": {"b": {"c": {"d": [null, 1.5e308, "\u{0000}n\u{202e}"]}}},
        "": {"nested empty key": true},
    });
    svc.entry(LogLevel::Info, LogCategory::System, "odd payload")
        .data(deep)
        .emit();

    assert_eq!(svc.get_stats().total, 1);
}

#[tokio::test(start_paused = true)]
async fn periodic_timer_flushes_on_schedule() {
    tests::init_tracing();
    let sink = RecordingBatchSink::new();
    let svc = LoggingService::spawn_with_sinks(
        LoggerConfig::production().with_flush_interval(StdDuration::from_secs(30)),
        Arc::new(TracingConsoleSink::new()),
        sink.clone(),
    );
    settle().await;

    svc.info(LogCategory::System, "tick one");
    tokio::time::advance(StdDuration::from_secs(31)).await;
    settle().await;
    assert_eq!(sink.batch_count(), 1);

    // The schedule keeps going after a flush
    svc.info(LogCategory::System, "tick two");
    tokio::time::advance(StdDuration::from_secs(31)).await;
    settle().await;
    assert_eq!(sink.batch_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn shutdown_is_idempotent_and_stops_the_timer() {
    let sink = RecordingBatchSink::new();
    let svc = LoggingService::spawn_with_sinks(
        LoggerConfig::production().with_flush_interval(StdDuration::from_secs(30)),
        Arc::new(TracingConsoleSink::new()),
        sink.clone(),
    );
    settle().await;

    svc.info(LogCategory::System, "about to stop");
    svc.shutdown();
    svc.shutdown();
    settle().await;

    // The final flush carried the buffered entry
    assert_eq!(sink.batch_count(), 1);

    // Nothing fires after the interval elapses post-shutdown
    svc.info(LogCategory::System, "after shutdown");
    tokio::time::advance(StdDuration::from_secs(90)).await;
    settle().await;
    assert_eq!(sink.batch_count(), 1);
    assert_eq!(svc.get_stats().total, 1);
}

#[tokio::test]
async fn recent_errors_respect_the_sixty_minute_window() {
    let clock = ManualClock::new();
    let svc = LoggingService::spawn_with_parts(
        LoggerConfig::development(),
        Arc::new(TracingConsoleSink::new()),
        Arc::new(NoopBatchSink),
        clock.clone(),
    );

    svc.error(LogCategory::Database, "stale failure", None);
    clock.advance(Duration::minutes(2));
    svc.error(LogCategory::Database, "fresh failure", None);

    // 61 minutes after the first error, 59 after the second
    clock.advance(Duration::minutes(59));

    let stats = svc.get_stats();
    assert_eq!(stats.by_level[&LogLevel::Error], 2);
    assert_eq!(stats.recent_errors, 1);
}

#[tokio::test]
async fn unmatched_search_returns_empty() {
    let svc = dev_service();
    svc.info(LogCategory::Loft, "photo gallery updated");
    svc.info(LogCategory::Loft, "pricing updated");

    let logs = svc.get_recent(&LogFilter::new().with_search_term("zz-no-match"));
    assert!(logs.is_empty());

    // Case-insensitive positive match for contrast
    let logs = svc.get_recent(&LogFilter::new().with_search_term("PHOTO"));
    assert_eq!(logs.len(), 1);
}

#[tokio::test]
async fn time_range_filter_bounds_results() {
    let clock = ManualClock::new();
    let svc = LoggingService::spawn_with_parts(
        LoggerConfig::development(),
        Arc::new(TracingConsoleSink::new()),
        Arc::new(NoopBatchSink),
        clock.clone(),
    );

    svc.info(LogCategory::System, "too early");
    clock.advance(Duration::minutes(10));
    let window_start = clock.now();
    svc.info(LogCategory::System, "inside");
    clock.advance(Duration::minutes(10));
    let window_end = clock.now();
    clock.advance(Duration::minutes(10));
    svc.info(LogCategory::System, "too late");

    let filter = LogFilter {
        start_time: Some(window_start),
        end_time: Some(window_end),
        ..Default::default()
    };
    let logs = svc.get_recent(&filter);
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].message, "inside");
}

#[tokio::test]
async fn dispatch_failure_is_swallowed_and_reported() {
    let console = CapturingConsoleSink::new();
    let svc = LoggingService::spawn_with_sinks(
        LoggerConfig::production().with_max_buffer_size(2),
        console.clone(),
        Arc::new(FailingBatchSink),
    );

    svc.info(LogCategory::System, "one");
    svc.info(LogCategory::System, "two");
    settle().await;

    // The flush drained the buffer even though dispatch failed,
    // and the failure surfaced only as a console diagnostic.
    assert_eq!(svc.get_stats().total, 0);
    let notes = console.notes.lock().clone();
    assert!(notes.iter().any(|n| n.contains("batch dispatch failed")));

    // The service keeps working afterwards
    svc.info(LogCategory::System, "three");
    assert_eq!(svc.get_stats().total, 1);
}

#[tokio::test]
async fn context_filters_select_by_correlation_keys() {
    let svc = dev_service();
    svc.entry(LogLevel::Info, LogCategory::Loft, "availability changed")
        .context(LogContext::new().with_loft_id("loft-3"))
        .emit();
    svc.entry(LogLevel::Info, LogCategory::Loft, "availability changed")
        .context(LogContext::new().with_loft_id("loft-4"))
        .emit();

    let filter = LogFilter {
        loft_id: Some("loft-3".into()),
        ..Default::default()
    };
    let logs = svc.get_recent(&filter);
    assert_eq!(logs.len(), 1);
    assert_eq!(
        logs[0].context.as_ref().unwrap().loft_id.as_deref(),
        Some("loft-3")
    );
}

#[tokio::test]
async fn flushed_entries_land_in_the_file_sink_as_json_lines() {
    let temp_dir = tempfile::tempdir().unwrap();
    let sink = Arc::new(JsonLinesFileSink::new(FileSinkConfig {
        dir: temp_dir.path().to_path_buf(),
        ..Default::default()
    }));
    let svc = LoggingService::spawn_with_sinks(
        LoggerConfig::production(),
        Arc::new(TracingConsoleSink::new()),
        sink,
    );

    svc.info(LogCategory::Reservation, "reservation confirmed");
    svc.warn(LogCategory::Payment, "retrying charge");
    svc.flush();
    settle().await;
    // Spawned file I/O may need a moment beyond task yields
    tokio::time::sleep(StdDuration::from_millis(50)).await;

    let content = tokio::fs::read_to_string(temp_dir.path().join("current.log"))
        .await
        .unwrap();
    let entries: Vec<LogEntry> = content
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].message, "reservation confirmed");
    assert_eq!(entries[1].level, LogLevel::Warn);
}

#[tokio::test]
async fn clock_sanity() {
    let clock = ManualClock::new();
    let before = clock.now();
    clock.advance(Duration::seconds(5));
    assert_eq!(clock.now() - before, Duration::seconds(5));
}
