//! Caller-facing facades
//!
//! Thin wrappers around the shared service that pre-fill category and
//! context fields for the busiest call sites.

use std::sync::Arc;

use crate::domain::{generate_request_id, LogCategory, LogContext};

use super::logger::LoggingService;

/// Reservation lifecycle logging
#[derive(Clone)]
pub struct ReservationLogger {
    service: Arc<LoggingService>,
}

impl ReservationLogger {
    pub fn new(service: Arc<LoggingService>) -> Self {
        Self { service }
    }

    /// Record a lifecycle action (created, confirmed, cancelled, ...)
    pub fn action(
        &self,
        action: &str,
        reservation_id: &str,
        user_id: Option<&str>,
        data: Option<serde_json::Value>,
    ) {
        self.service.log_reservation(action, reservation_id, user_id, data);
    }

    pub fn failed(
        &self,
        action: &str,
        reservation_id: &str,
        source: &(dyn std::error::Error + 'static),
    ) {
        self.service.error(
            LogCategory::Reservation,
            format!("Reservation {} failed for {}", action, reservation_id),
            Some(source),
        );
    }
}

/// HTTP request/response logging
#[derive(Clone)]
pub struct ApiLogger {
    service: Arc<LoggingService>,
}

impl ApiLogger {
    pub fn new(service: Arc<LoggingService>) -> Self {
        Self { service }
    }

    /// Log an incoming request and return its request ID (generated when the
    /// caller has none)
    pub fn request(&self, method: &str, path: &str, request_id: Option<&str>) -> String {
        let request_id = request_id
            .map(String::from)
            .unwrap_or_else(generate_request_id);
        self.service
            .entry(
                crate::domain::LogLevel::Info,
                LogCategory::Api,
                format!("{} {}", method, path),
            )
            .context(LogContext::new().with_request_id(request_id.clone()))
            .emit();
        request_id
    }

    /// Log a response; severity derives from the status (>= 400 warns)
    pub fn response(&self, method: &str, path: &str, status: u16, duration_ms: u64, request_id: &str) {
        self.service.log_api(
            method,
            path,
            status,
            duration_ms,
            Some(LogContext::new().with_request_id(request_id)),
        );
    }
}

/// Database operation logging
#[derive(Clone)]
pub struct DatabaseLogger {
    service: Arc<LoggingService>,
}

impl DatabaseLogger {
    pub fn new(service: Arc<LoggingService>) -> Self {
        Self { service }
    }

    pub fn query(&self, operation: &str, table: &str, duration_ms: u64) {
        self.service.log_database(operation, table, duration_ms, None);
    }

    pub fn query_failed(
        &self,
        operation: &str,
        table: &str,
        duration_ms: u64,
        source: &(dyn std::error::Error + 'static),
    ) {
        self.service
            .log_database(operation, table, duration_ms, Some(source));
    }
}
