//! Log entry types and the level/category taxonomy

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Log entry (serialized as JSON Lines)
///
/// Immutable once constructed: the service stamps the timestamp at append
/// time and never mutates an entry afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Timestamp (ISO 8601), assigned by the service
    #[serde(rename = "ts")]
    pub timestamp: DateTime<Utc>,

    /// Severity level
    #[serde(rename = "lvl")]
    pub level: LogLevel,

    /// Subject-area classification
    #[serde(rename = "cat")]
    pub category: LogCategory,

    /// Message
    #[serde(rename = "msg")]
    pub message: String,

    /// Correlation context (request/user/trace identifiers)
    #[serde(rename = "ctx", skip_serializing_if = "Option::is_none")]
    pub context: Option<LogContext>,

    /// Free-form structured payload
    #[serde(rename = "data", skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    /// Structured error descriptor
    #[serde(rename = "err", skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetails>,

    /// Timing/resource measurements
    #[serde(rename = "perf", skip_serializing_if = "Option::is_none")]
    pub performance: Option<PerformanceMetrics>,

    /// Free-text labels
    #[serde(rename = "tags", skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl LogEntry {
    /// Create a new entry with the given timestamp
    pub fn new(
        timestamp: DateTime<Utc>,
        level: LogLevel,
        category: LogCategory,
        message: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            level,
            category,
            message: message.into(),
            context: None,
            data: None,
            error: None,
            performance: None,
            tags: None,
        }
    }

    pub fn with_context(mut self, context: LogContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_error(mut self, error: ErrorDetails) -> Self {
        self.error = Some(error);
        self
    }

    pub fn with_performance(mut self, performance: PerformanceMetrics) -> Self {
        self.performance = Some(performance);
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.get_or_insert_with(Vec::new).push(tag.into());
        self
    }

    /// Request ID for console display, empty string when absent
    pub fn request_id(&self) -> &str {
        self.context
            .as_ref()
            .and_then(|c| c.request_id.as_deref())
            .unwrap_or("")
    }

    /// Whether the entry counts as an error for statistics purposes
    pub fn is_error(&self) -> bool {
        matches!(self.level, LogLevel::Error | LogLevel::Critical)
    }
}

/// Log level (ordered severity)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
    Critical,
}

impl LogLevel {
    /// Every level, in ascending severity order
    pub const ALL: [LogLevel; 5] = [
        Self::Debug,
        Self::Info,
        Self::Warn,
        Self::Error,
        Self::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" => Some(Self::Warn),
            "error" => Some(Self::Error),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

/// Subject-area classification (closed set)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LogCategory {
    Reservation,
    Loft,
    Validation,
    Database,
    Api,
    Authentication,
    Payment,
    Performance,
    Security,
    System,
}

impl LogCategory {
    pub const ALL: [LogCategory; 10] = [
        Self::Reservation,
        Self::Loft,
        Self::Validation,
        Self::Database,
        Self::Api,
        Self::Authentication,
        Self::Payment,
        Self::Performance,
        Self::Security,
        Self::System,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reservation => "reservation",
            Self::Loft => "loft",
            Self::Validation => "validation",
            Self::Database => "database",
            Self::Api => "api",
            Self::Authentication => "authentication",
            Self::Payment => "payment",
            Self::Performance => "performance",
            Self::Security => "security",
            Self::System => "system",
        }
    }
}

/// Correlation bag attached to an entry
///
/// Opaque to the service: never validated, only carried and used as filter
/// keys. All fields optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loft_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reservation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span_id: Option<String>,
}

impl LogContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_loft_id(mut self, loft_id: impl Into<String>) -> Self {
        self.loft_id = Some(loft_id.into());
        self
    }

    pub fn with_reservation_id(mut self, reservation_id: impl Into<String>) -> Self {
        self.reservation_id = Some(reservation_id.into());
        self
    }

    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }
}

/// Structured error descriptor carried on error/critical entries
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorDetails {
    pub name: String,
    pub message: String,
    /// Populated only in development mode or at Critical level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ErrorDetails {
    /// Capture details from a source error
    ///
    /// `include_stack` controls whether a backtrace is recorded; it is elided
    /// in production-shaped output below Critical.
    pub fn from_error(err: &(dyn std::error::Error + 'static), include_stack: bool) -> Self {
        let stack = include_stack
            .then(|| std::backtrace::Backtrace::force_capture().to_string());
        Self {
            name: "Error".to_string(),
            message: err.to_string(),
            stack,
            code: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// Timing and resource measurements
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerformanceMetrics {
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_usage: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_usage: Option<f64>,
}

impl PerformanceMetrics {
    pub fn from_duration_ms(duration_ms: u64) -> Self {
        Self {
            duration_ms,
            memory_usage: None,
            cpu_usage: None,
        }
    }
}

/// Process-wide counter for request ID generation
static REQUEST_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a short, unique request ID
/// Format: 6 hex characters (e.g., "a1b2c3")
pub fn generate_request_id() -> String {
    let counter = REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed);
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0);

    // Mix counter and timestamp for uniqueness
    let mixed = counter.wrapping_add(timestamp);
    format!("{:06x}", mixed & 0xFFFFFF)
}
