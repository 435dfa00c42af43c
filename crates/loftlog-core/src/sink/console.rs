//! Default console sink backed by `tracing`

use tracing::{debug, error, info, warn};

use super::ConsoleSink;
use crate::domain::{LogEntry, LogLevel};

/// Console sink that routes entries to the `tracing` macros
///
/// Level mapping: debug → `debug!`, info → `info!`, warn → `warn!`,
/// error → `error!` (with the error descriptor if present, else the data
/// payload), critical → `error!` with a distinguishing prefix.
#[derive(Debug, Default)]
pub struct TracingConsoleSink;

impl TracingConsoleSink {
    pub fn new() -> Self {
        Self
    }

    /// `"<timestamp> [<CATEGORY>] [<request_id>] <message>"`
    fn format_line(entry: &LogEntry) -> String {
        format!(
            "{} [{}] [{}] {}",
            entry.timestamp.to_rfc3339(),
            entry.category.as_str().to_uppercase(),
            entry.request_id(),
            entry.message
        )
    }

    /// Serialize the structured payload, falling back on a marker when it
    /// cannot be rendered
    fn format_payload(value: &impl serde::Serialize) -> String {
        serde_json::to_string(value).unwrap_or_else(|_| "[unserializable payload]".to_string())
    }
}

impl ConsoleSink for TracingConsoleSink {
    fn emit(&self, entry: &LogEntry) {
        let line = Self::format_line(entry);

        match entry.level {
            LogLevel::Debug => {
                debug!(payload = %Self::format_payload(entry), "{line}");
            }
            LogLevel::Info => {
                info!(payload = %Self::format_payload(entry), "{line}");
            }
            LogLevel::Warn => {
                warn!(payload = %Self::format_payload(entry), "{line}");
            }
            LogLevel::Error => match &entry.error {
                Some(err) => error!(error = %Self::format_payload(err), "{line}"),
                None => error!(payload = %Self::format_payload(&entry.data), "{line}"),
            },
            LogLevel::Critical => {
                error!(payload = %Self::format_payload(entry), "[CRITICAL] {line}");
            }
        }
    }

    fn note(&self, message: &str) {
        info!("[loftlog] {message}");
    }
}
