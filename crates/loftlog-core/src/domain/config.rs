//! Service configuration

use std::time::Duration;

/// Runtime mode
///
/// Controls three behaviors: whether debug entries reach the console,
/// whether error backtraces are captured below Critical, and which flush
/// dispatch branch is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeMode {
    Development,
    Production,
}

impl RuntimeMode {
    /// Read the mode from `LOFTLOG_ENV` ("production" selects production,
    /// anything else is development)
    pub fn from_env() -> Self {
        match std::env::var("LOFTLOG_ENV") {
            Ok(v) if v.eq_ignore_ascii_case("production") => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

/// Configuration for the logging service
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Buffer bound; reaching it triggers an immediate flush
    pub max_buffer_size: usize,

    /// Periodic flush interval
    pub flush_interval: Duration,

    /// Runtime mode
    pub mode: RuntimeMode,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            max_buffer_size: 1000,
            flush_interval: Duration::from_secs(30),
            mode: RuntimeMode::from_env(),
        }
    }
}

impl LoggerConfig {
    pub fn development() -> Self {
        Self {
            mode: RuntimeMode::Development,
            ..Default::default()
        }
    }

    pub fn production() -> Self {
        Self {
            mode: RuntimeMode::Production,
            ..Default::default()
        }
    }

    pub fn with_max_buffer_size(mut self, max_buffer_size: usize) -> Self {
        self.max_buffer_size = max_buffer_size;
        self
    }

    pub fn with_flush_interval(mut self, flush_interval: Duration) -> Self {
        self.flush_interval = flush_interval;
        self
    }
}
