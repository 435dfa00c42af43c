//! The logging service and its caller facades

mod facades;
mod logger;

pub use facades::{ApiLogger, DatabaseLogger, ReservationLogger};
pub use logger::{EntryBuilder, LoggingService, DEFAULT_QUERY_LIMIT};
