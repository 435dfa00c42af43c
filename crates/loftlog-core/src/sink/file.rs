//! JSON-lines file batch sink with size-based rotation

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::{BatchSink, SinkError};
use crate::domain::LogEntry;

/// Configuration for the file sink
#[derive(Debug, Clone)]
pub struct FileSinkConfig {
    /// Directory holding `current.log` and rotated files
    pub dir: PathBuf,

    /// Maximum file size before rotation (bytes)
    pub max_file_size: u64,

    /// Maximum number of rotated files to keep
    pub max_files: usize,
}

impl Default for FileSinkConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("logs"),
            max_file_size: 10 * 1024 * 1024, // 10MB
            max_files: 30,
        }
    }
}

/// Batch sink writing one JSON line per entry to `current.log`
///
/// Rotates to a timestamped file when the size bound is reached and prunes
/// the oldest rotated files beyond `max_files`.
pub struct JsonLinesFileSink {
    config: FileSinkConfig,
    writer: Mutex<Option<WriterState>>,
}

struct WriterState {
    file: File,
    size: u64,
}

impl JsonLinesFileSink {
    pub fn new(config: FileSinkConfig) -> Self {
        Self {
            config,
            writer: Mutex::new(None),
        }
    }

    fn current_path(&self) -> PathBuf {
        self.config.dir.join("current.log")
    }

    async fn open_current(&self) -> Result<WriterState, SinkError> {
        tokio::fs::create_dir_all(&self.config.dir).await?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.current_path())
            .await?;
        let size = file.metadata().await?.len();
        Ok(WriterState { file, size })
    }

    async fn rotate(&self, state: &mut WriterState) -> Result<(), SinkError> {
        info!("Rotating log file in {:?}", self.config.dir);

        state.file.shutdown().await?;

        let timestamp = chrono::Utc::now().format("%Y-%m-%d-%H%M%S%.3f");
        let rotated = self.config.dir.join(format!("{}.log", timestamp));
        tokio::fs::rename(self.current_path(), &rotated).await?;

        self.cleanup_old_files().await?;

        *state = self.open_current().await?;
        Ok(())
    }

    async fn cleanup_old_files(&self) -> Result<(), SinkError> {
        let mut entries = tokio::fs::read_dir(&self.config.dir).await?;
        let mut log_files = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if name.ends_with(".log") && name != "current.log" {
                    if let Ok(metadata) = entry.metadata().await {
                        if let Ok(modified) = metadata.modified() {
                            log_files.push((path, modified));
                        }
                    }
                }
            }
        }

        // Oldest first
        log_files.sort_by_key(|(_, modified)| *modified);

        if log_files.len() > self.config.max_files {
            let to_remove = log_files.len() - self.config.max_files;
            for (path, _) in log_files.iter().take(to_remove) {
                if let Err(e) = tokio::fs::remove_file(path).await {
                    warn!("Failed to remove old log file {:?}: {}", path, e);
                } else {
                    debug!("Removed old log file: {:?}", path);
                }
            }
        }

        Ok(())
    }
}

#[async_trait]
impl BatchSink for JsonLinesFileSink {
    async fn dispatch(&self, entries: Vec<LogEntry>) -> Result<(), SinkError> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut guard = self.writer.lock().await;
        if guard.is_none() {
            *guard = Some(self.open_current().await?);
        }
        let state = guard.as_mut().unwrap();

        for entry in &entries {
            let mut line = serde_json::to_string(entry)?;
            line.push('\n');
            let line_len = line.len() as u64;

            if state.size + line_len > self.config.max_file_size {
                self.rotate(state).await?;
            }

            state.file.write_all(line.as_bytes()).await?;
            state.size += line_len;
        }
        state.file.flush().await?;

        Ok(())
    }
}
