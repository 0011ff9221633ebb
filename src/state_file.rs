use crate::error::{FeedError, Result};
use crate::storage::StateStore;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use log::{debug, warn};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

const STATE_FILE: &str = "lastrun";
const WRITE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";
// older state files drop the fraction when it is zero
const READ_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"];

pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format(WRITE_FORMAT).to_string()
}

pub fn parse_timestamp(text: &str) -> Result<DateTime<Utc>> {
    READ_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| FeedError::State(format!("unparseable last-run timestamp {:?}", text)))
}

/// Last-run state kept as a one-line text file at `<dir>/lastrun`.
pub struct FileStateStore {
    base_path: PathBuf,
}

impl FileStateStore {
    /// Open the store, creating `dir` if it does not exist yet.
    pub async fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let base_path = dir.as_ref().to_path_buf();

        if !base_path.is_dir() {
            fs::create_dir_all(&base_path).await.map_err(|e| {
                FeedError::State(format!(
                    "Failed to create cache directory {}: {}",
                    base_path.display(),
                    e
                ))
            })?;
        }

        Ok(Self { base_path })
    }

    pub fn path(&self) -> PathBuf {
        self.base_path.join(STATE_FILE)
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn read(&self) -> Result<Option<DateTime<Utc>>> {
        let file_path = self.path();

        if !file_path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&file_path)
            .await
            .map_err(|e| FeedError::State(format!("Failed to read {}: {}", file_path.display(), e)))?;

        let line = content.trim();
        if line.is_empty() {
            return Ok(None);
        }

        parse_timestamp(line).map(Some)
    }

    async fn write(&self, timestamp: DateTime<Utc>) -> Result<()> {
        let file_path = self.path();
        let temp_path = self.base_path.join(format!("{}.tmp", STATE_FILE));

        let result = async {
            write_temp(&temp_path, &timestamp).await?;
            fs::rename(&temp_path, &file_path)
                .await
                .map_err(|e| FeedError::State(format!("Failed to rename temp file: {}", e)))
        }
        .await;

        if let Err(e) = result {
            if let Err(cleanup) = fs::remove_file(&temp_path).await {
                if cleanup.kind() != ErrorKind::NotFound {
                    warn!("Failed to remove {}: {}", temp_path.display(), cleanup);
                }
            }
            return Err(e);
        }

        debug!("last run updated to {}", timestamp);
        Ok(())
    }
}

async fn write_temp(temp_path: &Path, timestamp: &DateTime<Utc>) -> Result<()> {
    let mut file = fs::File::create(temp_path)
        .await
        .map_err(|e| FeedError::State(format!("Failed to create temp file: {}", e)))?;

    file.write_all(format_timestamp(timestamp).as_bytes())
        .await
        .map_err(|e| FeedError::State(format!("Failed to write to temp file: {}", e)))?;

    file.flush()
        .await
        .map_err(|e| FeedError::State(format!("Failed to flush temp file: {}", e)))?;

    file.sync_all()
        .await
        .map_err(|e| FeedError::State(format!("Failed to sync temp file: {}", e)))
}
