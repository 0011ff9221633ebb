use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

#[async_trait]
pub trait StateStore: Send + Sync {
    /// Timestamp written by the last successful poll, if any
    async fn read(&self) -> Result<Option<DateTime<Utc>>>;

    /// Replace the stored timestamp
    async fn write(&self, timestamp: DateTime<Utc>) -> Result<()>;
}

/// Keeps the last-run timestamp in process memory.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    last_run: Mutex<Option<DateTime<Utc>>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_last_run(timestamp: DateTime<Utc>) -> Self {
        Self {
            last_run: Mutex::new(Some(timestamp)),
        }
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn read(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(*self.last_run.lock())
    }

    async fn write(&self, timestamp: DateTime<Utc>) -> Result<()> {
        *self.last_run.lock() = Some(timestamp);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[tokio::test]
    async fn memory_store_round_trip() {
        let store = MemoryStateStore::new();
        assert_eq!(store.read().await.unwrap(), None);

        let ts = Utc.timestamp_opt(1_700_000_000, 123_000).unwrap();
        store.write(ts).await.unwrap();
        assert_eq!(store.read().await.unwrap(), Some(ts));
    }
}
