use crate::error::{FeedError, Result};
use std::time::Duration;

pub const DEFAULT_REMOTE: &str = "https://api.ecrimex.net/phish";
pub const DEFAULT_LAST_RUN_CACHE: &str = "/tmp/.apwg_last_run";
pub const DEFAULT_HOURS: u32 = 24;
/// Ten years
pub const MAX_HOURS: u32 = 87_600;
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_CONFIDENCE_LOW: u32 = 90;

/// Everything the client and poller need, resolved once at startup.
///
/// Nothing below the CLI reads environment variables; the binary fills this
/// in from flags, env and `.env`.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub remote: String,
    pub token: String,
    pub timeout: Duration,
    pub proxy: Option<String>,
    pub user_agent: String,
    /// Look-back used when no last-run state exists
    pub hours: u32,
    pub confidence_low: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            remote: DEFAULT_REMOTE.to_string(),
            token: String::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            proxy: None,
            user_agent: format!("apwg-feed-rs/{}", env!("CARGO_PKG_VERSION")),
            hours: DEFAULT_HOURS,
            confidence_low: DEFAULT_CONFIDENCE_LOW,
        }
    }
}

impl ClientConfig {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.token.trim().is_empty() {
            return Err(FeedError::Config(
                "missing token (pass --token or set APWG_TOKEN)".to_string(),
            ));
        }
        if !self.remote.starts_with("http://") && !self.remote.starts_with("https://") {
            return Err(FeedError::Config(format!(
                "remote must be an http(s) URL, got {}",
                self.remote
            )));
        }
        if !(1..=MAX_HOURS).contains(&self.hours) {
            return Err(FeedError::Config(format!(
                "past hours must be between 1 and {}, got {}",
                MAX_HOURS, self.hours
            )));
        }
        Ok(())
    }
}
