use crate::api::{decode_feed, FeedQuery, FeedTransport};
use crate::config::ClientConfig;
use crate::error::{FeedError, Result};
use crate::storage::StateStore;
use crate::types::Indicator;
use chrono::{DateTime, Duration, Utc};
use log::{debug, info, warn};
use std::sync::Arc;

/// `[start, end)` range requested from the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl PollWindow {
    /// Resume from `last_run`, or look back `hours` (less one second) from `now`.
    ///
    /// `start` never passes `now`; a look-back that leaves the representable
    /// date range is a configuration error.
    pub fn compute(
        last_run: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
        hours: u32,
    ) -> Result<Self> {
        let start = match last_run {
            Some(start) if start > now => {
                warn!("last run {} is in the future, clamping to {}", start, now);
                now
            }
            Some(start) => start,
            None => Duration::try_hours(i64::from(hours))
                .and_then(|back| now.checked_sub_signed(back))
                .and_then(|start| start.checked_add_signed(Duration::seconds(1)))
                .ok_or_else(|| {
                    FeedError::Config(format!("look-back of {} hours is out of range", hours))
                })?
                .min(now),
        };

        Ok(Self { start, end: now })
    }

    pub fn query(&self, token: &str, confidence_low: u32) -> FeedQuery {
        FeedQuery {
            token: token.to_string(),
            start_epoch: self.start.timestamp(),
            end_epoch: self.end.timestamp(),
            confidence_low,
        }
    }
}

pub struct Poller {
    transport: Arc<dyn FeedTransport>,
    state: Arc<dyn StateStore>,
    token: String,
    hours: u32,
    confidence_low: u32,
    clock: fn() -> DateTime<Utc>,
}

impl Poller {
    pub fn new(
        config: &ClientConfig,
        transport: Arc<dyn FeedTransport>,
        state: Arc<dyn StateStore>,
    ) -> Self {
        Self {
            transport,
            state,
            token: config.token.clone(),
            hours: config.hours,
            confidence_low: config.confidence_low,
            clock: Utc::now,
        }
    }

    /// Replace the source of "now", mainly for tests.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub async fn window(&self) -> Result<PollWindow> {
        let now = (self.clock)();
        let last_run = self.state.read().await?;
        let window = PollWindow::compute(last_run, now, self.hours)?;

        info!("start:{}", window.start);
        info!("end:{}", window.end);

        Ok(window)
    }

    /// Fetch indicators discovered since the last run.
    ///
    /// At most `limit` indicators are returned (`None` for all of them). On
    /// success the window end is stored as the next start, unless
    /// `suppress_state_update` is set. Nothing is stored when the request or
    /// the conversion fails.
    pub async fn poll(
        &self,
        limit: Option<usize>,
        suppress_state_update: bool,
    ) -> Result<Vec<Indicator>> {
        let window = self.window().await?;
        let query = window.query(&self.token, self.confidence_low);

        let response = self.transport.fetch(&query).await?;
        let batch = decode_feed(response)?;
        debug!("feed returned {} records", batch.len());

        let indicators = batch
            .indicators()
            .take(limit.unwrap_or(usize::MAX))
            .collect::<Result<Vec<_>>>()?;

        info!("converted {} indicators", indicators.len());

        if suppress_state_update {
            debug!("leaving last run untouched");
        } else {
            self.state.write(window.end).await?;
        }

        Ok(indicators)
    }
}
