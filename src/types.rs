use crate::error::{FeedError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Number;

pub const TAG_PHISHING: &str = "phishing";
pub const ITYPE_URL: &str = "url";
pub const PROVIDER: &str = "apwg.org";

const LASTTIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// One entry of `_embedded.phish` as the feed returns it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawRecord {
    pub url: String,

    /// Unix epoch seconds
    pub date_discovered: i64,

    pub brand: String,

    /// Kept as the feed sent it, so `95` stays an integer in output
    pub confidence_level: Number,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedResponse {
    #[serde(rename = "_embedded")]
    pub embedded: Embedded,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Embedded {
    pub phish: Vec<RawRecord>,
}

/// Normalized indicator built from a single feed record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Indicator {
    pub indicator: String,
    pub lasttime: String,
    pub tags: String,
    pub description: String,
    pub confidence: Number,
    pub itype: String,
    pub provider: String,
}

impl Indicator {
    pub fn from_record(record: &RawRecord) -> Result<Self> {
        let discovered =
            DateTime::<Utc>::from_timestamp(record.date_discovered, 0).ok_or_else(|| {
                FeedError::MalformedResponse(format!(
                    "date_discovered {} is out of range for {}",
                    record.date_discovered, record.url
                ))
            })?;

        Ok(Self {
            indicator: record.url.trim_start().to_string(),
            lasttime: discovered.format(LASTTIME_FORMAT).to_string(),
            tags: TAG_PHISHING.to_string(),
            description: record.brand.clone(),
            confidence: record.confidence_level.clone(),
            itype: ITYPE_URL.to_string(),
            provider: PROVIDER.to_string(),
        })
    }
}

/// Records parsed from one feed response.
///
/// Conversion happens lazily in `indicators`, so a caller that stops after
/// `n` items never touches the rest. The iterator can be created any number
/// of times.
#[derive(Debug, Clone, Default)]
pub struct FeedBatch {
    records: Vec<RawRecord>,
}

impl FeedBatch {
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn indicators(&self) -> impl Iterator<Item = Result<Indicator>> + '_ {
        self.records.iter().map(Indicator::from_record)
    }
}

impl From<FeedResponse> for FeedBatch {
    fn from(response: FeedResponse) -> Self {
        Self::new(response.embedded.phish)
    }
}
