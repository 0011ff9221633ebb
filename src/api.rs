use crate::config::ClientConfig;
use crate::error::{FeedError, Result};
use crate::types::{FeedBatch, FeedResponse};
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, Proxy, StatusCode};

/// Query sent to the phish endpoint for one window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedQuery {
    pub token: String,
    pub start_epoch: i64,
    pub end_epoch: i64,
    pub confidence_low: u32,
}

impl FeedQuery {
    pub fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("t", self.token.clone()),
            ("dd_date_start", self.start_epoch.to_string()),
            ("dd_date_end", self.end_epoch.to_string()),
            ("confidence_low", self.confidence_low.to_string()),
        ]
    }
}

/// Status and body of a response, before any interpretation.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// Issues the single GET a poll needs.
#[async_trait]
pub trait FeedTransport: Send + Sync {
    async fn fetch(&self, query: &FeedQuery) -> Result<RawResponse>;
}

/// Turn a raw response into a batch of records.
///
/// 401 maps to `Unauthorized`, every other non-200 status to
/// `UnexpectedStatus`.
pub fn decode_feed(response: RawResponse) -> Result<FeedBatch> {
    match StatusCode::from_u16(response.status) {
        Ok(StatusCode::OK) => {}
        Ok(StatusCode::UNAUTHORIZED) => return Err(FeedError::Unauthorized),
        _ => {
            warn!("API request failed [{}]: {}", response.status, response.body);
            return Err(FeedError::UnexpectedStatus {
                status: response.status,
                body: response.body,
            });
        }
    }

    let parsed: FeedResponse = serde_json::from_str(&response.body).map_err(|e| {
        FeedError::MalformedResponse(format!("expected _embedded.phish records: {}", e))
    })?;

    Ok(FeedBatch::from(parsed))
}

pub struct ApwgClient {
    client: Client,
    remote: String,
}

impl ApwgClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout);

        if let Some(proxy) = &config.proxy {
            let proxy = Proxy::all(proxy.as_str())
                .map_err(|e| FeedError::Config(format!("invalid proxy {}: {}", proxy, e)))?;
            builder = builder.proxy(proxy);
        }

        Ok(Self {
            client: builder.build()?,
            remote: config.remote.clone(),
        })
    }
}

#[async_trait]
impl FeedTransport for ApwgClient {
    async fn fetch(&self, query: &FeedQuery) -> Result<RawResponse> {
        debug!(
            "requesting {} window {}..{}",
            self.remote, query.start_epoch, query.end_epoch
        );

        let response = self
            .client
            .get(&self.remote)
            .query(&query.params())
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!("response [{}]: {} bytes", status, body.len());

        Ok(RawResponse { status, body })
    }
}
