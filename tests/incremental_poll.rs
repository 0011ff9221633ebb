use apwg_feed::{
    ClientConfig, FeedError, FeedQuery, FeedTransport, FileStateStore, Poller, RawResponse,
    StateStore,
};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio_test::{assert_err, assert_ok};

/// Replays queued responses and remembers every query it saw.
struct ScriptedFeed {
    responses: Mutex<Vec<RawResponse>>,
    queries: Mutex<Vec<FeedQuery>>,
}

impl ScriptedFeed {
    fn new(mut responses: Vec<RawResponse>) -> Arc<Self> {
        responses.reverse();
        Arc::new(Self {
            responses: Mutex::new(responses),
            queries: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl FeedTransport for ScriptedFeed {
    async fn fetch(&self, query: &FeedQuery) -> apwg_feed::Result<RawResponse> {
        self.queries.lock().push(query.clone());
        self.responses
            .lock()
            .pop()
            .ok_or_else(|| FeedError::MalformedResponse("no scripted response left".to_string()))
    }
}

fn ok(body: serde_json::Value) -> RawResponse {
    RawResponse {
        status: 200,
        body: body.to_string(),
    }
}

fn phish(url: &str, discovered: i64) -> serde_json::Value {
    serde_json::json!({
        "url": url,
        "date_discovered": discovered,
        "brand": "BankCo",
        "confidence_level": 92
    })
}

fn first_clock() -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000, 654_321_000).unwrap()
}

fn second_clock() -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_003_600, 0).unwrap()
}

#[tokio::test]
async fn second_poll_resumes_where_first_ended() {
    let tmp = tempfile::tempdir().unwrap();
    let cache = tmp.path().join("apwg");
    let config = ClientConfig::with_token("secret");

    let feed = ScriptedFeed::new(vec![
        ok(serde_json::json!({ "_embedded": { "phish": [
            phish("  http://one.test/", 1_699_999_000),
            phish("http://two.test/", 1_699_999_500),
        ]}})),
        ok(serde_json::json!({ "_embedded": { "phish": [
            phish("http://three.test/", 1_700_001_000),
        ]}})),
    ]);

    let state = Arc::new(assert_ok!(FileStateStore::new(&cache).await));

    let first = Poller::new(&config, feed.clone(), state.clone())
        .with_clock(first_clock)
        .poll(None, false)
        .await
        .unwrap();
    assert_eq!(first.len(), 2);
    assert_eq!(first[0].indicator, "http://one.test/");

    // microseconds survive the round trip through the file
    assert_eq!(state.read().await.unwrap(), Some(first_clock()));

    let second = Poller::new(&config, feed.clone(), state.clone())
        .with_clock(second_clock)
        .poll(Some(10), false)
        .await
        .unwrap();
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].lasttime, "2023-11-14T22:30:00Z");

    let queries = feed.queries.lock().clone();
    assert_eq!(queries[0].start_epoch, 1_700_000_000 - 24 * 3600 + 1);
    assert_eq!(queries[0].end_epoch, 1_700_000_000);
    assert_eq!(queries[1].start_epoch, 1_700_000_000);
    assert_eq!(queries[1].end_epoch, 1_700_003_600);

    assert_eq!(state.read().await.unwrap(), Some(second_clock()));
}

#[tokio::test]
async fn failed_poll_keeps_previous_checkpoint() {
    let tmp = tempfile::tempdir().unwrap();
    let config = ClientConfig::with_token("secret");
    let feed = ScriptedFeed::new(vec![RawResponse {
        status: 401,
        body: "{}".to_string(),
    }]);

    let state = Arc::new(FileStateStore::new(tmp.path()).await.unwrap());
    state.write(first_clock()).await.unwrap();

    let err = assert_err!(
        Poller::new(&config, feed, state.clone())
            .with_clock(second_clock)
            .poll(None, false)
            .await
    );

    assert!(matches!(err, FeedError::Unauthorized));
    assert_eq!(state.read().await.unwrap(), Some(first_clock()));
}

#[tokio::test]
async fn custom_look_back_hours() {
    let mut config = ClientConfig::with_token("secret");
    config.hours = 6;
    let feed = ScriptedFeed::new(vec![ok(serde_json::json!({ "_embedded": { "phish": [] } }))]);

    let indicators = Poller::new(&config, feed.clone(), Arc::new(apwg_feed::MemoryStateStore::new()))
        .with_clock(second_clock)
        .poll(Some(5), true)
        .await
        .unwrap();

    assert!(indicators.is_empty());
    let query = feed.queries.lock()[0].clone();
    assert_eq!(query.start_epoch, 1_700_003_600 - 6 * 3600 + 1);
    assert_eq!(query.confidence_low, 90);
    assert_eq!(query.token, "secret");
}
