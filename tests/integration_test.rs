use async_trait::async_trait;
use coinpulse::collaborators::{Delivery, Notifier, PriceSource, SocialSource, Summarizer};
use coinpulse::pipeline::{self, Collaborators, MarketUpdate};
use coinpulse::steps::RATE_LIMIT_REASON;
use coinpulse::{PriceTable, SourceError, WorkflowError};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct FakePrices {
    table: PriceTable,
    fail: bool,
}

impl FakePrices {
    fn bitcoin_usd() -> Self {
        Self {
            table: BTreeMap::from([(
                "bitcoin".to_string(),
                BTreeMap::from([("usd".to_string(), 50000.0)]),
            )]),
            fail: false,
        }
    }

    fn broken() -> Self {
        Self {
            table: BTreeMap::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl PriceSource for FakePrices {
    async fn prices(&self, _ids: &str, _vs: &str) -> Result<PriceTable, SourceError> {
        if self.fail {
            return Err(SourceError::Status {
                code: 500,
                body: "upstream unavailable".to_string(),
            });
        }
        Ok(self.table.clone())
    }
}

enum SocialMode {
    Posts(Vec<String>),
    RateLimited,
}

struct FakeSocial(SocialMode);

#[async_trait]
impl SocialSource for FakeSocial {
    async fn recent_posts(&self, _query: &str) -> Result<Vec<String>, SourceError> {
        match &self.0 {
            SocialMode::Posts(posts) => Ok(posts.clone()),
            SocialMode::RateLimited => Err(SourceError::RateLimited),
        }
    }
}

struct FakeSummarizer {
    calls: AtomicUsize,
    reply: String,
}

impl FakeSummarizer {
    fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            reply: reply.to_string(),
        })
    }
}

#[async_trait]
impl Summarizer for FakeSummarizer {
    async fn summarize(&self, _posts: &[String], _topic: &str) -> Result<String, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.reply.clone())
    }
}

struct FakeNotifier {
    calls: AtomicUsize,
    ok: bool,
}

impl FakeNotifier {
    fn new(ok: bool) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            ok,
        })
    }
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn deliver(&self, _text: &str) -> Delivery {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.ok {
            Delivery::succeeded()
        } else {
            Delivery::failed("chat not found")
        }
    }
}

struct Fixture {
    collaborators: Collaborators,
    summarizer: Arc<FakeSummarizer>,
    notifier: Arc<FakeNotifier>,
}

fn fixture(prices: FakePrices, social: SocialMode, reply: &str, delivery_ok: bool) -> Fixture {
    let summarizer = FakeSummarizer::new(reply);
    let notifier = FakeNotifier::new(delivery_ok);
    let collaborators = Collaborators {
        prices: Arc::new(prices),
        social: Arc::new(FakeSocial(social)),
        summarizer: summarizer.clone(),
        notifier: notifier.clone(),
    };
    Fixture {
        collaborators,
        summarizer,
        notifier,
    }
}

async fn run(fixture: &Fixture) -> Result<MarketUpdate, WorkflowError> {
    let workflow = pipeline::market_update_workflow(&fixture.collaborators).unwrap();
    pipeline::run_market_update(&workflow, "bitcoin", "usd").await
}

#[tokio::test]
async fn test_rate_limited_run_degrades_and_still_delivers() {
    let fixture = fixture(
        FakePrices::bitcoin_usd(),
        SocialMode::RateLimited,
        "should not appear",
        true,
    );

    let update = run(&fixture).await.unwrap();

    assert!(update.summary.contains("BITCOIN: USD: 50000"));
    assert!(update.summary.ends_with(&format!("Reason: {RATE_LIMIT_REASON}")));
    assert!(update.sent);
    assert_eq!(fixture.summarizer.calls.load(Ordering::SeqCst), 0);
    assert_eq!(fixture.notifier.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_normal_run_appends_summarizer_reason() {
    let fixture = fixture(
        FakePrices::bitcoin_usd(),
        SocialMode::Posts(vec!["up 5%".to_string(), "bullish".to_string()]),
        "Sentiment is positive.",
        true,
    );

    let update = run(&fixture).await.unwrap();

    assert_eq!(
        update.summary,
        "BITCOIN: USD: 50000\n\nReason: Sentiment is positive."
    );
    assert!(update.sent);
    assert_eq!(fixture.summarizer.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_price_failure_aborts_before_notification() {
    let fixture = fixture(
        FakePrices::broken(),
        SocialMode::Posts(vec!["bullish".to_string()]),
        "Sentiment is positive.",
        true,
    );

    let result = run(&fixture).await;

    assert!(matches!(
        result,
        Err(WorkflowError::Collaborator { step_id, source: SourceError::Status { code: 500, .. } })
            if step_id == "fetch-prices"
    ));
    assert_eq!(fixture.notifier.calls.load(Ordering::SeqCst), 0);
    assert_eq!(fixture.summarizer.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_delivery_failure_yields_complete_result_with_sent_false() {
    let fixture = fixture(
        FakePrices::bitcoin_usd(),
        SocialMode::Posts(vec!["bullish".to_string()]),
        "Sentiment is positive.",
        false,
    );

    let update = run(&fixture).await.unwrap();

    assert!(!update.sent);
    assert_eq!(
        update.summary,
        "BITCOIN: USD: 50000\n\nReason: Sentiment is positive."
    );
    assert_eq!(fixture.notifier.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_repeated_runs_format_identically() {
    let fixture = fixture(
        FakePrices::bitcoin_usd(),
        SocialMode::RateLimited,
        "should not appear",
        true,
    );

    let first = run(&fixture).await.unwrap();
    let second = run(&fixture).await.unwrap();
    assert_eq!(first.summary, second.summary);
}
