//! Assembly of the market-update workflow.

use crate::collaborators::{
    CoinGecko, Notifier, OpenAiSummarizer, PriceSource, SocialSource, Summarizer, TelegramNotifier,
    TwitterSearch,
};
use crate::config::PipelineConfig;
use crate::context::Context;
use crate::error::WorkflowError;
use crate::shape::{FieldKind, Shape};
use crate::steps::{
    keys, AnalyzeOrSkip, FetchPrices, FetchTweets, FormatSummary, MapResult, SendNotification,
};
use crate::workflow::Workflow;
use std::sync::Arc;

/// The injected collaborator set for one pipeline instance.
#[derive(Clone)]
pub struct Collaborators {
    /// Price source, fatal on failure.
    pub prices: Arc<dyn PriceSource>,
    /// Social-post source, recoverable on rate limit.
    pub social: Arc<dyn SocialSource>,
    /// Summarization agent, used only on the normal path.
    pub summarizer: Arc<dyn Summarizer>,
    /// Notifier with structured delivery outcomes.
    pub notifier: Arc<dyn Notifier>,
}

impl Collaborators {
    /// Wires the real HTTP collaborators from configuration.
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            prices: Arc::new(CoinGecko::new()),
            social: Arc::new(TwitterSearch::new(config.twitter.clone())),
            summarizer: Arc::new(OpenAiSummarizer::new(config.openai.clone())),
            notifier: Arc::new(TelegramNotifier::new(config.telegram.clone())),
        }
    }
}

/// Builds the six-step market-update workflow.
///
/// Input: `{ids, vs_currencies}` as comma-separated text. Output:
/// `{summary, sent}`. The chain is shape-checked here, once, before any
/// run is possible.
pub fn market_update_workflow(collaborators: &Collaborators) -> Result<Workflow, WorkflowError> {
    Workflow::builder()
        .input_shape(
            Shape::new()
                .field(keys::IDS, FieldKind::Text)
                .field(keys::VS_CURRENCIES, FieldKind::Text),
        )
        .output_shape(
            Shape::new()
                .field(keys::SUMMARY, FieldKind::Text)
                .field(keys::SENT, FieldKind::Flag),
        )
        .then(FetchPrices::new(collaborators.prices.clone()))
        .then(FetchTweets::new(collaborators.social.clone()))
        .then(AnalyzeOrSkip::new(collaborators.summarizer.clone()))
        .then(FormatSummary)
        .then(SendNotification::new(collaborators.notifier.clone()))
        .then(MapResult)
        .build()
}

/// Typed result of one market-update run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketUpdate {
    /// The formatted price summary with the sentiment reason.
    pub summary: String,
    /// Whether the notification was delivered.
    pub sent: bool,
}

/// Runs the workflow for the given assets and currencies.
pub async fn run_market_update(
    workflow: &Workflow,
    ids: &str,
    vs_currencies: &str,
) -> Result<MarketUpdate, WorkflowError> {
    let mut initial = Context::new();
    initial.insert(keys::IDS, ids);
    initial.insert(keys::VS_CURRENCIES, vs_currencies);

    let result = workflow.run(initial).await?;
    Ok(MarketUpdate {
        summary: result.require_str(keys::SUMMARY)?.to_string(),
        sent: result.require_bool(keys::SENT)?,
    })
}
