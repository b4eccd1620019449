//! The concrete steps of the market-update pipeline.

mod analyze;
mod fetch_prices;
mod fetch_tweets;
mod format_summary;
mod map_result;
mod notify;

pub use analyze::{AnalyzeOrSkip, RATE_LIMIT_REASON};
pub use fetch_prices::FetchPrices;
pub use fetch_tweets::FetchTweets;
pub use format_summary::FormatSummary;
pub use map_result::MapResult;
pub use notify::SendNotification;

/// Context field names shared by the pipeline steps.
pub mod keys {
    /// Comma-separated asset ids supplied by the caller.
    pub const IDS: &str = "ids";
    /// Comma-separated currency codes supplied by the caller.
    pub const VS_CURRENCIES: &str = "vs_currencies";
    /// Price table produced by the price-fetch step.
    pub const PRICES: &str = "prices";
    /// Recent post texts produced by the social-fetch step.
    pub const TWEETS: &str = "tweets";
    /// Degrade flag set when the social source was rate limited.
    pub const RATE_LIMITED: &str = "rate_limited";
    /// Sentiment explanation, real or placeholder.
    pub const REASON: &str = "reason";
    /// Formatted price summary.
    pub const SUMMARY: &str = "summary";
    /// Structured delivery outcome of the notification step.
    pub const OK: &str = "ok";
    /// Caller-facing delivery flag.
    pub const SENT: &str = "sent";
}
