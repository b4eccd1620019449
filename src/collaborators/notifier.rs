//! Notifier contract and the Telegram bot client.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::warn;

const TELEGRAM_BASE_URL: &str = "https://api.telegram.org";

/// Outcome of one delivery attempt.
///
/// Delivery failure is data, not an error: the pipeline threads it through
/// to the final result instead of aborting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Whether the payload was accepted.
    pub ok: bool,
    /// Failure description when `ok` is false.
    pub error: Option<String>,
}

impl Delivery {
    /// A successful delivery.
    pub fn succeeded() -> Self {
        Self {
            ok: true,
            error: None,
        }
    }

    /// A failed delivery with a description.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(error.into()),
        }
    }
}

/// Delivers a single text payload and reports the outcome structurally.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Attempts delivery; never raises, always reports.
    async fn deliver(&self, text: &str) -> Delivery;
}

/// Credentials for the Telegram bot API, passed in at construction.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Bot token from BotFather.
    pub bot_token: String,
    /// Target chat id.
    pub chat_id: String,
}

/// Telegram `sendMessage` client.
pub struct TelegramNotifier {
    http: Client,
    config: TelegramConfig,
    base_url: String,
}

impl TelegramNotifier {
    /// Creates a client against the public Telegram API.
    pub fn new(config: TelegramConfig) -> Self {
        Self::with_base_url(config, TELEGRAM_BASE_URL)
    }

    /// Creates a client against a custom endpoint.
    pub fn with_base_url(config: TelegramConfig, base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            config,
            base_url: base_url.into(),
        }
    }
}

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Deserialize)]
struct SendMessageResponse {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn deliver(&self, text: &str) -> Delivery {
        let url = format!("{}/bot{}/sendMessage", self.base_url, self.config.bot_token);
        let request = SendMessageRequest {
            chat_id: &self.config.chat_id,
            text,
        };

        let response = match self.http.post(&url).json(&request).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Telegram delivery failed in transport: {}", e);
                return Delivery::failed(format!("transport error: {e}"));
            }
        };

        let status = response.status();
        match response.json::<SendMessageResponse>().await {
            Ok(api) if status.is_success() && api.ok => Delivery::succeeded(),
            Ok(api) => {
                let description = api
                    .description
                    .unwrap_or_else(|| format!("telegram api error (status {status})"));
                warn!("Telegram delivery rejected: {}", description);
                Delivery::failed(description)
            }
            Err(e) => {
                warn!("Telegram delivery returned malformed response: {}", e);
                Delivery::failed(format!("malformed response: {e}"))
            }
        }
    }
}
