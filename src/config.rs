//! Collaborator configuration.
//!
//! Configuration is injected at construction; collaborators never read
//! process-wide state themselves. `from_env` exists for the binary entry
//! point and fails before any run starts when a variable is missing.

use crate::collaborators::{OpenAiConfig, TelegramConfig, TwitterConfig};
use crate::error::WorkflowError;
use std::env;

const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// Configuration for all four real collaborators.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Twitter recent-search credentials.
    pub twitter: TwitterConfig,
    /// Telegram bot credentials and target chat.
    pub telegram: TelegramConfig,
    /// OpenAI credentials and model choice.
    pub openai: OpenAiConfig,
}

impl PipelineConfig {
    /// Reads configuration from the environment.
    ///
    /// Required: `TWITTER_BEARER_TOKEN`, `TELEGRAM_BOT_TOKEN`,
    /// `TELEGRAM_CHAT_ID`, `OPENAI_API_KEY`. Optional: `OPENAI_MODEL`
    /// (defaults to `gpt-4o-mini`).
    pub fn from_env() -> Result<Self, WorkflowError> {
        Ok(Self {
            twitter: TwitterConfig {
                bearer_token: require("TWITTER_BEARER_TOKEN")?,
            },
            telegram: TelegramConfig {
                bot_token: require("TELEGRAM_BOT_TOKEN")?,
                chat_id: require("TELEGRAM_CHAT_ID")?,
            },
            openai: OpenAiConfig {
                api_key: require("OPENAI_API_KEY")?,
                model: env::var("OPENAI_MODEL")
                    .unwrap_or_else(|_| DEFAULT_OPENAI_MODEL.to_string()),
            },
        })
    }
}

fn require(name: &str) -> Result<String, WorkflowError> {
    env::var(name)
        .map_err(|_| WorkflowError::Configuration(format!("missing environment variable {name}")))
}
