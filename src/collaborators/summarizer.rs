//! Summarization agent contract and the OpenAI chat-completions client.

use crate::error::SourceError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const OPENAI_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

const INSTRUCTIONS: &str = "You are an analyst assistant. Given a short list of recent posts \
about a cryptocurrency, summarize the prevailing sentiment and provide a concise explanation \
(1-3 sentences) why the community thinks the price is high or low right now. If the posts are \
mixed or uncertain, state that uncertainty clearly.";

/// Produces a short explanatory text for a list of posts about a topic.
///
/// Invoked only on the normal path; when the social source was rate limited
/// the consuming step substitutes a fixed placeholder instead.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarizes the sentiment of the given posts about a topic.
    async fn summarize(&self, posts: &[String], topic: &str) -> Result<String, SourceError>;
}

/// Configuration for the OpenAI client, passed in at construction.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// API key.
    pub api_key: String,
    /// Model name, e.g. `gpt-4o-mini`.
    pub model: String,
}

impl OpenAiConfig {
    /// Creates a config with the default model.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

/// OpenAI chat-completions summarizer.
pub struct OpenAiSummarizer {
    http: Client,
    config: OpenAiConfig,
    base_url: String,
}

impl OpenAiSummarizer {
    /// Creates a client against the public OpenAI API.
    pub fn new(config: OpenAiConfig) -> Self {
        Self::with_base_url(config, OPENAI_BASE_URL)
    }

    /// Creates a client against a custom endpoint.
    pub fn with_base_url(config: OpenAiConfig, base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            config,
            base_url: base_url.into(),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

fn build_prompt(posts: &[String], topic: &str) -> String {
    let joined = posts.join("\n- ");
    format!(
        "These are recent posts about {topic}:\n- {joined}\n\nSummarize the main sentiment \
and explain in one short paragraph why people believe {topic} is high or low right now."
    )
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    async fn summarize(&self, posts: &[String], topic: &str) -> Result<String, SourceError> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: INSTRUCTIONS.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: build_prompt(posts, topic),
                },
            ],
        };

        let url = format!("{}/v1/chat/completions", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                code: status.as_u16(),
                body,
            });
        }

        let chat: ChatResponse = response.json().await?;
        let choice = chat
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| SourceError::Malformed("response contained no choices".to_string()))?;
        Ok(choice.message.content)
    }
}
