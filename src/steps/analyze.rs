//! Analysis step: the two-branch degrade decision.

use crate::collaborators::Summarizer;
use crate::context::Context;
use crate::error::WorkflowError;
use crate::shape::{FieldKind, Shape};
use crate::step::{Step, StepId};
use crate::steps::keys;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// Fixed placeholder used whenever the degrade path is taken.
pub const RATE_LIMIT_REASON: &str = "Twitter rate limit reached - showing only price update.";

const MAX_POSTS: usize = 10;

/// Explains the market sentiment, or skips when the social source was
/// rate limited.
///
/// This is the consuming end of the degrade policy. The decision is a plain
/// two-branch check on the `rate_limited` flag: truthy always means the
/// fixed placeholder and no summarizer call; anything else means the full
/// summarization of up to ten posts. There is no hybrid path.
pub struct AnalyzeOrSkip {
    summarizer: Arc<dyn Summarizer>,
}

impl AnalyzeOrSkip {
    /// Creates the step with an injected summarizer.
    pub fn new(summarizer: Arc<dyn Summarizer>) -> Self {
        Self { summarizer }
    }
}

impl fmt::Debug for AnalyzeOrSkip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalyzeOrSkip").finish_non_exhaustive()
    }
}

#[async_trait]
impl Step for AnalyzeOrSkip {
    fn id(&self) -> StepId {
        StepId::new("analyze-or-skip")
    }

    fn description(&self) -> &str {
        "Explains the sentiment from recent posts, or skips when rate limited"
    }

    fn input_shape(&self) -> Shape {
        Shape::new()
            .field(keys::TWEETS, FieldKind::TextList)
            .field(keys::IDS, FieldKind::Text)
            .optional(keys::RATE_LIMITED, FieldKind::Flag)
    }

    fn output_shape(&self) -> Shape {
        Shape::new().field(keys::REASON, FieldKind::Text)
    }

    async fn execute(&self, ctx: &Context) -> Result<Context, WorkflowError> {
        let mut out = Context::new();

        if ctx.get_bool(keys::RATE_LIMITED).unwrap_or(false) {
            info!("Degrade path: substituting fixed reason, summarizer not invoked");
            out.insert(keys::REASON, RATE_LIMIT_REASON);
            return Ok(out);
        }

        let posts = ctx.require_text_list(keys::TWEETS)?;
        let topic = ctx.require_str(keys::IDS)?;
        let sample = &posts[..posts.len().min(MAX_POSTS)];

        let reason = self
            .summarizer
            .summarize(sample, topic)
            .await
            .map_err(|source| WorkflowError::Collaborator {
                step_id: self.id(),
                source,
            })?;

        out.insert(keys::REASON, reason.trim());
        Ok(out)
    }
}
