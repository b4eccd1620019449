//! Social-fetch step with the rate-limit degrade conversion.

use crate::collaborators::SocialSource;
use crate::context::Context;
use crate::error::{SourceError, WorkflowError};
use crate::shape::{FieldKind, Shape};
use crate::step::{Step, StepId};
use crate::steps::keys;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Fetches recent posts about the requested assets.
///
/// Rate limiting is recoverable: the step converts it into an empty post
/// list plus the `rate_limited` flag so the analysis step can degrade.
/// Every other social-source failure is fatal.
pub struct FetchTweets {
    source: Arc<dyn SocialSource>,
}

impl FetchTweets {
    /// Creates the step with an injected social source.
    pub fn new(source: Arc<dyn SocialSource>) -> Self {
        Self { source }
    }
}

impl fmt::Debug for FetchTweets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchTweets").finish_non_exhaustive()
    }
}

#[async_trait]
impl Step for FetchTweets {
    fn id(&self) -> StepId {
        StepId::new("fetch-tweets")
    }

    fn description(&self) -> &str {
        "Fetches recent posts about the requested crypto"
    }

    fn input_shape(&self) -> Shape {
        Shape::new().field(keys::IDS, FieldKind::Text)
    }

    fn output_shape(&self) -> Shape {
        Shape::new()
            .field(keys::TWEETS, FieldKind::TextList)
            .optional(keys::RATE_LIMITED, FieldKind::Flag)
    }

    async fn execute(&self, ctx: &Context) -> Result<Context, WorkflowError> {
        let query = ctx.require_str(keys::IDS)?;

        let mut out = Context::new();
        match self.source.recent_posts(query).await {
            Ok(posts) => {
                out.insert(keys::TWEETS, posts);
            }
            Err(SourceError::RateLimited) => {
                warn!("Social source rate limited, sentiment analysis will be skipped");
                out.insert(keys::TWEETS, Value::Array(Vec::new()));
                out.insert(keys::RATE_LIMITED, true);
            }
            Err(source) => {
                return Err(WorkflowError::Collaborator {
                    step_id: self.id(),
                    source,
                });
            }
        }
        Ok(out)
    }
}
