//! Notification step.

use crate::collaborators::Notifier;
use crate::context::Context;
use crate::error::WorkflowError;
use crate::shape::{FieldKind, Shape};
use crate::step::{Step, StepId};
use crate::steps::keys;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Delivers the summary through the injected notifier.
///
/// Delivery failure never aborts the run; it becomes the `ok` field and
/// reaches the caller as `sent: false`.
pub struct SendNotification {
    notifier: Arc<dyn Notifier>,
}

impl SendNotification {
    /// Creates the step with an injected notifier.
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }
}

impl fmt::Debug for SendNotification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SendNotification").finish_non_exhaustive()
    }
}

#[async_trait]
impl Step for SendNotification {
    fn id(&self) -> StepId {
        StepId::new("send-telegram")
    }

    fn description(&self) -> &str {
        "Sends the crypto summary to the configured chat"
    }

    fn input_shape(&self) -> Shape {
        Shape::new().field(keys::SUMMARY, FieldKind::Text)
    }

    fn output_shape(&self) -> Shape {
        Shape::new().field(keys::OK, FieldKind::Flag)
    }

    async fn execute(&self, ctx: &Context) -> Result<Context, WorkflowError> {
        let summary = ctx.require_str(keys::SUMMARY)?;
        let text = format!("Crypto update:\n\n{summary}");

        let delivery = self.notifier.deliver(&text).await;
        if let Some(error) = &delivery.error {
            warn!("Notification delivery failed: {}", error);
        }

        let mut out = Context::new();
        out.insert(keys::OK, delivery.ok);
        Ok(out)
    }
}
