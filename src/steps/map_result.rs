//! Terminal mapping step.

use crate::context::Context;
use crate::error::WorkflowError;
use crate::shape::{FieldKind, Shape};
use crate::step::{Step, StepId};
use crate::steps::keys;
use async_trait::async_trait;

/// Maps the delivery outcome onto the caller-facing `sent` field.
#[derive(Debug, Default)]
pub struct MapResult;

#[async_trait]
impl Step for MapResult {
    fn id(&self) -> StepId {
        StepId::new("map-result")
    }

    fn description(&self) -> &str {
        "Maps the delivery outcome onto the workflow output"
    }

    fn input_shape(&self) -> Shape {
        Shape::new().field(keys::OK, FieldKind::Flag)
    }

    fn output_shape(&self) -> Shape {
        Shape::new().field(keys::SENT, FieldKind::Flag)
    }

    async fn execute(&self, ctx: &Context) -> Result<Context, WorkflowError> {
        let mut out = Context::new();
        out.insert(keys::SENT, ctx.require_bool(keys::OK)?);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_maps_ok_to_sent() {
        let mut ctx = Context::new();
        ctx.insert(keys::OK, false);

        let out = MapResult.execute(&ctx).await.unwrap();
        assert_eq!(out.get_bool(keys::SENT), Some(false));
    }
}
