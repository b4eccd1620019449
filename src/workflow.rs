//! Workflow engine: ordered steps, build-time chain validation, sequential runs.

use crate::context::Context;
use crate::error::WorkflowError;
use crate::shape::{Field, Shape};
use crate::step::{Step, StepId};
use std::fmt;
use tracing::{info, warn};

/// An ordered, shape-checked sequence of steps.
///
/// Built through [`WorkflowBuilder`], which verifies once at construction
/// time that every step's required input can be produced by the workflow
/// input or an earlier step. Runs execute the steps strictly in order
/// against one accumulating [`Context`]; there is no retry, no parallelism
/// and no way back to an earlier step.
pub struct Workflow {
    steps: Vec<Box<dyn Step>>,
    input_shape: Shape,
    output_shape: Shape,
}

impl fmt::Debug for Workflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Workflow")
            .field("steps", &self.steps.iter().map(|s| s.id()).collect::<Vec<_>>())
            .finish()
    }
}

impl Workflow {
    /// Creates a new workflow builder.
    pub fn builder() -> WorkflowBuilder {
        WorkflowBuilder::new()
    }

    /// Returns the number of steps.
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Returns the step ids in execution order.
    pub fn step_ids(&self) -> impl Iterator<Item = StepId> + '_ {
        self.steps.iter().map(|s| s.id())
    }

    /// Returns the shape the initial context must satisfy.
    pub fn input_shape(&self) -> &Shape {
        &self.input_shape
    }

    /// Returns the shape of the returned result.
    pub fn output_shape(&self) -> &Shape {
        &self.output_shape
    }

    /// Executes every step in order against one live context.
    ///
    /// The initial context is validated against the workflow input shape.
    /// For each step the engine validates the live context against the
    /// step's input shape, invokes the step, validates the partial output
    /// against the step's output shape and merges it in. Any validation
    /// failure or fatal step error aborts the run immediately; no further
    /// step executes and the error propagates unchanged.
    ///
    /// On completion the fields named by the workflow output shape are
    /// projected out of the final context and returned.
    pub async fn run(&self, initial: Context) -> Result<Context, WorkflowError> {
        validate(&self.input_shape, &initial, "workflow input")?;

        let total = self.steps.len();
        let mut ctx = initial;

        for (index, step) in self.steps.iter().enumerate() {
            let id = step.id();
            validate(&step.input_shape(), &ctx, &format!("input of step '{id}'"))?;

            info!("Running step {}/{} '{}': {}", index + 1, total, id, step.description());
            let partial = match step.execute(&ctx).await {
                Ok(partial) => partial,
                Err(e) => {
                    warn!("Step '{}' failed, aborting run: {}", id, e);
                    return Err(e);
                }
            };

            validate(&step.output_shape(), &partial, &format!("output of step '{id}'"))?;
            ctx.merge(partial);
            info!("Step '{}' completed", id);
        }

        validate(&self.output_shape, &ctx, "workflow output")?;
        Ok(ctx.extract(&self.output_shape))
    }
}

fn validate(shape: &Shape, ctx: &Context, scope: &str) -> Result<(), WorkflowError> {
    shape
        .validate(ctx)
        .map_err(|e| WorkflowError::ShapeViolation {
            scope: scope.to_string(),
            details: e.to_string(),
        })
}

/// Builder for constructing [`Workflow`] instances.
#[derive(Default)]
pub struct WorkflowBuilder {
    steps: Vec<Box<dyn Step>>,
    input_shape: Shape,
    output_shape: Shape,
}

impl WorkflowBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            input_shape: Shape::new(),
            output_shape: Shape::new(),
        }
    }

    /// Declares the shape the caller must supply.
    pub fn input_shape(mut self, shape: Shape) -> Self {
        self.input_shape = shape;
        self
    }

    /// Declares the shape the final context must contain.
    pub fn output_shape(mut self, shape: Shape) -> Self {
        self.output_shape = shape;
        self
    }

    /// Appends a step to the chain.
    pub fn then<S: Step + 'static>(mut self, step: S) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Validates the chain and builds the workflow.
    ///
    /// Walks the steps once, carrying the cumulative set of fields available
    /// after each merge. A step whose required input field is absent from
    /// that set, carries a different kind, or is only optionally produced
    /// upstream fails the build with [`WorkflowError::Configuration`] before
    /// any run is attempted.
    pub fn build(self) -> Result<Workflow, WorkflowError> {
        if self.steps.is_empty() {
            return Err(WorkflowError::Configuration(
                "workflow must contain at least one step".to_string(),
            ));
        }

        let mut seen: Vec<StepId> = Vec::new();
        for step in &self.steps {
            let id = step.id();
            if seen.contains(&id) {
                return Err(WorkflowError::Configuration(format!(
                    "duplicate step id '{id}'"
                )));
            }
            seen.push(id);
        }

        let mut available: Vec<Field> = self.input_shape.fields().to_vec();

        for step in &self.steps {
            let id = step.id();
            for required in step.input_shape().fields() {
                check_satisfiable(&available, required, &format!("step '{id}'"))?;
            }
            for produced in step.output_shape().fields() {
                upsert(&mut available, produced.clone());
            }
        }

        for required in self.output_shape.fields() {
            check_satisfiable(&available, required, "the workflow output")?;
        }

        Ok(Workflow {
            steps: self.steps,
            input_shape: self.input_shape,
            output_shape: self.output_shape,
        })
    }
}

fn check_satisfiable(
    available: &[Field],
    required: &Field,
    scope: &str,
) -> Result<(), WorkflowError> {
    match available.iter().find(|f| f.name == required.name) {
        None => {
            if required.optional {
                Ok(())
            } else {
                Err(WorkflowError::Configuration(format!(
                    "{scope} requires field '{}' which neither the workflow input nor any earlier step produces",
                    required.name
                )))
            }
        }
        Some(upstream) => {
            if upstream.kind != required.kind {
                return Err(WorkflowError::Configuration(format!(
                    "{scope} requires field '{}' as {} but upstream produces {}",
                    required.name, required.kind, upstream.kind
                )));
            }
            if upstream.optional && !required.optional {
                return Err(WorkflowError::Configuration(format!(
                    "{scope} requires field '{}' unconditionally but upstream only produces it optionally",
                    required.name
                )));
            }
            Ok(())
        }
    }
}

fn upsert(available: &mut Vec<Field>, produced: Field) {
    if let Some(existing) = available.iter_mut().find(|f| f.name == produced.name) {
        *existing = produced;
    } else {
        available.push(produced);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::FieldKind;
    use async_trait::async_trait;

    #[derive(Debug)]
    struct ProduceStep;

    #[async_trait]
    impl Step for ProduceStep {
        fn id(&self) -> StepId {
            StepId::new("produce")
        }

        fn description(&self) -> &str {
            "Produces a greeting"
        }

        fn input_shape(&self) -> Shape {
            Shape::new().field("name", FieldKind::Text)
        }

        fn output_shape(&self) -> Shape {
            Shape::new().field("greeting", FieldKind::Text)
        }

        async fn execute(&self, ctx: &Context) -> Result<Context, WorkflowError> {
            let name = ctx.require_str("name")?;
            let mut out = Context::new();
            out.insert("greeting", format!("hello {name}"));
            Ok(out)
        }
    }

    #[derive(Debug)]
    struct ConsumeStep;

    #[async_trait]
    impl Step for ConsumeStep {
        fn id(&self) -> StepId {
            StepId::new("consume")
        }

        fn description(&self) -> &str {
            "Upper-cases the greeting"
        }

        fn input_shape(&self) -> Shape {
            Shape::new().field("greeting", FieldKind::Text)
        }

        fn output_shape(&self) -> Shape {
            Shape::new().field("loud", FieldKind::Text)
        }

        async fn execute(&self, ctx: &Context) -> Result<Context, WorkflowError> {
            let greeting = ctx.require_str("greeting")?;
            let mut out = Context::new();
            out.insert("loud", greeting.to_uppercase());
            Ok(out)
        }
    }

    #[derive(Debug)]
    struct FailingStep;

    #[async_trait]
    impl Step for FailingStep {
        fn id(&self) -> StepId {
            StepId::new("failing")
        }

        fn description(&self) -> &str {
            "Always fails"
        }

        fn input_shape(&self) -> Shape {
            Shape::new()
        }

        fn output_shape(&self) -> Shape {
            Shape::new().field("never", FieldKind::Text)
        }

        async fn execute(&self, _ctx: &Context) -> Result<Context, WorkflowError> {
            Err(WorkflowError::StepError {
                step_id: self.id(),
                details: "intentional failure".to_string(),
            })
        }
    }

    // Declares one output, returns another. The engine must reject the run.
    #[derive(Debug)]
    struct LyingStep;

    #[async_trait]
    impl Step for LyingStep {
        fn id(&self) -> StepId {
            StepId::new("lying")
        }

        fn description(&self) -> &str {
            "Returns a field it never declared"
        }

        fn input_shape(&self) -> Shape {
            Shape::new()
        }

        fn output_shape(&self) -> Shape {
            Shape::new().field("declared", FieldKind::Text)
        }

        async fn execute(&self, _ctx: &Context) -> Result<Context, WorkflowError> {
            let mut out = Context::new();
            out.insert("undeclared", true);
            Ok(out)
        }
    }

    fn initial() -> Context {
        let mut ctx = Context::new();
        ctx.insert("name", "ada");
        ctx
    }

    #[tokio::test]
    async fn test_run_folds_outputs_in_order() {
        let workflow = Workflow::builder()
            .input_shape(Shape::new().field("name", FieldKind::Text))
            .output_shape(Shape::new().field("loud", FieldKind::Text))
            .then(ProduceStep)
            .then(ConsumeStep)
            .build()
            .unwrap();

        let result = workflow.run(initial()).await.unwrap();
        assert_eq!(result.get_str("loud"), Some("HELLO ADA"));
        // Only output-shape fields are returned
        assert_eq!(result.len(), 1);
        assert!(!result.contains_key("greeting"));
    }

    #[tokio::test]
    async fn test_fatal_step_error_aborts_run() {
        let workflow = Workflow::builder()
            .input_shape(Shape::new().field("name", FieldKind::Text))
            .output_shape(Shape::new())
            .then(ProduceStep)
            .then(FailingStep)
            .build()
            .unwrap();

        let result = workflow.run(initial()).await;
        assert!(matches!(
            result,
            Err(WorkflowError::StepError { step_id, .. }) if step_id == "failing"
        ));
    }

    #[tokio::test]
    async fn test_initial_context_is_validated() {
        let workflow = Workflow::builder()
            .input_shape(Shape::new().field("name", FieldKind::Text))
            .output_shape(Shape::new())
            .then(ProduceStep)
            .build()
            .unwrap();

        let result = workflow.run(Context::new()).await;
        assert!(matches!(
            result,
            Err(WorkflowError::ShapeViolation { scope, .. }) if scope == "workflow input"
        ));
    }

    #[tokio::test]
    async fn test_undeclared_output_is_rejected() {
        let workflow = Workflow::builder()
            .output_shape(Shape::new())
            .then(LyingStep)
            .build()
            .unwrap();

        let result = workflow.run(Context::new()).await;
        assert!(matches!(
            result,
            Err(WorkflowError::ShapeViolation { scope, .. }) if scope == "output of step 'lying'"
        ));
    }

    #[test]
    fn test_build_rejects_unsatisfiable_input() {
        let result = Workflow::builder()
            .input_shape(Shape::new().field("name", FieldKind::Text))
            .then(ConsumeStep) // requires "greeting", nothing produces it
            .build();

        match result {
            Err(WorkflowError::Configuration(msg)) => {
                assert!(msg.contains("greeting"), "unexpected message: {msg}");
            }
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn test_build_rejects_kind_mismatch() {
        #[derive(Debug)]
        struct WrongKindStep;

        #[async_trait]
        impl Step for WrongKindStep {
            fn id(&self) -> StepId {
                StepId::new("wrong-kind")
            }

            fn description(&self) -> &str {
                "Wants the greeting as a flag"
            }

            fn input_shape(&self) -> Shape {
                Shape::new().field("greeting", FieldKind::Flag)
            }

            fn output_shape(&self) -> Shape {
                Shape::new()
            }

            async fn execute(&self, _ctx: &Context) -> Result<Context, WorkflowError> {
                Ok(Context::new())
            }
        }

        let result = Workflow::builder()
            .input_shape(Shape::new().field("name", FieldKind::Text))
            .then(ProduceStep)
            .then(WrongKindStep)
            .build();
        assert!(matches!(result, Err(WorkflowError::Configuration(_))));
    }

    #[test]
    fn test_build_rejects_unsatisfiable_workflow_output() {
        let result = Workflow::builder()
            .input_shape(Shape::new().field("name", FieldKind::Text))
            .output_shape(Shape::new().field("absent", FieldKind::Text))
            .then(ProduceStep)
            .build();
        assert!(matches!(result, Err(WorkflowError::Configuration(_))));
    }

    #[test]
    fn test_build_rejects_duplicate_step_ids() {
        let result = Workflow::builder()
            .input_shape(Shape::new().field("name", FieldKind::Text))
            .then(ProduceStep)
            .then(ProduceStep)
            .build();
        assert!(matches!(result, Err(WorkflowError::Configuration(_))));
    }

    #[test]
    fn test_build_rejects_empty_workflow() {
        let result = Workflow::builder().build();
        assert!(matches!(result, Err(WorkflowError::Configuration(_))));
    }
}
