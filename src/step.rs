//! Step trait and related types.

use crate::context::Context;
use crate::error::WorkflowError;
use crate::shape::Shape;
use async_trait::async_trait;
use std::fmt::{self, Debug};

/// Type-safe step identifier wrapper.
///
/// # Examples
///
/// ```
/// use coinpulse::StepId;
///
/// let id = StepId::new("fetch-prices");
/// assert_eq!(id.as_str(), "fetch-prices");
///
/// let id: StepId = "analyze-or-skip".into();
/// assert_eq!(id.as_str(), "analyze-or-skip");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StepId(String);

impl StepId {
    /// Creates a new StepId.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for StepId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for StepId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for StepId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for StepId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for StepId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for StepId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// One named unit of validated, ordered work in a pipeline.
///
/// A step declares the fields it reads ([`Step::input_shape`]) and the fields
/// it contributes ([`Step::output_shape`]), and implements `execute` against
/// a shared view of the live context. Execute must not mutate the context; it
/// returns only the fields it adds or changes, and the engine merges them in.
///
/// Side effects such as network calls are expected inside `execute`. They are
/// not retried: a fatal error propagates and aborts the run. A step that
/// wants a collaborator failure to be recoverable catches it itself and
/// converts it into a flag field in its successful output.
///
/// # Examples
///
/// ```
/// use coinpulse::{Context, FieldKind, Shape, Step, StepId, WorkflowError};
/// use async_trait::async_trait;
///
/// #[derive(Debug)]
/// struct Uppercase;
///
/// #[async_trait]
/// impl Step for Uppercase {
///     fn id(&self) -> StepId {
///         StepId::new("uppercase")
///     }
///
///     fn description(&self) -> &str {
///         "Upper-cases the topic"
///     }
///
///     fn input_shape(&self) -> Shape {
///         Shape::new().field("topic", FieldKind::Text)
///     }
///
///     fn output_shape(&self) -> Shape {
///         Shape::new().field("topic_upper", FieldKind::Text)
///     }
///
///     async fn execute(&self, ctx: &Context) -> Result<Context, WorkflowError> {
///         let topic = ctx.require_str("topic")?;
///         let mut out = Context::new();
///         out.insert("topic_upper", topic.to_uppercase());
///         Ok(out)
///     }
/// }
/// ```
#[async_trait]
pub trait Step: Send + Sync + Debug {
    /// Returns the unique step id.
    fn id(&self) -> StepId;

    /// Returns a human-readable description of the step.
    fn description(&self) -> &str;

    /// Returns the fields this step requires from the context.
    fn input_shape(&self) -> Shape;

    /// Returns the fields this step contributes to the context.
    fn output_shape(&self) -> Shape;

    /// Executes the step against the live context.
    ///
    /// Returns the partial context to merge on success, or a fatal error
    /// that aborts the run.
    async fn execute(&self, ctx: &Context) -> Result<Context, WorkflowError>;
}
