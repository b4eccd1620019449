//! Commonly used types and traits

pub use crate::context::Context;
pub use crate::error::{SourceError, WorkflowError};
pub use crate::shape::{FieldKind, Shape};
pub use crate::step::{Step, StepId};
pub use crate::workflow::Workflow;
