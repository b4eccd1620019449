//! # coinpulse
//!
//! A typed step pipeline for crypto market updates.
//!
//! The core is a small workflow engine: an ordered chain of [`Step`]s, each
//! declaring an input and output [`Shape`], executed strictly in order
//! against one accumulating [`Context`]. Chain compatibility is checked once
//! when the workflow is built; live data is re-checked at every step
//! boundary during a run.
//!
//! ## Features
//!
//! - **Type-checked chains**: an unsatisfiable step input fails at build
//!   time, before any run
//! - **Additive context**: each step contributes only its new fields; the
//!   engine merges them, so later steps can read anything produced earlier
//! - **Two error channels**: fatal errors abort the run; recoverable
//!   conditions become context flags that steer a cheaper degrade path
//! - **Injected collaborators**: price source, social source, summarizer and
//!   notifier are capability traits, swappable for fakes in tests
//!
//! ## Quick Start
//!
//! ```rust
//! use coinpulse::prelude::*;
//! use async_trait::async_trait;
//!
//! #[derive(Debug)]
//! struct Shout;
//!
//! #[async_trait]
//! impl Step for Shout {
//!     fn id(&self) -> StepId {
//!         StepId::new("shout")
//!     }
//!
//!     fn description(&self) -> &str {
//!         "Upper-cases the topic"
//!     }
//!
//!     fn input_shape(&self) -> Shape {
//!         Shape::new().field("topic", FieldKind::Text)
//!     }
//!
//!     fn output_shape(&self) -> Shape {
//!         Shape::new().field("loud", FieldKind::Text)
//!     }
//!
//!     async fn execute(&self, ctx: &Context) -> Result<Context, WorkflowError> {
//!         let topic = ctx.require_str("topic")?;
//!         let mut out = Context::new();
//!         out.insert("loud", topic.to_uppercase());
//!         Ok(out)
//!     }
//! }
//!
//! # #[tokio::main]
//! # async fn main() {
//! let workflow = Workflow::builder()
//!     .input_shape(Shape::new().field("topic", FieldKind::Text))
//!     .output_shape(Shape::new().field("loud", FieldKind::Text))
//!     .then(Shout)
//!     .build()
//!     .expect("valid workflow");
//!
//! let mut ctx = Context::new();
//! ctx.insert("topic", "bitcoin");
//!
//! let result = workflow.run(ctx).await.expect("workflow failed");
//! assert_eq!(result.get_str("loud"), Some("BITCOIN"));
//! # }
//! ```
//!
//! ## The Market-Update Pipeline
//!
//! [`pipeline::market_update_workflow`] assembles the concrete six-step
//! chain: fetch prices, fetch recent posts, analyze or skip, format,
//! notify, map the result. See [`steps`] for the individual steps and
//! [`collaborators`] for the external-service contracts.

mod context;
mod error;
mod shape;
mod step;
mod workflow;

pub mod collaborators;
pub mod config;
pub mod pipeline;
pub mod prelude;
pub mod steps;

pub use context::{Context, PriceTable};
pub use error::{SourceError, WorkflowError};
pub use shape::{Field, FieldKind, Shape, ShapeError};
pub use step::{Step, StepId};
pub use workflow::{Workflow, WorkflowBuilder};
