//! Field shapes for step inputs and outputs.
//!
//! A [`Shape`] is the declared contract of one side of a step: which fields
//! must be present in the context and what kind of value each holds. Shapes
//! are checked twice, once structurally when the workflow is built and once
//! against live data at every step boundary during a run.

use crate::context::Context;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// The kind of value a context field may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A string.
    Text,
    /// A numeric value.
    Number,
    /// A boolean.
    Flag,
    /// An array of strings.
    TextList,
    /// A mapping from asset id to a mapping from currency code to price.
    PriceTable,
}

impl FieldKind {
    fn matches(self, value: &Value) -> bool {
        match self {
            FieldKind::Text => value.is_string(),
            FieldKind::Number => value.is_number(),
            FieldKind::Flag => value.is_boolean(),
            FieldKind::TextList => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
            FieldKind::PriceTable => value.as_object().is_some_and(|assets| {
                assets.values().all(|quotes| {
                    quotes
                        .as_object()
                        .is_some_and(|q| q.values().all(Value::is_number))
                })
            }),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Text => write!(f, "a text value"),
            FieldKind::Number => write!(f, "a number"),
            FieldKind::Flag => write!(f, "a flag"),
            FieldKind::TextList => write!(f, "a list of text values"),
            FieldKind::PriceTable => write!(f, "a price table"),
        }
    }
}

/// One declared field of a [`Shape`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Context key of the field.
    pub name: String,
    /// Expected kind of the value.
    pub kind: FieldKind,
    /// Optional fields are checked only when present.
    pub optional: bool,
}

/// A named set of typed fields describing a step input or output.
///
/// # Examples
///
/// ```
/// use coinpulse::{FieldKind, Shape};
///
/// let shape = Shape::new()
///     .field("tweets", FieldKind::TextList)
///     .optional("rate_limited", FieldKind::Flag);
/// assert_eq!(shape.fields().len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Shape {
    fields: Vec<Field>,
}

impl Shape {
    /// Creates an empty shape.
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Adds a required field.
    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.push(Field {
            name: name.into(),
            kind,
            optional: false,
        });
        self
    }

    /// Adds an optional field.
    pub fn optional(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.push(Field {
            name: name.into(),
            kind,
            optional: true,
        });
        self
    }

    /// Returns the declared fields in declaration order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Validates a context against this shape.
    ///
    /// Every required field must be present with a matching kind; optional
    /// fields are kind-checked only when present.
    pub fn validate(&self, ctx: &Context) -> Result<(), ShapeError> {
        for field in &self.fields {
            match ctx.get(&field.name) {
                Some(value) => {
                    if !field.kind.matches(value) {
                        return Err(ShapeError::Kind(field.name.clone(), field.kind));
                    }
                }
                None => {
                    if !field.optional {
                        return Err(ShapeError::Missing(field.name.clone()));
                    }
                }
            }
        }
        Ok(())
    }
}

/// A single validation failure produced by [`Shape::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    /// A required field is absent from the context.
    #[error("missing required field '{0}'")]
    Missing(String),

    /// A field is present but its value has the wrong kind.
    #[error("field '{0}' is not {1}")]
    Kind(String, FieldKind),
}
