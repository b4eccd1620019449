//! The shared state threaded through one workflow run.

use crate::error::WorkflowError;
use crate::shape::Shape;
use serde_json::Value;
use std::collections::BTreeMap;

/// Prices keyed by asset id, then by currency code.
pub type PriceTable = BTreeMap<String, BTreeMap<String, f64>>;

/// Accumulating key-value state for a single run.
///
/// Keys are ordered so that iteration, and anything formatted from it, is
/// deterministic. The store grows monotonically: [`Context::merge`] only ever
/// adds or overwrites fields, it never removes one.
///
/// # Examples
///
/// ```
/// use coinpulse::Context;
///
/// let mut ctx = Context::new();
/// ctx.insert("ids", "bitcoin");
/// ctx.insert("sent", true);
///
/// assert_eq!(ctx.get_str("ids"), Some("bitcoin"));
/// assert_eq!(ctx.get_bool("sent"), Some(true));
/// assert_eq!(ctx.get_bool("ids"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    data: BTreeMap<String, Value>,
}

impl Context {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self {
            data: BTreeMap::new(),
        }
    }

    /// Inserts a value, replacing any previous value under the same key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.data.insert(key.into(), value.into());
    }

    /// Returns the raw value for a key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Returns the value for a key if it is a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    /// Returns the value for a key if it is a boolean.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.data.get(key).and_then(Value::as_bool)
    }

    /// Returns the value for a key if it is an array of strings.
    pub fn get_text_list(&self, key: &str) -> Option<Vec<String>> {
        let items = self.data.get(key)?.as_array()?;
        items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect()
    }

    /// Returns the value for a key if it is a price table.
    pub fn get_price_table(&self, key: &str) -> Option<PriceTable> {
        let value = self.data.get(key)?;
        serde_json::from_value(value.clone()).ok()
    }

    /// Like [`Context::get_str`], but missing or mistyped values are an error.
    pub fn require_str(&self, key: &str) -> Result<&str, WorkflowError> {
        self.get_str(key)
            .ok_or_else(|| WorkflowError::MissingField(key.to_string()))
    }

    /// Like [`Context::get_bool`], but missing or mistyped values are an error.
    pub fn require_bool(&self, key: &str) -> Result<bool, WorkflowError> {
        self.get_bool(key)
            .ok_or_else(|| WorkflowError::MissingField(key.to_string()))
    }

    /// Like [`Context::get_text_list`], but missing or mistyped values are an error.
    pub fn require_text_list(&self, key: &str) -> Result<Vec<String>, WorkflowError> {
        self.get_text_list(key)
            .ok_or_else(|| WorkflowError::MissingField(key.to_string()))
    }

    /// Like [`Context::get_price_table`], but missing or mistyped values are an error.
    pub fn require_price_table(&self, key: &str) -> Result<PriceTable, WorkflowError> {
        self.get_price_table(key)
            .ok_or_else(|| WorkflowError::MissingField(key.to_string()))
    }

    /// Returns `true` if the context contains the key.
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Returns an iterator over all keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.data.keys()
    }

    /// Returns the number of fields.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the context has no fields.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Merges a step's partial output into this context.
    ///
    /// Fields in `partial` overwrite same-named fields here; every other
    /// existing field is retained. Folding a run's partial outputs in step
    /// order through this function yields the final context.
    pub fn merge(&mut self, partial: Context) {
        self.data.extend(partial.data);
    }

    /// Projects the fields named by a shape into a new context.
    ///
    /// Fields absent from this context are skipped; callers that need
    /// presence guarantees validate against the shape first.
    pub fn extract(&self, shape: &Shape) -> Context {
        let mut out = Context::new();
        for field in shape.fields() {
            if let Some(value) = self.data.get(&field.name) {
                out.insert(field.name.clone(), value.clone());
            }
        }
        out
    }
}
