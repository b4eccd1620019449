//! Pure formatting step.

use crate::context::Context;
use crate::error::WorkflowError;
use crate::shape::{FieldKind, Shape};
use crate::step::{Step, StepId};
use crate::steps::keys;
use async_trait::async_trait;

/// Formats the price table and the reason into one summary text.
///
/// Purely deterministic: the price table is ordered, so fixed inputs
/// produce byte-identical output on every invocation.
#[derive(Debug, Default)]
pub struct FormatSummary;

#[async_trait]
impl Step for FormatSummary {
    fn id(&self) -> StepId {
        StepId::new("format-summary")
    }

    fn description(&self) -> &str {
        "Formats crypto prices and appends the reasoning"
    }

    fn input_shape(&self) -> Shape {
        Shape::new()
            .field(keys::PRICES, FieldKind::PriceTable)
            .field(keys::REASON, FieldKind::Text)
    }

    fn output_shape(&self) -> Shape {
        Shape::new().field(keys::SUMMARY, FieldKind::Text)
    }

    async fn execute(&self, ctx: &Context) -> Result<Context, WorkflowError> {
        let prices = ctx.require_price_table(keys::PRICES)?;
        let reason = ctx.require_str(keys::REASON)?;

        let mut lines = Vec::with_capacity(prices.len());
        for (asset, quotes) in &prices {
            let quote_list = quotes
                .iter()
                .map(|(currency, price)| format!("{}: {}", currency.to_uppercase(), price))
                .collect::<Vec<_>>()
                .join(" | ");
            lines.push(format!("{}: {}", asset.to_uppercase(), quote_list));
        }

        let summary = format!("{}\n\nReason: {}", lines.join("\n"), reason);
        let mut out = Context::new();
        out.insert(keys::SUMMARY, summary);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx() -> Context {
        let mut ctx = Context::new();
        ctx.insert(
            keys::PRICES,
            json!({"bitcoin": {"usd": 50000.0, "eur": 42000.0}, "ethereum": {"usd": 3000.0}}),
        );
        ctx.insert(keys::REASON, "Sentiment is positive.");
        ctx
    }

    #[tokio::test]
    async fn test_formats_prices_and_reason() {
        let out = FormatSummary.execute(&ctx()).await.unwrap();
        assert_eq!(
            out.get_str(keys::SUMMARY),
            Some(
                "BITCOIN: EUR: 42000 | USD: 50000\nETHEREUM: USD: 3000\n\nReason: Sentiment is positive."
            )
        );
    }

    #[tokio::test]
    async fn test_formatting_is_idempotent() {
        let context = ctx();
        let first = FormatSummary.execute(&context).await.unwrap();
        let second = FormatSummary.execute(&context).await.unwrap();
        assert_eq!(
            first.get_str(keys::SUMMARY),
            second.get_str(keys::SUMMARY)
        );
    }
}
