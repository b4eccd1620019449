//! Price-fetch step.

use crate::collaborators::PriceSource;
use crate::context::{Context, PriceTable};
use crate::error::WorkflowError;
use crate::shape::{FieldKind, Shape};
use crate::step::{Step, StepId};
use crate::steps::keys;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Fetches current prices for the requested assets and currencies.
///
/// Any price-source failure is fatal: without prices there is nothing
/// worth reporting.
pub struct FetchPrices {
    source: Arc<dyn PriceSource>,
}

impl FetchPrices {
    /// Creates the step with an injected price source.
    pub fn new(source: Arc<dyn PriceSource>) -> Self {
        Self { source }
    }
}

impl fmt::Debug for FetchPrices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchPrices").finish_non_exhaustive()
    }
}

fn price_table_value(table: &PriceTable) -> Value {
    let mut assets = Map::new();
    for (asset, quotes) in table {
        let mut row = Map::new();
        for (currency, price) in quotes {
            row.insert(currency.clone(), Value::from(*price));
        }
        assets.insert(asset.clone(), Value::Object(row));
    }
    Value::Object(assets)
}

#[async_trait]
impl Step for FetchPrices {
    fn id(&self) -> StepId {
        StepId::new("fetch-prices")
    }

    fn description(&self) -> &str {
        "Fetches cryptocurrency prices for the requested coins and currencies"
    }

    fn input_shape(&self) -> Shape {
        Shape::new()
            .field(keys::IDS, FieldKind::Text)
            .field(keys::VS_CURRENCIES, FieldKind::Text)
    }

    fn output_shape(&self) -> Shape {
        Shape::new().field(keys::PRICES, FieldKind::PriceTable)
    }

    async fn execute(&self, ctx: &Context) -> Result<Context, WorkflowError> {
        let ids = ctx.require_str(keys::IDS)?;
        let vs_currencies = ctx.require_str(keys::VS_CURRENCIES)?;

        let table = self
            .source
            .prices(ids, vs_currencies)
            .await
            .map_err(|source| WorkflowError::Collaborator {
                step_id: self.id(),
                source,
            })?;

        let mut out = Context::new();
        out.insert(keys::PRICES, price_table_value(&table));
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceError;
    use std::collections::BTreeMap;

    struct FixedPrices(PriceTable);

    #[async_trait]
    impl PriceSource for FixedPrices {
        async fn prices(&self, _ids: &str, _vs: &str) -> Result<PriceTable, SourceError> {
            Ok(self.0.clone())
        }
    }

    struct BrokenPrices;

    #[async_trait]
    impl PriceSource for BrokenPrices {
        async fn prices(&self, _ids: &str, _vs: &str) -> Result<PriceTable, SourceError> {
            Err(SourceError::Status {
                code: 500,
                body: "server error".to_string(),
            })
        }
    }

    fn input() -> Context {
        let mut ctx = Context::new();
        ctx.insert(keys::IDS, "bitcoin");
        ctx.insert(keys::VS_CURRENCIES, "usd");
        ctx
    }

    fn table() -> PriceTable {
        BTreeMap::from([(
            "bitcoin".to_string(),
            BTreeMap::from([("usd".to_string(), 50000.0)]),
        )])
    }

    #[tokio::test]
    async fn test_produces_price_table() {
        let step = FetchPrices::new(Arc::new(FixedPrices(table())));
        let out = step.execute(&input()).await.unwrap();

        let prices = out.require_price_table(keys::PRICES).unwrap();
        assert_eq!(prices["bitcoin"]["usd"], 50000.0);
        // Only the new field is contributed
        assert_eq!(out.len(), 1);
    }

    #[tokio::test]
    async fn test_source_failure_is_fatal() {
        let step = FetchPrices::new(Arc::new(BrokenPrices));
        let result = step.execute(&input()).await;
        assert!(matches!(
            result,
            Err(WorkflowError::Collaborator { step_id, .. }) if step_id == "fetch-prices"
        ));
    }
}
