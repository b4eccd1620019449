//! Price source contract and the CoinGecko client.

use crate::context::PriceTable;
use crate::error::SourceError;
use async_trait::async_trait;
use reqwest::Client;

const COINGECKO_BASE_URL: &str = "https://api.coingecko.com";

/// Supplies current prices for a set of assets in a set of currencies.
///
/// Any failure from this source is fatal to the run; there is no degrade
/// path for a missing price.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Fetches prices for comma-separated asset ids and currency codes.
    async fn prices(&self, ids: &str, vs_currencies: &str) -> Result<PriceTable, SourceError>;
}

/// CoinGecko simple-price client.
pub struct CoinGecko {
    http: Client,
    base_url: String,
}

impl CoinGecko {
    /// Creates a client against the public CoinGecko API.
    pub fn new() -> Self {
        Self::with_base_url(COINGECKO_BASE_URL)
    }

    /// Creates a client against a custom endpoint.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
        }
    }
}

impl Default for CoinGecko {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceSource for CoinGecko {
    async fn prices(&self, ids: &str, vs_currencies: &str) -> Result<PriceTable, SourceError> {
        let url = format!("{}/api/v3/simple/price", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("ids", ids), ("vs_currencies", vs_currencies)])
            .header("accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                code: status.as_u16(),
                body,
            });
        }

        let table: PriceTable = response.json().await?;
        if table.is_empty() {
            return Err(SourceError::Malformed(
                "no data returned for the requested assets".to_string(),
            ));
        }
        Ok(table)
    }
}
