use async_trait::async_trait;
use currency_core::{CurrencyError, RateTable, Result};
use std::time::Duration;
use tracing::debug;

pub const RATE_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Where rate tables come from.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch(&self) -> Result<RateTable>;
}

/// Fetches the rate table over HTTP with a fixed timeout.
#[derive(Debug, Clone)]
pub struct HttpRateSource {
    url: String,
    client: reqwest::Client,
}

impl HttpRateSource {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(RATE_FETCH_TIMEOUT)
            .build()
            .map_err(|e| CurrencyError::Fetch(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

#[async_trait]
impl RateSource for HttpRateSource {
    async fn fetch(&self) -> Result<RateTable> {
        debug!("Fetching rates from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| CurrencyError::Fetch(e.to_string()))?
            .error_for_status()
            .map_err(|e| CurrencyError::Fetch(e.to_string()))?;

        let table: RateTable = response
            .json()
            .await
            .map_err(|e| CurrencyError::Fetch(format!("Invalid rate payload: {}", e)))?;

        let table = table.normalized();
        debug!("Fetched {} rates against {}", table.rates.len(), table.base);
        Ok(table)
    }
}
