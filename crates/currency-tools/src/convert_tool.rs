use async_trait::async_trait;
use currency_client::{convert, render_conversion, CurrencyCatalog, RateService};
use currency_core::Result;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

use crate::{parse_args, Tool};

pub const CONVERT_CURRENCY: &str = "convert_currency";

pub struct ConvertCurrencyTool {
    rates: Arc<RateService>,
    catalog: Arc<CurrencyCatalog>,
}

#[derive(Debug, Deserialize)]
struct ConvertArgs {
    #[serde(alias = "from")]
    from_currency: String,
    #[serde(default, alias = "to")]
    to_currency: Option<String>,
    #[serde(default)]
    amount: Option<f64>,
}

impl ConvertCurrencyTool {
    pub fn new(rates: Arc<RateService>, catalog: Arc<CurrencyCatalog>) -> Self {
        Self { rates, catalog }
    }

    /// Convert `amount` of `from` into `to` (the table base when `None`)
    /// and render the result for the chat.
    pub async fn convert(&self, from: &str, to: Option<&str>, amount: f64) -> Result<String> {
        let table = self.rates.get_rates().await?;
        let conversion = convert(&table, &self.catalog, from, to, amount)?;

        debug!(
            "Converted {} {} -> {} {}",
            conversion.amount, conversion.from, conversion.result, conversion.to
        );
        Ok(render_conversion(&conversion, &table.updated, &self.catalog))
    }
}

#[async_trait]
impl Tool for ConvertCurrencyTool {
    fn name(&self) -> &str {
        CONVERT_CURRENCY
    }

    fn description(&self) -> &str {
        "Convert between any two currencies: fiat to fiat, fiat to crypto, crypto to fiat \
         or crypto to crypto. Call this instead of calculating conversions manually."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "from_currency": {
                    "type": "string",
                    "description": "Source currency code (e.g. USD, BTC, EUR, SOL, ETH, GBP)"
                },
                "to_currency": {
                    "type": "string",
                    "description": "Target currency code (defaults to the base currency, USD)"
                },
                "amount": {
                    "type": "number",
                    "description": "Amount to convert (default: 1)",
                    "default": 1.0
                }
            },
            "required": ["from_currency"]
        })
    }

    async fn execute(&self, args: Value) -> Result<String> {
        let args: ConvertArgs = parse_args(self.name(), args)?;
        self.convert(
            &args.from_currency,
            args.to_currency.as_deref(),
            args.amount.unwrap_or(1.0),
        )
        .await
    }
}
