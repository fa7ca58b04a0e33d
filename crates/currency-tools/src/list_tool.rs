use async_trait::async_trait;
use currency_client::{render_listing, CurrencyCatalog, CurrencyFilter, RateService};
use currency_core::Result;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::{parse_args, Tool};

pub const LIST_CURRENCIES: &str = "list_currencies";

pub struct ListCurrenciesTool {
    rates: Arc<RateService>,
    catalog: Arc<CurrencyCatalog>,
}

#[derive(Debug, Deserialize)]
struct ListArgs {
    #[serde(default, alias = "filter")]
    filter_type: Option<String>,
}

impl ListCurrenciesTool {
    pub fn new(rates: Arc<RateService>, catalog: Arc<CurrencyCatalog>) -> Self {
        Self { rates, catalog }
    }

    pub async fn list(&self, filter_type: Option<&str>) -> Result<String> {
        let filter = CurrencyFilter::parse(filter_type)?;
        let table = self.rates.get_rates().await?;
        Ok(render_listing(&table, &self.catalog, filter))
    }
}

#[async_trait]
impl Tool for ListCurrenciesTool {
    fn name(&self) -> &str {
        LIST_CURRENCIES
    }

    fn description(&self) -> &str {
        "List all available currencies, optionally only crypto or only fiat"
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "filter_type": {
                    "type": ["string", "null"],
                    "enum": ["crypto", "fiat", null],
                    "description": "Filter by type: 'crypto', 'fiat', or null for all"
                }
            }
        })
    }

    async fn execute(&self, args: Value) -> Result<String> {
        let args: ListArgs = parse_args(self.name(), args)?;
        self.list(args.filter_type.as_deref()).await
    }
}
