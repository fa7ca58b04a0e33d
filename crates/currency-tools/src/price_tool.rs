use async_trait::async_trait;
use currency_core::Result;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::{parse_args, ConvertCurrencyTool, Tool};

pub const GET_CRYPTO_PRICE: &str = "get_crypto_price";

/// Price of one unit of a coin; a shortcut over [`ConvertCurrencyTool`].
pub struct CryptoPriceTool {
    convert: Arc<ConvertCurrencyTool>,
}

#[derive(Debug, Deserialize)]
struct PriceArgs {
    #[serde(default = "default_crypto")]
    crypto: String,
    #[serde(default = "default_currency")]
    currency: String,
}

fn default_crypto() -> String { "BTC".to_string() }
fn default_currency() -> String { "USD".to_string() }

impl CryptoPriceTool {
    pub fn new(convert: Arc<ConvertCurrencyTool>) -> Self {
        Self { convert }
    }

    pub async fn price(&self, crypto: &str, currency: &str) -> Result<String> {
        self.convert.convert(crypto, Some(currency), 1.0).await
    }
}

#[async_trait]
impl Tool for CryptoPriceTool {
    fn name(&self) -> &str {
        GET_CRYPTO_PRICE
    }

    fn description(&self) -> &str {
        "Get the current price of one unit of a cryptocurrency (BTC, ETH or SOL) in any currency. \
         For other amounts use convert_currency."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "crypto": {
                    "type": "string",
                    "description": "Cryptocurrency code: BTC, ETH or SOL",
                    "default": "BTC"
                },
                "currency": {
                    "type": "string",
                    "description": "Target currency code, fiat or crypto",
                    "default": "USD"
                }
            }
        })
    }

    async fn execute(&self, args: Value) -> Result<String> {
        let args: PriceArgs = parse_args(self.name(), args)?;
        self.price(&args.crypto, &args.currency).await
    }
}
