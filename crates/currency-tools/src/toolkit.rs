use currency_client::{CurrencyCatalog, RateService};
use currency_config::PluginConfig;
use currency_core::{CurrencyError, InvocationContext, Result};
use currency_update::UpdateNotifier;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::{ConvertCurrencyTool, CryptoPriceTool, ListCurrenciesTool, ToolRegistry};

/// Version reported to the update notifier.
pub const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// What the host talks to: every call runs the update side path first and
/// always comes back as display text.
pub struct CurrencyToolkit {
    registry: ToolRegistry,
    notifier: UpdateNotifier,
    convert: Arc<ConvertCurrencyTool>,
    price: Arc<CryptoPriceTool>,
    list: Arc<ListCurrenciesTool>,
}

impl CurrencyToolkit {
    pub fn new(
        rates: Arc<RateService>,
        catalog: Arc<CurrencyCatalog>,
        notifier: UpdateNotifier,
    ) -> Result<Self> {
        let convert = Arc::new(ConvertCurrencyTool::new(rates.clone(), catalog.clone()));
        let price = Arc::new(CryptoPriceTool::new(convert.clone()));
        let list = Arc::new(ListCurrenciesTool::new(rates, catalog));

        // The typed helpers and `invoke` share these instances
        let registry = ToolRegistry::new();
        registry.register_shared(convert.clone())?;
        registry.register_shared(price.clone())?;
        registry.register_shared(list.clone())?;

        Ok(Self {
            registry,
            notifier,
            convert,
            price,
            list,
        })
    }

    pub fn from_config(config: &PluginConfig) -> Result<Self> {
        let rates = Arc::new(RateService::from_config(config)?);
        let catalog = Arc::new(CurrencyCatalog::from_settings(&config.catalog));
        let notifier = UpdateNotifier::from_config(config, CURRENT_VERSION)?;

        info!(
            "Currency toolkit ready (api: {}, cache: {}s, update check: {})",
            config.api_url, config.cache_duration, config.enable_update_check
        );
        Self::new(rates, catalog, notifier)
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Run a tool by name with JSON arguments.
    #[instrument(skip(self, args, ctx))]
    pub async fn invoke(&self, name: &str, args: Value, ctx: &InvocationContext) -> String {
        self.side_path(ctx).await;

        let result = match self.registry.get(name) {
            Some(tool) => tool.execute(args).await,
            None => Err(CurrencyError::ToolError {
                tool: name.to_string(),
                message: "Unknown tool".into(),
            }),
        };
        collapse(result)
    }

    pub async fn convert_currency(
        &self,
        from_currency: &str,
        to_currency: Option<&str>,
        amount: Option<f64>,
        ctx: &InvocationContext,
    ) -> String {
        self.side_path(ctx).await;
        collapse(
            self.convert
                .convert(from_currency, to_currency, amount.unwrap_or(1.0))
                .await,
        )
    }

    pub async fn get_crypto_price(
        &self,
        crypto: &str,
        currency: &str,
        ctx: &InvocationContext,
    ) -> String {
        self.side_path(ctx).await;
        collapse(self.price.price(crypto, currency).await)
    }

    pub async fn list_currencies(
        &self,
        filter_type: Option<&str>,
        ctx: &InvocationContext,
    ) -> String {
        self.side_path(ctx).await;
        collapse(self.list.list(filter_type).await)
    }

    async fn side_path(&self, ctx: &InvocationContext) {
        self.notifier
            .run(ctx.user.as_ref(), ctx.emitter.as_deref())
            .await;
    }
}

fn collapse(result: Result<String>) -> String {
    result.unwrap_or_else(|e| {
        warn!("Tool call failed: {}", e);
        render_error(&e)
    })
}

/// User-facing text for a failed tool call.
pub fn render_error(error: &CurrencyError) -> String {
    if error.is_user_facing() {
        format!("❌ {}", error)
    } else {
        format!("❌ Error: {}", error)
    }
}
