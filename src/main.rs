use anyhow::Result;
use async_trait::async_trait;
use clap::{Parser, Subcommand, ValueEnum};
use currency_config::PluginConfig;
use currency_core::{EventEmitter, InvocationContext, NotificationEvent, UserInfo, UserRole};
use currency_tools::CurrencyToolkit;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "currency-rate")]
#[command(about = "Live fiat and crypto currency rates", long_about = None)]
struct Cli {
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[arg(short, long, action = clap::ArgAction::SetTrue)]
    verbose: bool,

    /// Role of the calling user; admins receive update notices
    #[arg(short, long, value_enum, default_value_t = Role::User)]
    role: Role,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Role {
    Admin,
    User,
}

impl From<Role> for UserRole {
    fn from(role: Role) -> Self {
        match role {
            Role::Admin => UserRole::Admin,
            Role::User => UserRole::User,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an amount between two currencies
    Convert {
        /// Source currency code
        from: String,

        /// Target currency code (defaults to the base currency)
        to: Option<String>,

        #[arg(short, long, default_value_t = 1.0, allow_negative_numbers = true)]
        amount: f64,
    },

    /// Price of one unit of a cryptocurrency
    Price {
        #[arg(default_value = "BTC")]
        crypto: String,

        #[arg(default_value = "USD")]
        currency: String,
    },

    /// List available currencies
    List {
        /// crypto or fiat
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// List available tools
    Tools,
}

/// Prints notifications ahead of the tool output.
struct StdoutEmitter;

#[async_trait]
impl EventEmitter for StdoutEmitter {
    async fn emit(&self, event: NotificationEvent) -> currency_core::Result<()> {
        println!("{}", event.content());
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose)?;

    let config_path = cli.config.unwrap_or_else(PluginConfig::default_config_path);
    let config = if config_path.exists() {
        info!("Loading configuration from: {:?}", config_path);
        PluginConfig::from_yaml(&config_path)?
    } else {
        info!("Using default configuration");
        let mut config = PluginConfig::default();
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        config
    };

    let toolkit = CurrencyToolkit::from_config(&config)?;
    let ctx = InvocationContext::new()
        .with_user(UserInfo::new(cli.role.into()))
        .with_emitter(Arc::new(StdoutEmitter));

    let output = match cli.command {
        Commands::Convert { from, to, amount } => {
            toolkit
                .convert_currency(&from, to.as_deref(), Some(amount), &ctx)
                .await
        }
        Commands::Price { crypto, currency } => {
            toolkit.get_crypto_price(&crypto, &currency, &ctx).await
        }
        Commands::List { filter } => toolkit.list_currencies(filter.as_deref(), &ctx).await,
        Commands::Tools => {
            list_tools(&toolkit)?;
            return Ok(());
        }
    };

    println!("{output}");
    Ok(())
}

fn list_tools(toolkit: &CurrencyToolkit) -> Result<()> {
    println!("\n🛠️  Available Tools:");
    println!("═══════════════════════════════════════");

    let registry = toolkit.registry();
    for tool_name in registry.list() {
        if let Some(tool) = registry.get(&tool_name) {
            println!("\n📦 {}", tool.name());
            println!("   {}", tool.description());
            println!("   {}", serde_json::to_string(&tool.schema())?);
        }
    }
    println!();
    Ok(())
}

fn init_logging(verbose: bool) -> Result<()> {
    let filter = if verbose { "debug" } else { "info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(())
}
