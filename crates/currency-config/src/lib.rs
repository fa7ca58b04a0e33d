use currency_core::{CurrencyError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub mod env_substitution;

pub use env_substitution::substitute_env_vars;

pub const DEFAULT_API_URL: &str = "https://cdn.jsdelivr.net/gh/anvme/currency@main/latest.json";

/// Options the host exposes to the operator for this plugin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginConfig {
    #[serde(default = "default_true", alias = "enableUpdateCheck")]
    pub enable_update_check: bool,
    /// Seconds a fetched rate table is served without refetching.
    #[serde(default = "default_cache_duration", alias = "cacheDuration")]
    pub cache_duration: u64,
    #[serde(default = "default_api_url", alias = "apiUrl")]
    pub api_url: String,
    #[serde(default)]
    pub catalog: CatalogSettings,
    #[serde(default)]
    pub update: UpdateSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSettings {
    /// Codes whose table rate is quoted as "1 unit = X base".
    #[serde(default = "default_crypto_symbols")]
    pub crypto_symbols: Vec<String>,
    /// Extra or overriding display names, keyed by code.
    #[serde(default)]
    pub currency_names: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSettings {
    #[serde(default = "default_github_owner")]
    pub github_owner: String,
    #[serde(default = "default_github_repo")]
    pub github_repo: String,
    #[serde(default = "default_extension_url")]
    pub extension_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_file: Option<PathBuf>,
}

impl PluginConfig {
    pub fn from_yaml(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| CurrencyError::ConfigError(format!("Failed to read config file: {}", e)))?;

        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let mut value: serde_json::Value = serde_yaml::from_str(yaml)
            .map_err(|e| CurrencyError::ConfigError(format!("Failed to parse YAML: {}", e)))?;

        // An empty document parses as null
        if value.is_null() {
            value = serde_json::Value::Object(Default::default());
        }

        substitute_env_vars(&mut value)?;

        let mut config: PluginConfig = serde_json::from_value(value)
            .map_err(|e| CurrencyError::ConfigError(format!("Invalid configuration: {}", e)))?;

        config.apply_env_overrides(|key| env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    /// Apply `LIVE_CURRENCY_*` overrides looked up through `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("LIVE_CURRENCY_API_URL") {
            debug!("API URL overridden from environment");
            self.api_url = url;
        }
        if let Some(raw) = lookup("LIVE_CURRENCY_CACHE_DURATION") {
            self.cache_duration = raw.trim().parse().map_err(|_| {
                CurrencyError::ConfigError(format!(
                    "LIVE_CURRENCY_CACHE_DURATION must be a number of seconds, got '{}'",
                    raw
                ))
            })?;
        }
        if let Some(path) = lookup("LIVE_CURRENCY_STATE_FILE") {
            self.update.state_file = Some(PathBuf::from(path));
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            return Err(CurrencyError::ConfigError(
                "api_url must start with http:// or https://".into(),
            ));
        }
        if self.catalog.crypto_symbols.iter().any(|s| s.trim().is_empty()) {
            return Err(CurrencyError::ConfigError("Crypto symbols cannot be empty".into()));
        }
        if self.update.github_owner.is_empty() || self.update.github_repo.is_empty() {
            return Err(CurrencyError::ConfigError(
                "GitHub owner and repository cannot be empty".into(),
            ));
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_duration)
    }

    pub fn default_config_path() -> PathBuf {
        let home_dir = env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home_dir).join(".live-currency-rate").join("config.yaml")
    }
}

impl UpdateSettings {
    pub fn repo_url(&self) -> String {
        format!("https://github.com/{}/{}", self.github_owner, self.github_repo)
    }

    pub fn latest_release_url(&self) -> String {
        format!(
            "https://api.github.com/repos/{}/{}/releases/latest",
            self.github_owner, self.github_repo
        )
    }

    pub fn state_file_path(&self) -> PathBuf {
        self.state_file.clone().unwrap_or_else(|| {
            env::temp_dir().join(format!(
                "live_currency_rate_update_{}_{}.json",
                self.github_owner, self.github_repo
            ))
        })
    }
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            enable_update_check: true,
            cache_duration: default_cache_duration(),
            api_url: default_api_url(),
            catalog: CatalogSettings::default(),
            update: UpdateSettings::default(),
        }
    }
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            crypto_symbols: default_crypto_symbols(),
            currency_names: HashMap::new(),
        }
    }
}

impl Default for UpdateSettings {
    fn default() -> Self {
        Self {
            github_owner: default_github_owner(),
            github_repo: default_github_repo(),
            extension_url: default_extension_url(),
            state_file: None,
        }
    }
}

fn default_true() -> bool { true }
fn default_cache_duration() -> u64 { 180 }
fn default_api_url() -> String { DEFAULT_API_URL.to_string() }
fn default_github_owner() -> String { "anvme".to_string() }
fn default_github_repo() -> String { "openwebui-live_currency_rate".to_string() }
fn default_extension_url() -> String {
    "https://openwebui.com/t/anvme/live_currency_rate".to_string()
}

fn default_crypto_symbols() -> Vec<String> {
    vec!["BTC".to_string(), "ETH".to_string(), "SOL".to_string()]
}
