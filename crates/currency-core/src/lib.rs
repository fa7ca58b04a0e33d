use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::warn;

pub mod clock;
pub mod context;
pub mod time;

pub use clock::{Clock, ManualClock, SystemClock};
pub use context::{EventEmitter, InvocationContext, NotificationEvent, UserInfo, UserRole};
pub use time::parse_timestamp;

/// Number of known codes listed when a lookup misses.
pub const KNOWN_CODES_HINT_LIMIT: usize = 20;

/// Rate table as served by the rate endpoint.
///
/// Fiat entries read "1 base = X fiat", crypto entries read "1 crypto = X base".
/// The base itself is never stored in `rates`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    #[serde(default = "default_base")]
    pub base: String,
    #[serde(default)]
    pub rates: BTreeMap<String, f64>,
    #[serde(default)]
    pub updated: String,
}

impl RateTable {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            rates: BTreeMap::new(),
            updated: String::new(),
        }
    }

    pub fn with_rate(mut self, code: impl Into<String>, rate: f64) -> Self {
        self.rates.insert(code.into(), rate);
        self
    }

    pub fn with_updated(mut self, updated: impl Into<String>) -> Self {
        self.updated = updated.into();
        self
    }

    /// Uppercase all codes, drop the base from `rates` and discard
    /// entries that are not finite and strictly positive.
    pub fn normalized(mut self) -> Self {
        self.base = self.base.trim().to_uppercase();
        if self.base.is_empty() {
            self.base = default_base();
        }

        let base = self.base.clone();
        self.rates = std::mem::take(&mut self.rates)
            .into_iter()
            .filter_map(|(code, rate)| {
                let code = code.trim().to_uppercase();
                if code == base {
                    return None;
                }
                if !rate.is_finite() || rate <= 0.0 {
                    warn!("Dropping unusable rate for {}: {}", code, rate);
                    return None;
                }
                Some((code, rate))
            })
            .collect();
        self
    }

    pub fn contains(&self, code: &str) -> bool {
        code == self.base || self.rates.contains_key(code)
    }

    pub fn rate(&self, code: &str) -> Option<f64> {
        self.rates.get(code).copied()
    }

    /// Base first, then every rated code in sorted order.
    pub fn codes(&self) -> Vec<&str> {
        std::iter::once(self.base.as_str())
            .chain(self.rates.keys().map(String::as_str))
            .collect()
    }

    pub fn known_codes_hint(&self) -> Vec<String> {
        self.rates
            .keys()
            .take(KNOWN_CODES_HINT_LIMIT)
            .cloned()
            .collect()
    }
}

fn default_base() -> String {
    "USD".to_string()
}

#[derive(Error, Debug)]
pub enum CurrencyError {
    #[error("Failed to fetch currency rates: {0}")]
    Fetch(String),

    #[error("Currency '{code}' not found. Available currencies include: {}...", known.join(", "))]
    UnknownCurrency { code: String, known: Vec<String> },

    #[error("Invalid timestamp: {0}")]
    TimestampParse(String),

    #[error("Amount must be a finite number, got {0}")]
    InvalidAmount(f64),

    #[error("Invalid filter type '{0}'. Use 'crypto', 'fiat', or leave empty for all.")]
    InvalidFilter(String),

    #[error("Tool execution failed for '{tool}': {message}")]
    ToolError { tool: String, message: String },

    #[error("Update check failed: {0}")]
    UpdateCheck(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl CurrencyError {
    /// Errors whose message is written for the end user and is shown
    /// without the generic "Error:" prefix.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            CurrencyError::UnknownCurrency { .. } | CurrencyError::InvalidFilter(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, CurrencyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rate_table() {
        let json = r#"{
            "base": "USD",
            "rates": {"EUR": 0.92, "BTC": 65000.0},
            "updated": "2024-05-01T12:00:00Z"
        }"#;

        let table: RateTable = serde_json::from_str(json).unwrap();
        assert_eq!(table.base, "USD");
        assert_eq!(table.rate("EUR"), Some(0.92));
        assert_eq!(table.updated, "2024-05-01T12:00:00Z");
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let table: RateTable = serde_json::from_str("{}").unwrap();
        assert_eq!(table.base, "USD");
        assert!(table.rates.is_empty());
        assert!(table.updated.is_empty());
    }

    #[test]
    fn test_normalized_drops_base_and_bad_rates() {
        let table = RateTable::new("usd")
            .with_rate("USD", 1.0)
            .with_rate("eur", 0.9)
            .with_rate("XXX", 0.0)
            .with_rate("YYY", -3.0)
            .with_rate("NAN", f64::NAN)
            .normalized();

        assert_eq!(table.base, "USD");
        assert_eq!(table.codes(), vec!["USD", "EUR"]);
        assert!(table.contains("USD"));
        assert!(!table.contains("XXX"));
    }

    #[test]
    fn test_known_codes_hint_is_sorted_and_limited() {
        let mut table = RateTable::new("USD");
        for i in (0..30).rev() {
            table.rates.insert(format!("C{i:02}"), 1.0);
        }

        let hint = table.known_codes_hint();
        assert_eq!(hint.len(), KNOWN_CODES_HINT_LIMIT);
        let mut sorted = hint.clone();
        sorted.sort();
        assert_eq!(hint, sorted);
    }

    #[test]
    fn test_unknown_currency_message() {
        let err = CurrencyError::UnknownCurrency {
            code: "ZZZ".into(),
            known: vec!["BTC".into(), "EUR".into()],
        };
        assert_eq!(
            err.to_string(),
            "Currency 'ZZZ' not found. Available currencies include: BTC, EUR..."
        );
        assert!(err.is_user_facing());
        assert!(!CurrencyError::Fetch("timeout".into()).is_user_facing());
    }
}
