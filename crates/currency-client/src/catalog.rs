use currency_config::CatalogSettings;
use std::collections::{BTreeSet, HashMap};

const BUILTIN_NAMES: &[(&str, &str)] = &[
    ("USD", "United States Dollar ($)"),
    ("EUR", "Euro (€)"),
    ("JPY", "Japanese Yen (¥)"),
    ("GBP", "British Pound (£)"),
    ("CNY", "Chinese Yuan (¥)"),
    ("AUD", "Australian Dollar (A$)"),
    ("CAD", "Canadian Dollar (C$)"),
    ("CHF", "Swiss Franc (Fr)"),
    ("HKD", "Hong Kong Dollar (HK$)"),
    ("SGD", "Singapore Dollar (S$)"),
    ("NZD", "New Zealand Dollar (NZ$)"),
    ("SEK", "Swedish Krona (kr)"),
    ("KRW", "South Korean Won (₩)"),
    ("NOK", "Norwegian Krone (kr)"),
    ("INR", "Indian Rupee (₹)"),
    ("MXN", "Mexican Peso ($)"),
    ("BRL", "Brazilian Real (R$)"),
    ("ZAR", "South African Rand (R)"),
    ("TRY", "Turkish Lira (₺)"),
    ("DKK", "Danish Krone (kr)"),
    ("PLN", "Polish Zloty (zł)"),
    ("CZK", "Czech Koruna (Kč)"),
    ("ILS", "Israeli New Shekel (₪)"),
    ("THB", "Thai Baht (฿)"),
    ("MYR", "Malaysian Ringgit (RM)"),
    ("PHP", "Philippine Peso (₱)"),
    ("IDR", "Indonesian Rupiah (Rp)"),
    ("HUF", "Hungarian Forint (Ft)"),
    ("RON", "Romanian Leu (lei)"),
    ("BGN", "Bulgarian Lev (лв)"),
    ("ISK", "Icelandic Króna (kr)"),
    ("BTC", "Bitcoin (BTC)"),
    ("SOL", "Solana (SOL)"),
    ("ETH", "Ethereum (ETH)"),
];

const DEFAULT_CRYPTO: &[&str] = &["BTC", "ETH", "SOL"];

/// Which codes are crypto and what to call each code.
#[derive(Debug, Clone)]
pub struct CurrencyCatalog {
    crypto: BTreeSet<String>,
    names: HashMap<String, String>,
}

impl CurrencyCatalog {
    pub fn new<I, S>(crypto_symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            crypto: crypto_symbols
                .into_iter()
                .map(|s| s.as_ref().trim().to_uppercase())
                .collect(),
            names: BUILTIN_NAMES
                .iter()
                .map(|(code, name)| (code.to_string(), name.to_string()))
                .collect(),
        }
    }

    pub fn from_settings(settings: &CatalogSettings) -> Self {
        settings
            .currency_names
            .iter()
            .fold(Self::new(&settings.crypto_symbols), |catalog, (code, name)| {
                catalog.with_name(code, name)
            })
    }

    pub fn with_name(mut self, code: impl AsRef<str>, name: impl Into<String>) -> Self {
        self.names
            .insert(code.as_ref().trim().to_uppercase(), name.into());
        self
    }

    pub fn is_crypto(&self, code: &str) -> bool {
        self.crypto.contains(code)
    }

    /// Display name for `code`, or the code itself when unknown.
    pub fn name<'a>(&'a self, code: &'a str) -> &'a str {
        self.names.get(code).map(String::as_str).unwrap_or(code)
    }
}

impl Default for CurrencyCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_CRYPTO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_classification() {
        let catalog = CurrencyCatalog::default();
        assert!(catalog.is_crypto("BTC"));
        assert!(catalog.is_crypto("ETH"));
        assert!(catalog.is_crypto("SOL"));
        assert!(!catalog.is_crypto("USD"));
        assert!(!catalog.is_crypto("DOGE"));
    }

    #[test]
    fn test_names() {
        let catalog = CurrencyCatalog::default();
        assert_eq!(BUILTIN_NAMES.len(), 34);
        assert_eq!(catalog.name("EUR"), "Euro (€)");
        assert_eq!(catalog.name("BTC"), "Bitcoin (BTC)");
        assert_eq!(catalog.name("XYZ"), "XYZ");
    }

    #[test]
    fn test_from_settings_extends_catalog() {
        let mut settings = CatalogSettings::default();
        settings.crypto_symbols.push("doge".into());
        settings
            .currency_names
            .insert("DOGE".into(), "Dogecoin (DOGE)".into());
        settings
            .currency_names
            .insert("usd".into(), "US Dollar ($)".into());

        let catalog = CurrencyCatalog::from_settings(&settings);
        assert!(catalog.is_crypto("DOGE"));
        assert_eq!(catalog.name("DOGE"), "Dogecoin (DOGE)");
        assert_eq!(catalog.name("USD"), "US Dollar ($)");
    }
}
