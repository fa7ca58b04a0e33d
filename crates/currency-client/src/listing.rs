use currency_core::{CurrencyError, RateTable, Result};
use std::str::FromStr;

use crate::catalog::CurrencyCatalog;

const FIAT_COLUMNS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CurrencyFilter {
    #[default]
    All,
    Crypto,
    Fiat,
}

impl CurrencyFilter {
    /// `None` and blank input select everything.
    pub fn parse(raw: Option<&str>) -> Result<Self> {
        match raw.map(str::trim) {
            None | Some("") => Ok(CurrencyFilter::All),
            Some(raw) => raw.parse(),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            CurrencyFilter::All => "All Currencies",
            CurrencyFilter::Crypto => "Cryptocurrencies",
            CurrencyFilter::Fiat => "Fiat Currencies",
        }
    }
}

impl FromStr for CurrencyFilter {
    type Err = CurrencyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "crypto" => Ok(CurrencyFilter::Crypto),
            "fiat" => Ok(CurrencyFilter::Fiat),
            _ => Err(CurrencyError::InvalidFilter(s.to_string())),
        }
    }
}

pub fn render_listing(
    table: &RateTable,
    catalog: &CurrencyCatalog,
    filter: CurrencyFilter,
) -> String {
    let (crypto, fiat): (Vec<&str>, Vec<&str>) = table
        .codes()
        .into_iter()
        .partition(|code| catalog.is_crypto(code));

    let (crypto, fiat) = match filter {
        CurrencyFilter::All => (crypto, fiat),
        CurrencyFilter::Crypto => (crypto, Vec::new()),
        CurrencyFilter::Fiat => (Vec::new(), fiat),
    };

    let mut response = format!(
        "💰 **{}** ({} available)\n\n",
        filter.title(),
        crypto.len() + fiat.len()
    );

    if !crypto.is_empty() {
        response.push_str("**🪙 Cryptocurrencies:**\n");
        let mut sorted = crypto;
        sorted.sort_unstable();
        for code in sorted {
            response.push_str(&format!("• {} - {}\n", code, catalog.name(code)));
        }
        response.push('\n');
    }

    if !fiat.is_empty() {
        response.push_str("**💵 Fiat Currencies:**\n");
        for row in fiat.chunks(FIAT_COLUMNS) {
            let mut row = row.to_vec();
            row.sort_unstable();
            response.push_str(&format!("• {}\n", row.join(", ")));
        }
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RateTable {
        RateTable::new("USD")
            .with_rate("EUR", 0.92)
            .with_rate("GBP", 0.79)
            .with_rate("AUD", 1.52)
            .with_rate("BTC", 65000.0)
            .with_rate("SOL", 150.0)
    }

    #[test]
    fn test_filter_parsing() {
        assert_eq!(CurrencyFilter::parse(None).unwrap(), CurrencyFilter::All);
        assert_eq!(CurrencyFilter::parse(Some(" ")).unwrap(), CurrencyFilter::All);
        assert_eq!(CurrencyFilter::parse(Some("Crypto")).unwrap(), CurrencyFilter::Crypto);
        assert_eq!(CurrencyFilter::parse(Some("FIAT")).unwrap(), CurrencyFilter::Fiat);

        assert!(CurrencyFilter::parse(Some("all")).is_err());

        let err = CurrencyFilter::parse(Some("stocks")).unwrap_err();
        assert!(err.is_user_facing());
        assert!(err.to_string().starts_with("Invalid filter type 'stocks'"));
    }

    #[test]
    fn test_render_all() {
        let text = render_listing(&table(), &CurrencyCatalog::default(), CurrencyFilter::All);
        assert_eq!(
            text,
            "💰 **All Currencies** (6 available)\n\n\
             **🪙 Cryptocurrencies:**\n\
             • BTC - Bitcoin (BTC)\n\
             • SOL - Solana (SOL)\n\n\
             **💵 Fiat Currencies:**\n\
             • AUD, EUR, USD\n\
             • GBP\n"
        );
    }

    #[test]
    fn test_render_crypto_only() {
        let text = render_listing(&table(), &CurrencyCatalog::default(), CurrencyFilter::Crypto);
        assert!(text.starts_with("💰 **Cryptocurrencies** (2 available)"));
        assert!(!text.contains("Fiat"));
    }

    #[test]
    fn test_render_fiat_only() {
        let text = render_listing(&table(), &CurrencyCatalog::default(), CurrencyFilter::Fiat);
        assert!(text.starts_with("💰 **Fiat Currencies** (4 available)"));
        assert!(!text.contains("Bitcoin"));
    }
}
