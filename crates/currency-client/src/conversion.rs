use currency_core::{CurrencyError, RateTable, Result};

use crate::catalog::CurrencyCatalog;

/// Result of converting `amount` units of `from` into `to`.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub from: String,
    pub to: String,
    pub amount: f64,
    pub result: f64,
    /// `result / amount`; undefined for a zero amount.
    pub rate: Option<f64>,
}

pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Convert between any two codes of `table`. A missing or blank `to`
/// means the table's base.
pub fn convert(
    table: &RateTable,
    catalog: &CurrencyCatalog,
    from: &str,
    to: Option<&str>,
    amount: f64,
) -> Result<Conversion> {
    let from = normalize_code(from);
    let to = to
        .map(normalize_code)
        .filter(|code| !code.is_empty())
        .unwrap_or_else(|| table.base.clone());

    ensure_known(table, &from)?;
    ensure_known(table, &to)?;

    if !amount.is_finite() {
        return Err(CurrencyError::InvalidAmount(amount));
    }

    let base_value = to_base(table, catalog, &from, amount)?;
    let result = from_base(table, catalog, &to, base_value)?;
    let rate = (amount != 0.0).then(|| result / amount);

    Ok(Conversion {
        from,
        to,
        amount,
        result,
        rate,
    })
}

fn ensure_known(table: &RateTable, code: &str) -> Result<()> {
    if table.contains(code) {
        Ok(())
    } else {
        Err(unknown(table, code))
    }
}

fn unknown(table: &RateTable, code: &str) -> CurrencyError {
    CurrencyError::UnknownCurrency {
        code: code.to_string(),
        known: table.known_codes_hint(),
    }
}

// Crypto rates are quoted as "1 crypto = X base", fiat rates as "1 base = X fiat".
fn to_base(table: &RateTable, catalog: &CurrencyCatalog, code: &str, amount: f64) -> Result<f64> {
    if code == table.base {
        return Ok(amount);
    }
    let rate = table.rate(code).ok_or_else(|| unknown(table, code))?;
    Ok(if catalog.is_crypto(code) {
        amount * rate
    } else {
        amount / rate
    })
}

fn from_base(table: &RateTable, catalog: &CurrencyCatalog, code: &str, value: f64) -> Result<f64> {
    if code == table.base {
        return Ok(value);
    }
    let rate = table.rate(code).ok_or_else(|| unknown(table, code))?;
    Ok(if catalog.is_crypto(code) {
        value / rate
    } else {
        value * rate
    })
}
