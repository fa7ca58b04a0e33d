use currency_core::{parse_timestamp, Result};
use thousands::Separable;

use crate::catalog::CurrencyCatalog;
use crate::conversion::Conversion;

/// Render `amount` with the precision that suits `code`.
///
/// Crypto gets 8 decimals, fiat gets 2 from 100 up, 4 from 1 up and 6
/// below that. Crypto and sub-unit fiat drop trailing zeros.
pub fn format_amount(amount: f64, code: &str, catalog: &CurrencyCatalog) -> String {
    let rendered = if catalog.is_crypto(code) {
        trim_zeros(&format!("{:.8}", amount)).to_string()
    } else if amount >= 100.0 {
        format!("{:.2}", amount)
    } else if amount >= 1.0 {
        format!("{:.4}", amount)
    } else {
        trim_zeros(&format!("{:.6}", amount)).to_string()
    };

    rendered.separate_with_commas()
}

fn trim_zeros(rendered: &str) -> &str {
    if rendered.contains('.') {
        rendered.trim_end_matches('0').trim_end_matches('.')
    } else {
        rendered
    }
}

/// Render a rate table's `updated` stamp for display.
pub fn format_updated(updated: &str) -> Result<String> {
    let timestamp = parse_timestamp(updated)?;
    Ok(timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string())
}

pub fn render_conversion(
    conversion: &Conversion,
    updated: &str,
    catalog: &CurrencyCatalog,
) -> String {
    let from = conversion.from.as_str();
    let to = conversion.to.as_str();

    let mut response = String::from("💱 **Currency Conversion**\n\n");
    response.push_str(&format!(
        "**{} {}** ({})\n",
        format_amount(conversion.amount, from, catalog),
        from,
        catalog.name(from)
    ));
    response.push_str(&format!(
        "= **{} {}** ({})\n\n",
        format_amount(conversion.result, to, catalog),
        to,
        catalog.name(to)
    ));
    response.push_str(&format!(
        "📊 Rate: 1 {} = {} {}",
        from,
        format_amount(conversion.rate.unwrap_or(0.0), to, catalog),
        to
    ));

    if !updated.is_empty() {
        match format_updated(updated) {
            Ok(time) => response.push_str(&format!("\n🕐 Updated: {}", time)),
            Err(e) => tracing::debug!("Skipping update time: {}", e),
        }
    }

    response
}
