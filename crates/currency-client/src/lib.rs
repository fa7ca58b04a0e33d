pub mod cache;
pub mod catalog;
pub mod conversion;
pub mod format;
pub mod listing;
pub mod source;

pub use cache::RateService;
pub use catalog::CurrencyCatalog;
pub use conversion::{convert, normalize_code, Conversion};
pub use format::{format_amount, format_updated, render_conversion};
pub use listing::{render_listing, CurrencyFilter};
pub use source::{HttpRateSource, RateSource, RATE_FETCH_TIMEOUT};
