use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use currency_client::{CurrencyCatalog, RateService, RateSource};
use currency_config::UpdateSettings;
use currency_core::{
    CurrencyError, EventEmitter, InvocationContext, ManualClock, NotificationEvent, RateTable,
    Result, UserInfo, UserRole,
};
use currency_tools::CurrencyToolkit;
use currency_update::{ReleaseInfo, ReleaseSource, UpdateNotifier, UpdateStateStore};
use serde_json::json;
use tempfile::TempDir;

#[derive(Default)]
struct FakeRates {
    calls: AtomicUsize,
    offline: AtomicBool,
}

#[async_trait]
impl RateSource for FakeRates {
    async fn fetch(&self) -> Result<RateTable> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(CurrencyError::Fetch("connection refused".into()));
        }
        Ok(RateTable::new("USD")
            .with_rate("EUR", 0.92)
            .with_rate("GBP", 0.8)
            .with_rate("BTC", 65000.0)
            .with_rate("ETH", 3200.0)
            .with_rate("SOL", 160.0)
            .with_updated("2024-05-01T12:00:00Z"))
    }
}

struct FakeRelease {
    version: &'static str,
    calls: AtomicUsize,
}

#[async_trait]
impl ReleaseSource for FakeRelease {
    async fn latest_release(&self) -> Result<ReleaseInfo> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ReleaseInfo {
            version: self.version.to_string(),
            url: String::new(),
        })
    }
}

#[derive(Default)]
struct RecordingEmitter {
    events: Mutex<Vec<NotificationEvent>>,
}

#[async_trait]
impl EventEmitter for RecordingEmitter {
    async fn emit(&self, event: NotificationEvent) -> Result<()> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

struct Harness {
    _dir: TempDir,
    rates: Arc<FakeRates>,
    release: Arc<FakeRelease>,
    clock: Arc<ManualClock>,
    toolkit: CurrencyToolkit,
}

fn harness(latest_release: &'static str) -> Harness {
    let dir = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
    ));
    let rates = Arc::new(FakeRates::default());
    let release = Arc::new(FakeRelease {
        version: latest_release,
        calls: AtomicUsize::new(0),
    });

    let service = Arc::new(RateService::new(
        rates.clone(),
        clock.clone(),
        Duration::from_secs(180),
    ));
    let notifier = UpdateNotifier::new(
        UpdateSettings::default(),
        "0.1.0",
        release.clone(),
        UpdateStateStore::new(dir.path().join("state.json")),
        clock.clone(),
    );
    let toolkit =
        CurrencyToolkit::new(service, Arc::new(CurrencyCatalog::default()), notifier).unwrap();

    Harness {
        _dir: dir,
        rates,
        release,
        clock,
        toolkit,
    }
}

#[tokio::test]
async fn converts_through_registry() {
    let h = harness("0.1.0");
    let ctx = InvocationContext::new();

    let text = h
        .toolkit
        .invoke(
            "convert_currency",
            json!({"from_currency": "btc", "to_currency": "eur", "amount": 2}),
            &ctx,
        )
        .await;

    assert!(text.starts_with("💱 **Currency Conversion**"), "{text}");
    assert!(text.contains("**2 BTC** (Bitcoin (BTC))"));
    assert!(text.contains("= **119,600.00 EUR** (Euro (€))"));
    assert!(text.contains("📊 Rate: 1 BTC = 59,800.00 EUR"));
    assert!(text.ends_with("🕐 Updated: 2024-05-01 12:00:00 UTC"));
}

#[tokio::test]
async fn registry_and_helpers_share_tools() {
    let h = harness("0.1.0");
    let ctx = InvocationContext::new();

    let registry = h.toolkit.registry();
    assert_eq!(
        registry.list(),
        vec!["convert_currency", "get_crypto_price", "list_currencies"]
    );
    for tool in registry.get_all() {
        assert_eq!(tool.schema()["type"], "object");
        assert!(!tool.description().is_empty());
    }

    let via_registry = h
        .toolkit
        .invoke("get_crypto_price", json!({"crypto": "ETH", "currency": "EUR"}), &ctx)
        .await;
    let via_helper = h.toolkit.get_crypto_price("ETH", "EUR", &ctx).await;
    assert_eq!(via_registry, via_helper);
    assert_eq!(h.rates.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn price_defaults_to_bitcoin_in_base() {
    let h = harness("0.1.0");
    let ctx = InvocationContext::new();

    let text = h.toolkit.invoke("get_crypto_price", json!({}), &ctx).await;
    assert!(text.contains("**1 BTC** (Bitcoin (BTC))"));
    assert!(text.contains("= **65,000.00 USD**"));

    let typed = h.toolkit.get_crypto_price("SOL", "ETH", &ctx).await;
    assert!(typed.contains("= **0.05 ETH**"), "{typed}");
}

#[tokio::test]
async fn repeated_calls_share_cached_rates() {
    let h = harness("0.1.0");
    let ctx = InvocationContext::new();

    h.toolkit.convert_currency("USD", Some("EUR"), Some(10.0), &ctx).await;
    h.toolkit.list_currencies(None, &ctx).await;
    assert_eq!(h.rates.calls.load(Ordering::SeqCst), 1);

    h.clock.advance(chrono::Duration::seconds(181));
    h.toolkit.list_currencies(Some("fiat"), &ctx).await;
    assert_eq!(h.rates.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn errors_become_text() {
    let h = harness("0.1.0");
    let ctx = InvocationContext::new();

    let unknown = h.toolkit.convert_currency("ZZZ", Some("USD"), None, &ctx).await;
    assert_eq!(
        unknown,
        "❌ Currency 'ZZZ' not found. Available currencies include: BTC, ETH, EUR, GBP, SOL..."
    );

    let filter = h.toolkit.list_currencies(Some("stocks"), &ctx).await;
    assert!(filter.starts_with("❌ Invalid filter type"));

    let missing = h.toolkit.invoke("weather", json!({}), &ctx).await;
    assert_eq!(missing, "❌ Error: Tool execution failed for 'weather': Unknown tool");

    let bad_args = h.toolkit.invoke("convert_currency", json!({"amount": "lots"}), &ctx).await;
    assert!(bad_args
        .starts_with("❌ Error: Tool execution failed for 'convert_currency': Invalid arguments"));
}

#[tokio::test]
async fn fetch_failure_without_cache_is_reported() {
    let h = harness("0.1.0");
    h.rates.offline.store(true, Ordering::SeqCst);

    let text = h.toolkit.list_currencies(None, &InvocationContext::new()).await;
    assert_eq!(text, "❌ Error: Failed to fetch currency rates: connection refused");
}

#[tokio::test]
async fn stale_rates_survive_outage() {
    let h = harness("0.1.0");
    let ctx = InvocationContext::new();

    let before = h.toolkit.convert_currency("EUR", Some("GBP"), Some(50.0), &ctx).await;
    h.rates.offline.store(true, Ordering::SeqCst);
    h.clock.advance(chrono::Duration::hours(1));
    let after = h.toolkit.convert_currency("EUR", Some("GBP"), Some(50.0), &ctx).await;

    assert_eq!(before, after);
    assert_eq!(h.rates.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn admin_sees_update_once() {
    let h = harness("0.2.0");
    let emitter = Arc::new(RecordingEmitter::default());
    let ctx = InvocationContext::new()
        .with_user(UserInfo::admin())
        .with_emitter(emitter.clone());

    h.toolkit.list_currencies(None, &ctx).await;
    h.toolkit.list_currencies(None, &ctx).await;

    let events = emitter.events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert!(events[0].content().contains("Version 0.2.0 is now available."));
    assert_eq!(h.release.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn regular_user_never_triggers_release_check() {
    let h = harness("0.2.0");
    let emitter = Arc::new(RecordingEmitter::default());
    let ctx = InvocationContext::new()
        .with_user(UserInfo::new(UserRole::User))
        .with_emitter(emitter.clone());

    h.toolkit.list_currencies(None, &ctx).await;

    assert_eq!(h.release.calls.load(Ordering::SeqCst), 0);
    assert!(emitter.events.lock().unwrap().is_empty());
}
