use chrono::Duration;
use currency_config::{PluginConfig, UpdateSettings};
use currency_core::{Clock, EventEmitter, NotificationEvent, Result, SystemClock, UserInfo};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

use crate::release::{GithubReleaseSource, ReleaseSource};
use crate::state::{UpdateState, UpdateStateStore};
use crate::version::is_newer;

pub const EXTENSION_TITLE: &str = "Live Currency Rate";

/// Minimum time between two release checks.
pub fn check_interval() -> Duration {
    Duration::hours(24)
}

/// Polls for new releases on behalf of admins and tells them once per
/// version.
pub struct UpdateNotifier {
    enabled: bool,
    current_version: String,
    settings: UpdateSettings,
    source: Arc<dyn ReleaseSource>,
    store: UpdateStateStore,
    clock: Arc<dyn Clock>,
    state: Mutex<UpdateState>,
}

impl UpdateNotifier {
    pub fn new(
        settings: UpdateSettings,
        current_version: impl Into<String>,
        source: Arc<dyn ReleaseSource>,
        store: UpdateStateStore,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let state = store.load_or_default();
        Self {
            enabled: true,
            current_version: current_version.into(),
            settings,
            source,
            store,
            clock,
            state: Mutex::new(state),
        }
    }

    pub fn from_config(config: &PluginConfig, current_version: impl Into<String>) -> Result<Self> {
        let source = GithubReleaseSource::from_settings(&config.update)?;
        let store = UpdateStateStore::new(config.update.state_file_path());

        Ok(Self::new(
            config.update.clone(),
            current_version,
            Arc::new(source),
            store,
            Arc::new(SystemClock),
        )
        .with_enabled(config.enable_update_check))
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn state(&self) -> UpdateState {
        self.lock().clone()
    }

    pub fn should_check(&self, user: Option<&UserInfo>) -> bool {
        if !self.enabled || !user.is_some_and(UserInfo::is_admin) {
            return false;
        }
        let since = self.clock.now().signed_duration_since(self.lock().last_check);
        since >= check_interval()
    }

    /// Ask the release source for the latest version. `last_check` is
    /// moved forward and persisted whether or not the lookup succeeds.
    pub async fn check_release(&self) -> Result<()> {
        let outcome = self.source.latest_release().await;

        let snapshot = {
            let mut state = self.lock();
            if let Ok(release) = &outcome {
                if state.latest_version.as_deref() != Some(release.version.as_str()) {
                    info!("New release recorded: {}", release.version);
                    state.has_shown_notification = false;
                }
                state.latest_version = Some(release.version.clone());
                state.latest_url = Some(release.url.clone());
            }
            state.last_check = self.clock.now();
            state.clone()
        };

        let saved = self.store.save(&snapshot);
        outcome.and(saved)
    }

    /// The update message, if the recorded release is newer than this build.
    pub fn pending_notification(&self) -> Option<String> {
        let state = self.lock();
        let latest = state.latest_version.as_deref().filter(|v| !v.is_empty())?;

        match is_newer(latest, &self.current_version) {
            Some(true) => Some(self.message(latest, state.latest_url.as_deref())),
            _ => None,
        }
    }

    /// Emit the pending message once. Returns whether anything was sent.
    pub async fn notify(&self, emitter: Option<&dyn EventEmitter>) -> Result<bool> {
        if self.lock().has_shown_notification {
            return Ok(false);
        }
        let Some(emitter) = emitter else {
            return Ok(false);
        };
        let Some(message) = self.pending_notification() else {
            return Ok(false);
        };

        emitter.emit(NotificationEvent::message(message)).await?;

        let snapshot = {
            let mut state = self.lock();
            state.has_shown_notification = true;
            state.clone()
        };
        self.store.save(&snapshot)?;
        Ok(true)
    }

    /// Check (when due) and notify. Failures are logged and dropped.
    pub async fn run(&self, user: Option<&UserInfo>, emitter: Option<&dyn EventEmitter>) {
        if !self.enabled {
            return;
        }

        if self.should_check(user) {
            if let Err(e) = self.check_release().await {
                debug!("Update check failed: {}", e);
            }
        }

        if let Err(e) = self.notify(emitter).await {
            debug!("Update notification failed: {}", e);
        }
    }

    fn message(&self, latest: &str, release_url: Option<&str>) -> String {
        let repo_url = self.settings.repo_url();
        let notes_url = release_url
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}/releases", repo_url));

        format!(
            "**🔔 {} Update Available!**\n\
             Version {} is now available.\n\
             Current version: {}\n\
             📦 [GitHub]({}) | 🔘 [OpenWebUI]({}) | 🗒️ [Release Notes]({})\n",
            EXTENSION_TITLE,
            latest,
            self.current_version,
            repo_url,
            self.settings.extension_url,
            notes_url
        )
    }

    fn lock(&self) -> MutexGuard<'_, UpdateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
