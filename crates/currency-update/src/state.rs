use chrono::{DateTime, TimeZone, Utc};
use currency_core::{parse_timestamp, CurrencyError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

/// What the notifier remembers between invocations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateState {
    #[serde(default = "default_last_check", deserialize_with = "deserialize_last_check")]
    pub last_check: DateTime<Utc>,
    #[serde(default)]
    pub latest_version: Option<String>,
    #[serde(default)]
    pub latest_url: Option<String>,
    #[serde(default)]
    pub has_shown_notification: bool,
}

impl Default for UpdateState {
    fn default() -> Self {
        Self {
            last_check: default_last_check(),
            latest_version: None,
            latest_url: None,
            has_shown_notification: false,
        }
    }
}

fn default_last_check() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

// Older state files carry naive timestamps.
fn deserialize_last_check<'de, D>(deserializer: D) -> std::result::Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

/// Single JSON file holding the [`UpdateState`].
///
/// Writes go straight to the target path; a torn write is recovered by
/// falling back to defaults on the next load.
#[derive(Debug, Clone)]
pub struct UpdateStateStore {
    path: PathBuf,
}

impl UpdateStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Result<UpdateState> {
        let json = fs::read_to_string(&self.path)?;
        let state: UpdateState = serde_json::from_str(&json)?;
        Ok(state)
    }

    pub fn load_or_default(&self) -> UpdateState {
        match self.load() {
            Ok(state) => state,
            Err(CurrencyError::IoError(e)) if e.kind() == ErrorKind::NotFound => {
                debug!("No update state at {:?}, starting fresh", self.path);
                UpdateState::default()
            }
            Err(e) => {
                debug!("Discarding unreadable update state {:?}: {}", self.path, e);
                UpdateState::default()
            }
        }
    }

    pub fn save(&self, state: &UpdateState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(state)?;
        fs::write(&self.path, json)?;

        debug!("Saved update state to {:?}", self.path);
        Ok(())
    }
}
