use async_trait::async_trait;
use currency_config::UpdateSettings;
use currency_core::{CurrencyError, Result};
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

pub const RELEASE_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseInfo {
    pub version: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct GithubRelease {
    #[serde(default)]
    tag_name: String,
    #[serde(default)]
    html_url: String,
}

impl From<GithubRelease> for ReleaseInfo {
    fn from(release: GithubRelease) -> Self {
        Self {
            version: release.tag_name.trim_start_matches('v').to_string(),
            url: release.html_url,
        }
    }
}

/// Where the latest published release is looked up.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    async fn latest_release(&self) -> Result<ReleaseInfo>;
}

/// GitHub "latest release" endpoint for a single repository.
#[derive(Debug, Clone)]
pub struct GithubReleaseSource {
    url: String,
    client: reqwest::Client,
}

impl GithubReleaseSource {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(RELEASE_CHECK_TIMEOUT)
            .user_agent(concat!("live-currency-rate/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                CurrencyError::UpdateCheck(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }

    pub fn from_settings(settings: &UpdateSettings) -> Result<Self> {
        Self::new(settings.latest_release_url())
    }
}

#[async_trait]
impl ReleaseSource for GithubReleaseSource {
    async fn latest_release(&self) -> Result<ReleaseInfo> {
        debug!("Checking latest release at {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| CurrencyError::UpdateCheck(e.to_string()))?;

        if response.status() != StatusCode::OK {
            return Err(CurrencyError::UpdateCheck(format!(
                "Release endpoint returned {}",
                response.status()
            )));
        }

        let release: GithubRelease = response
            .json()
            .await
            .map_err(|e| CurrencyError::UpdateCheck(format!("Invalid release payload: {}", e)))?;

        Ok(release.into())
    }
}
