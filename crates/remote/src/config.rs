//! Remote API settings.

use std::time::Duration;

/// Base URL of the API.AI v1 REST API.
pub const DEFAULT_BASE_URL: &str = "https://api.api.ai/v1";

/// Protocol version sent as the `v` query parameter.
pub const DEFAULT_PROTOCOL_VERSION: &str = "20150910";

/// Minimum spacing between two consecutive requests.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(1100);

/// Per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for [`crate::RemoteFetcher`], resolved once when the fetcher is built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteConfig {
    pub base_url: String,
    pub protocol_version: String,
    pub min_interval: Duration,
    pub request_timeout: Duration,
}

impl RemoteConfig {
    /// Same settings, pointed at another API root (used for staging and tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_min_interval(mut self, min_interval: Duration) -> Self {
        self.min_interval = min_interval;
        self
    }

    pub(crate) fn intents_url(&self) -> String {
        format!("{}/intents", self.base_url.trim_end_matches('/'))
    }

    pub(crate) fn intent_url(&self, id: &str) -> String {
        format!("{}/{}", self.intents_url(), id)
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            protocol_version: DEFAULT_PROTOCOL_VERSION.into(),
            min_interval: DEFAULT_MIN_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}
