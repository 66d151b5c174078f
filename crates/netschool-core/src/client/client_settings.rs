use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Basic client behavior settings. These settings specify the targeted portal and the timing
/// behavior of the [Client](crate::Client). They are uneditable once the client is initialized,
/// except for the keep-alive interval.
///
/// Defaults to
///
/// ```
/// # use netschool_core::ClientSettings;
/// let settings = ClientSettings {
///     base_url: "https://sgo.example.ru".to_string(),
///     user_agent: "NetSchoolRs/1.0".to_string(),
///     timeout: Some(5),
///     attempt_timeout: 5,
///     keepalive_interval: 300,
/// };
/// let default = ClientSettings::default();
/// ```
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientSettings {
    /// Base URL of the portal, without the `/webapi` suffix.
    pub base_url: String,
    /// The user agent sent to the portal. Defaults to `NetSchoolRs/1.0`
    pub user_agent: String,
    /// Wall-clock budget in seconds for a single call, retries included. `None` disables it.
    pub timeout: Option<u64>,
    /// Seconds a single attempt may take before it is abandoned and retried.
    pub attempt_timeout: u64,
    /// Seconds between keep-alive pings once logged in. Zero disables the keep-alive.
    pub keepalive_interval: u64,
}

impl ClientSettings {
    /// Settings for the portal at `base_url`, everything else at defaults.
    pub fn for_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub(crate) fn timeout(&self) -> Option<Duration> {
        self.timeout.filter(|t| *t > 0).map(Duration::from_secs)
    }

    pub(crate) fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout.max(1))
    }
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "https://sgo.example.ru".into(),
            user_agent: "NetSchoolRs/1.0".into(),
            timeout: Some(5),
            attempt_timeout: 5,
            keepalive_interval: 300,
        }
    }
}
