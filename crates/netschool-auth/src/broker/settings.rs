use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Desktop browser user agent; the broker serves its API to browsers only.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Settings of the identity broker connection.
///
/// Durations are given in seconds.
///
/// ```
/// # use netschool_auth::BrokerSettings;
/// let settings = BrokerSettings {
///     qr_timeout: 180,
///     ..Default::default()
/// };
/// assert_eq!(settings.max_qr_attempts, 5);
/// ```
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default, rename_all = "camelCase")]
pub struct BrokerSettings {
    /// Origin of the broker, without a trailing slash
    pub base_url: String,
    /// User agent of the broker HTTP identity
    pub user_agent: String,
    /// Timeout of a single broker request
    pub request_timeout: u64,
    /// How long to wait for the QR code to be scanned
    pub qr_timeout: u64,
    /// QR codes generated before giving up on expired QR sessions
    pub max_qr_attempts: u32,
    /// Base delay between QR attempts, multiplied by the attempt number
    pub qr_retry_backoff: u64,
    /// Interval of push confirmation polls
    pub push_poll_interval: u64,
    /// How long to wait for a push confirmation
    pub push_max_wait: u64,
    /// Redirect hops allowed from the portal to the broker login page
    pub max_crosslogin_redirects: usize,
    /// Redirect hops allowed from the broker back to the portal
    pub max_callback_redirects: usize,
    /// Broker steps handled after the first response before giving up
    pub max_post_steps: usize,
    /// Prefix of the deep link encoded in the QR code
    pub deep_link_prefix: String,
    /// Skip certificate and hostname verification and stay on TLS 1.2
    pub relaxed_tls: bool,
}

impl Default for BrokerSettings {
    fn default() -> Self {
        Self {
            base_url: "https://esia.gosuslugi.ru".to_string(),
            user_agent: BROWSER_USER_AGENT.to_string(),
            request_timeout: 30,
            qr_timeout: 120,
            max_qr_attempts: 5,
            qr_retry_backoff: 2,
            push_poll_interval: 3,
            push_max_wait: 120,
            max_crosslogin_redirects: 20,
            max_callback_redirects: 15,
            max_post_steps: 10,
            deep_link_prefix: "gosuslugi://auth/signed_token=".to_string(),
            relaxed_tls: true,
        }
    }
}

impl BrokerSettings {
    pub(crate) fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub(crate) fn qr_timeout(&self) -> Duration {
        Duration::from_secs(self.qr_timeout)
    }

    /// Delay before QR attempt `attempt + 1`.
    pub(crate) fn qr_retry_delay(&self, attempt: u32) -> Duration {
        Duration::from_secs(self.qr_retry_backoff * u64::from(attempt))
    }

    pub(crate) fn push_poll_interval(&self) -> Duration {
        Duration::from_secs(self.push_poll_interval)
    }

    pub(crate) fn push_max_wait(&self) -> Duration {
        Duration::from_secs(self.push_max_wait)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_settings_fill_defaults() {
        let settings: BrokerSettings =
            serde_json::from_str(r#"{"qrTimeout": 60, "relaxedTls": false}"#).unwrap();
        assert_eq!(settings.qr_timeout(), Duration::from_secs(60));
        assert!(!settings.relaxed_tls);
        assert_eq!(settings.base_url, "https://esia.gosuslugi.ru");
        assert_eq!(settings.max_post_steps, 10);
    }

    #[test]
    fn test_qr_retry_delay_grows_with_attempts() {
        let settings = BrokerSettings::default();
        assert_eq!(settings.qr_retry_delay(1), Duration::from_secs(2));
        assert_eq!(settings.qr_retry_delay(3), Duration::from_secs(6));
    }
}
