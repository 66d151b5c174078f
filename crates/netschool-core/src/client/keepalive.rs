use std::time::Duration;

use reqwest::Method;
use tokio::task::JoinHandle;

use crate::http::HttpSession;

/// Background task pinging the portal so an idle session is not dropped.
#[derive(Debug)]
pub(crate) struct KeepAlive {
    interval: Duration,
    handle: Option<JoinHandle<()>>,
}

impl KeepAlive {
    pub(crate) fn new(interval: Duration) -> Self {
        Self {
            interval,
            handle: None,
        }
    }

    pub(crate) fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    pub(crate) fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// (Re)starts the task. Without a tokio runtime, or with a zero interval, nothing is started.
    pub(crate) fn start(&mut self, http: HttpSession) {
        self.stop();
        if self.interval.is_zero() {
            return;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::debug!("No tokio runtime, keep-alive not started");
            return;
        };

        let interval = self.interval;
        self.handle = Some(runtime.spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                let ping = match http.request(Method::GET, "context") {
                    Ok(request) => http.send(request).await.map(drop),
                    Err(e) => Err(e),
                };
                if let Err(e) = ping {
                    tracing::debug!("Keep-alive ping failed: {e}");
                }
            }
        }));
    }

    /// Idempotent.
    pub(crate) fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for KeepAlive {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::ClientSettings;

    #[tokio::test]
    async fn test_pings_context_until_stopped() {
        let server = MockServer::start().await;
        Mock::given(matchers::path("/webapi/context"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let http = HttpSession::new(&ClientSettings::for_url(server.uri())).unwrap();
        let mut keepalive = KeepAlive::new(Duration::from_millis(20));
        keepalive.start(http);
        assert!(keepalive.is_running());

        tokio::time::sleep(Duration::from_millis(100)).await;
        keepalive.stop();
        keepalive.stop();
        assert!(!keepalive.is_running());

        let pings = server.received_requests().await.unwrap().len();
        assert!(pings >= 1);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(server.received_requests().await.unwrap().len() <= pings + 1);
    }

    #[test]
    fn test_zero_interval_never_starts() {
        let settings = ClientSettings::default();
        let http = HttpSession::new(&settings).unwrap();
        let mut keepalive = KeepAlive::new(Duration::ZERO);
        keepalive.start(http);
        assert!(!keepalive.is_running());
    }
}
