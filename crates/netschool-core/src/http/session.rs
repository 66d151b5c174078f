use std::{
    sync::{Arc, RwLock},
    time::Duration,
};

use reqwest::{header, Method, Response};
use reqwest_middleware::{ClientWithMiddleware, RequestBuilder};
use url::Url;

use super::{Cookie, CookieError, CookieJarMiddleware, CookieStore, InMemoryCookieStore};
use crate::{
    client::new_http_client_builder, error::truncate_for_display, ApiError, ClientSettings,
};

const MAX_SERVER_ERROR_RETRIES: u32 = 3;
const TIMEOUT_RETRY_DELAY: Duration = Duration::from_millis(100);
const SERVER_ERROR_BACKOFF: Duration = Duration::from_millis(200);
const ERROR_BODY_LIMIT: usize = 300;

/// Header carrying the portal access token.
pub(crate) const ACCESS_TOKEN_HEADER: &str = "at";

/// The portal's HTTP identity: a client rooted at `{base_url}/webapi/` with its own cookie jar.
///
/// Every call goes through [HttpSession::execute], which retries attempts that time out (without
/// bound) and 5xx responses (up to three times, with linear backoff), all inside an optional
/// wall-clock budget that fails with [ApiError::ServerUnavailable] once exhausted. Redirects are
/// never followed automatically.
///
/// Cloning shares the jar and the access token.
#[derive(Clone)]
pub struct HttpSession {
    origin: Url,
    api_base: Url,
    client: ClientWithMiddleware,
    cookies: Arc<InMemoryCookieStore>,
    access_token: Arc<RwLock<Option<String>>>,
    timeout: Option<Duration>,
    attempt_timeout: Duration,
}

impl std::fmt::Debug for HttpSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSession")
            .field("api_base", &self.api_base.as_str())
            .finish()
    }
}

impl HttpSession {
    /// Creates the portal session described by `settings`.
    pub fn new(settings: &ClientSettings) -> Result<Self, ApiError> {
        let base = settings.base_url.trim_end_matches('/');
        let http_client = new_http_client_builder()
            .default_headers(default_headers(settings))
            .build()?;

        let origin = Url::parse(base)?;
        let api_base = Url::parse(&format!("{base}/webapi/"))?;

        let cookies = Arc::new(InMemoryCookieStore::new());
        let client = reqwest_middleware::ClientBuilder::new(http_client)
            .with(CookieJarMiddleware::new(cookies.clone()))
            .build();

        Ok(Self {
            origin,
            api_base,
            client,
            cookies,
            access_token: Arc::new(RwLock::new(None)),
            timeout: settings.timeout(),
            attempt_timeout: settings.attempt_timeout(),
        })
    }

    /// Portal origin as configured, e.g. `https://sgo.example.ru`.
    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// Resolves `path` against the `/webapi/` root.
    pub fn api_url(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.api_base.join(path.trim_start_matches('/'))?)
    }

    /// The portal cookie jar.
    pub fn cookies(&self) -> &Arc<InMemoryCookieStore> {
        &self.cookies
    }

    /// The access token currently attached to requests.
    pub fn access_token(&self) -> Option<String> {
        self.access_token
            .read()
            .expect("RwLock is not poisoned")
            .clone()
    }

    pub(crate) fn set_access_token(&self, token: Option<String>) {
        *self.access_token.write().expect("RwLock is not poisoned") = token;
    }

    /// Builds a request for an API path carrying the current access token.
    pub fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let token = self.access_token();
        self.request_with_token(method, path, token.as_deref())
    }

    /// Builds a request for an API path carrying an explicit access token.
    ///
    /// Used while a login is in flight, before its token is committed.
    pub fn request_with_token(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
    ) -> Result<RequestBuilder, ApiError> {
        let mut builder = self.client.request(method, self.api_url(path)?);
        if let Some(token) = token {
            builder = builder.header(ACCESS_TOKEN_HEADER, token);
        }
        Ok(builder)
    }

    /// Builds a request for an absolute URL, without the access token.
    pub fn request_url(&self, method: Method, url: Url) -> RequestBuilder {
        self.client.request(method, url)
    }

    /// Sends `request` under the retry policy and returns whatever final response was received.
    ///
    /// `timeout` overrides the configured wall-clock budget for this call.
    pub async fn execute(
        &self,
        request: RequestBuilder,
        timeout: Option<Duration>,
    ) -> Result<Response, ApiError> {
        let attempts = self.retry(request);
        match timeout.or(self.timeout) {
            Some(budget) => tokio::time::timeout(budget, attempts)
                .await
                .map_err(|_| ApiError::ServerUnavailable)?,
            None => attempts.await,
        }
    }

    /// Like [HttpSession::execute], but turns error statuses into [ApiError::ResponseContent].
    pub async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        check_status(self.execute(request, None).await?).await
    }

    async fn retry(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let mut server_errors = 0;
        loop {
            let Some(attempt) = request.try_clone() else {
                return Ok(request.timeout(self.attempt_timeout).send().await?);
            };

            match attempt.timeout(self.attempt_timeout).send().await {
                Err(e) if is_timeout(&e) => {
                    tracing::debug!("Portal request timed out, retrying");
                    tokio::time::sleep(TIMEOUT_RETRY_DELAY).await;
                }
                Err(e) => return Err(e.into()),
                Ok(response)
                    if response.status().is_server_error()
                        && server_errors < MAX_SERVER_ERROR_RETRIES =>
                {
                    server_errors += 1;
                    tracing::debug!(
                        status = %response.status(),
                        retry = server_errors,
                        "Portal returned a server error, retrying"
                    );
                    tokio::time::sleep(SERVER_ERROR_BACKOFF * server_errors).await;
                }
                Ok(response) => return Ok(response),
            }
        }
    }

    /// Stores a plain `name=value` cookie for the portal.
    pub async fn set_cookie(&self, name: &str, value: &str) -> Result<(), CookieError> {
        self.cookies.set_cookie(Cookie::new(name, value)).await
    }

    /// Copies the jar so a failed login can put it back.
    pub(crate) async fn snapshot_cookies(&self) -> Vec<Cookie> {
        self.cookies.list_cookies().await.unwrap_or_default()
    }

    pub(crate) async fn restore_cookies(&self, snapshot: Vec<Cookie>) {
        let restored = async {
            self.cookies.clear().await?;
            for cookie in snapshot {
                self.cookies.set_cookie(cookie).await?;
            }
            Ok::<_, CookieError>(())
        };
        if let Err(e) = restored.await {
            tracing::warn!("Failed to restore portal cookies: {e}");
        }
    }
}

fn is_timeout(err: &reqwest_middleware::Error) -> bool {
    match err {
        reqwest_middleware::Error::Reqwest(e) => e.is_timeout(),
        reqwest_middleware::Error::Middleware(_) => false,
    }
}

/// Passes through successful and redirect responses, anything else becomes
/// [ApiError::ResponseContent] with a shortened body.
pub async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() || status.is_redirection() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::ResponseContent {
        status,
        message: truncate_for_display(&body, ERROR_BODY_LIMIT),
    })
}

/// Default headers of the portal identity.
fn default_headers(settings: &ClientSettings) -> header::HeaderMap {
    let mut headers = header::HeaderMap::new();
    if let Ok(value) = header::HeaderValue::from_str(&settings.user_agent) {
        headers.insert(header::USER_AGENT, value);
    }
    if let Ok(value) = header::HeaderValue::from_str(settings.base_url.trim_end_matches('/')) {
        headers.insert(header::REFERER, value);
    }
    headers
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use wiremock::{matchers, Mock, MockServer, Request, Respond, ResponseTemplate};

    use super::*;

    fn session(server: &MockServer, timeout: Option<u64>) -> HttpSession {
        let settings = ClientSettings {
            base_url: server.uri(),
            timeout,
            attempt_timeout: 1,
            ..Default::default()
        };
        HttpSession::new(&settings).unwrap()
    }

    struct FailTimes {
        failures: usize,
        calls: Arc<AtomicUsize>,
    }

    impl Respond for FailTimes {
        fn respond(&self, _: &Request) -> ResponseTemplate {
            if self.calls.fetch_add(1, Ordering::SeqCst) < self.failures {
                ResponseTemplate::new(502)
            } else {
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true}))
            }
        }
    }

    #[tokio::test]
    async fn test_request_rooted_at_webapi_with_token() {
        let server = MockServer::start().await;
        Mock::given(matchers::method("GET"))
            .and(matchers::path("/webapi/years/current"))
            .and(matchers::header("at", "token-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": 7})))
            .expect(1)
            .mount(&server)
            .await;

        let http = session(&server, Some(5));
        http.set_access_token(Some("token-1".to_string()));

        let response = http
            .send(http.request(Method::GET, "years/current").unwrap())
            .await
            .unwrap();
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["id"], 7);
    }

    #[tokio::test]
    async fn test_retries_server_errors_then_succeeds() {
        let server = MockServer::start().await;
        let calls = Arc::new(AtomicUsize::new(0));
        Mock::given(matchers::path("/webapi/context"))
            .respond_with(FailTimes {
                failures: 2,
                calls: calls.clone(),
            })
            .mount(&server)
            .await;

        let http = session(&server, Some(5));
        let response = http
            .send(http.request(Method::GET, "context").unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_three_server_error_retries() {
        let server = MockServer::start().await;
        Mock::given(matchers::path("/webapi/context"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .expect(4)
            .mount(&server)
            .await;

        let http = session(&server, Some(5));
        let err = http
            .send(http.request(Method::GET, "context").unwrap())
            .await
            .unwrap_err();

        match err {
            ApiError::ResponseContent { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "maintenance");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_budget_exhaustion_is_server_unavailable() {
        let server = MockServer::start().await;
        Mock::given(matchers::path("/webapi/context"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let http = session(&server, Some(2));
        let err = http
            .send(http.request(Method::GET, "context").unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::ServerUnavailable));
    }

    #[tokio::test]
    async fn test_redirect_is_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(matchers::path("/webapi/users/photo"))
            .respond_with(ResponseTemplate::new(302).insert_header("location", "/photo.png"))
            .mount(&server)
            .await;

        let http = session(&server, Some(5));
        let response = http
            .send(http.request(Method::GET, "users/photo").unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), 302);
    }

    #[tokio::test]
    async fn test_snapshot_and_restore_cookies() {
        let server = MockServer::start().await;
        let http = session(&server, Some(5));
        http.set_cookie("NSSESSIONID", "old").await.unwrap();

        let snapshot = http.snapshot_cookies().await;
        http.set_cookie("NSSESSIONID", "new").await.unwrap();
        http.set_cookie("extra", "1").await.unwrap();
        http.restore_cookies(snapshot).await;

        let cookies = http.cookies().list_cookies().await.unwrap();
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0].value, "old");
    }
}
