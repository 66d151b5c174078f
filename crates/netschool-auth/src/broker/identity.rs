use std::sync::Arc;

use netschool_core::{
    http::{Cookie, CookieError, CookieJarMiddleware, CookieStore, InMemoryCookieStore},
    ApiError,
};
use reqwest::{header, Method, Response};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware, RequestBuilder};
use serde_json::Value;
use url::Url;

use super::{tls::broker_tls_config, BrokerSettings};

/// Name of the broker's session cookie, echoed in QR generation requests.
pub(crate) const BROKER_SESSION_COOKIE: &str = "ESIA_SESSION";

/// The HTTP identity used while talking to the broker.
///
/// It has a cookie jar of its own, separate from the portal session. Nothing reaches the portal
/// jar except through the session transfer at the end of a successful login.
pub struct BrokerIdentity {
    client: ClientWithMiddleware,
    cookies: Arc<InMemoryCookieStore>,
    base: Url,
}

impl std::fmt::Debug for BrokerIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrokerIdentity")
            .field("base", &self.base.as_str())
            .finish_non_exhaustive()
    }
}

impl BrokerIdentity {
    /// Creates an identity with an empty jar.
    pub fn new(settings: &BrokerSettings) -> Result<Self, ApiError> {
        let tls = broker_tls_config(settings.relaxed_tls).map_err(std::io::Error::other)?;
        let inner = reqwest::Client::builder()
            .use_preconfigured_tls(tls)
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(settings.user_agent.clone())
            .timeout(settings.request_timeout())
            .build()?;

        let cookies = Arc::new(InMemoryCookieStore::new());
        let client = ClientBuilder::new(inner)
            .with(CookieJarMiddleware::new(cookies.clone()))
            .build();

        Ok(Self {
            client,
            cookies,
            base: Url::parse(settings.base_url.trim_end_matches('/'))?,
        })
    }

    /// Origin of the broker.
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// A URL on the broker.
    pub fn url(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base.join(path)?)
    }

    /// A URL of the broker's login API, `path` relative to it. An empty `path` is the login
    /// endpoint itself.
    pub fn login_api(&self, path: &str) -> Result<Url, ApiError> {
        let path = match path {
            "" => "aas/oauth2/api/login".to_string(),
            path => format!("aas/oauth2/api/login/{path}"),
        };
        self.url(&path)
    }

    /// The jar of this identity.
    pub fn cookies(&self) -> &Arc<InMemoryCookieStore> {
        &self.cookies
    }

    /// A plain request, as a browser navigating would send it.
    pub fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client.request(method, url)
    }

    /// A request to the broker's JSON API, with the headers its web front end sends.
    pub fn api_request(&self, method: Method, url: Url) -> RequestBuilder {
        let origin = self.base.as_str().trim_end_matches('/').to_string();
        self.client
            .request(method, url)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::REFERER, format!("{origin}/login/"))
            .header(header::ORIGIN, origin)
    }

    /// Sends a request. Any status is a successful response.
    pub async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        Ok(request.send().await?)
    }

    /// POSTs `body` to the login API and returns the JSON answer, whatever the status.
    pub async fn api_post(&self, path: &str, body: &Value) -> Result<(u16, Value), ApiError> {
        let response = self
            .send(self.api_request(Method::POST, self.login_api(path)?).json(body))
            .await?;
        read_json(response).await
    }

    /// GETs a login API endpoint and returns its JSON answer.
    pub async fn api_get(&self, path: &str) -> Result<Value, ApiError> {
        let response = self
            .send(self.api_request(Method::GET, self.login_api(path)?))
            .await?;
        Ok(read_json(response).await?.1)
    }

    /// The value of a cookie in this identity's jar.
    pub async fn cookie_value(&self, name: &str) -> Result<Option<String>, CookieError> {
        Ok(self.cookies.get_cookie(name).await?.map(|c| c.value))
    }

    /// The `Cookie` header a browser would send to `url`'s host.
    pub async fn cookie_header_for(&self, url: &Url) -> Result<String, CookieError> {
        let host = url.host_str().unwrap_or_default();
        Ok(self
            .cookies
            .cookies_for_host(host)
            .await?
            .iter()
            .map(Cookie::to_cookie_header)
            .collect::<Vec<_>>()
            .join("; "))
    }

    /// Forgets every cookie, as if a fresh browser was started.
    pub async fn clear_cookies(&self) -> Result<(), CookieError> {
        self.cookies.clear().await
    }
}

/// Status and JSON body of a response. An empty or non-JSON body reads as `null`.
pub(crate) async fn read_json(response: Response) -> Result<(u16, Value), ApiError> {
    let status = response.status().as_u16();
    let text = response.text().await?;
    let value = serde_json::from_str(&text).unwrap_or(Value::Null);
    Ok((status, value))
}
