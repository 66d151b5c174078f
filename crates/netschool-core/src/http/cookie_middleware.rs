use std::sync::Arc;

use super::{Cookie, CookieStore};

/// Middleware that keeps a [CookieStore] in sync with the traffic passing through a client.
///
/// Outgoing requests get a `Cookie` header built from the cookies matching the request host.
/// Every `Set-Cookie` header on a response, redirects included, is absorbed into the store.
pub struct CookieJarMiddleware {
    cookie_store: Arc<dyn CookieStore>,
}

impl CookieJarMiddleware {
    /// Creates a new cookie middleware backed by the specified store.
    pub fn new(cookie_store: Arc<dyn CookieStore>) -> Self {
        Self { cookie_store }
    }

    async fn inject(&self, req: &mut reqwest::Request) {
        let Some(host) = req.url().host_str().map(str::to_owned) else {
            return;
        };

        let cookies = match self.cookie_store.cookies_for_host(&host).await {
            Ok(cookies) => cookies,
            Err(e) => {
                tracing::warn!("Failed to retrieve cookies from store: {e}");
                return;
            }
        };
        if cookies.is_empty() {
            return;
        }

        let mut pairs: Vec<String> = cookies.iter().map(Cookie::to_cookie_header).collect();
        if let Some(existing) = req
            .headers()
            .get(http::header::COOKIE)
            .and_then(|v| v.to_str().ok())
        {
            pairs.insert(0, existing.to_owned());
        }

        match pairs.join("; ").parse() {
            Ok(header_value) => {
                req.headers_mut().insert(http::header::COOKIE, header_value);
            }
            Err(e) => tracing::warn!("Failed to build cookie header: {e}"),
        }
    }

    async fn absorb(&self, response: &reqwest::Response) {
        for value in response.headers().get_all(http::header::SET_COOKIE) {
            let Ok(raw) = value.to_str() else {
                continue;
            };
            let stored = match Cookie::parse_set_cookie(raw) {
                Ok(cookie) => self.cookie_store.set_cookie(cookie).await,
                Err(e) => Err(e),
            };
            if let Err(e) = stored {
                tracing::debug!(url = %response.url(), "Ignoring Set-Cookie header: {e}");
            }
        }
    }
}

#[async_trait::async_trait]
impl reqwest_middleware::Middleware for CookieJarMiddleware {
    async fn handle(
        &self,
        mut req: reqwest::Request,
        extensions: &mut http::Extensions,
        next: reqwest_middleware::Next<'_>,
    ) -> Result<reqwest::Response, reqwest_middleware::Error> {
        self.inject(&mut req).await;
        let response = next.run(req, extensions).await?;
        self.absorb(&response).await;
        Ok(response)
    }
}
