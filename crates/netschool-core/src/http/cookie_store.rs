use super::{Cookie, CookieError};

/// Abstraction for cookie storage backends.
///
/// Cookies are identified by their name together with their domain, so the same name may be
/// stored once per domain. Uses async methods to support I/O-bound implementations.
#[async_trait::async_trait]
pub trait CookieStore: Send + Sync {
    /// Retrieves a non-expired cookie by name, whatever its domain.
    async fn get_cookie(&self, name: &str) -> Result<Option<Cookie>, CookieError>;

    /// Stores a cookie, replacing one with the same name and domain.
    ///
    /// An already expired cookie removes the stored entry instead.
    async fn set_cookie(&self, cookie: Cookie) -> Result<(), CookieError>;

    /// Removes every cookie with this name.
    ///
    /// Returns Ok even if cookie doesn't exist (idempotent operation).
    async fn remove_cookie(&self, name: &str) -> Result<(), CookieError>;

    /// Clears all stored cookies.
    async fn clear(&self) -> Result<(), CookieError>;

    /// Lists all non-expired cookies.
    async fn list_cookies(&self) -> Result<Vec<Cookie>, CookieError>;

    /// Lists the non-expired cookies that should be sent to `host`.
    async fn cookies_for_host(&self, host: &str) -> Result<Vec<Cookie>, CookieError> {
        Ok(self
            .list_cookies()
            .await?
            .into_iter()
            .filter(|c| c.matches_host(host))
            .collect())
    }
}
