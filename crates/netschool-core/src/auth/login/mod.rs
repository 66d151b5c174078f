use std::future::Future;

use thiserror::Error;

use crate::{
    http::{CookieError, HttpSession},
    ApiError, MissingFieldError, SessionExpiredError,
};

pub(crate) mod cookies;
pub(crate) mod password;
pub(crate) mod school;
pub(crate) mod session_store;
pub(crate) mod token;
pub(crate) mod transferred;

pub use cookies::{parse_cookie_string, SESSION_COOKIE};
pub use password::PasswordLoginRequest;
pub(crate) use school::resolve_school;
pub use session_store::extract_access_token;
pub use transferred::TransferredSession;

/// Portal-side login failures.
#[derive(Debug, Error)]
pub enum LoginError {
    /// The portal rejected the user name or password.
    #[error("Login rejected by the portal: {0}")]
    InvalidCredentials(String),
    /// No school matched the given name.
    #[error("School not found: {0}")]
    SchoolNotFound(String),
    /// The login response carried no access token.
    #[error("The portal did not return an access token")]
    MissingAccessToken,
    /// The cookie string did not contain a session cookie.
    #[error("Could not extract cookies, pass 'NSSESSIONID=...' or a full Cookie header")]
    InvalidCookies,
    /// The session-store value did not contain an access token.
    #[error("No access token found in the session store")]
    MissingSessionStoreToken,
    /// Exported session data could not be read.
    #[error("Invalid session data: {0}")]
    InvalidSessionData(#[source] serde_json::Error),
    /// Exported session data has a format version this library does not know.
    #[error("Unsupported session format version {0}")]
    UnsupportedSessionVersion(u32),
    #[error(transparent)]
    SessionExpired(#[from] SessionExpiredError),
    #[error(transparent)]
    MissingField(#[from] MissingFieldError),
    #[error(transparent)]
    Cookie(#[from] CookieError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Runs a login attempt and puts the portal cookie jar back if it fails.
pub(crate) async fn with_cookie_rollback<T, E>(
    http: &HttpSession,
    attempt: impl Future<Output = Result<T, E>>,
) -> Result<T, E> {
    let snapshot = http.snapshot_cookies().await;
    let result = attempt.await;
    if result.is_err() {
        http.restore_cookies(snapshot).await;
    }
    result
}
