//! Typed accessors for the portal's data: diary, assignments, announcements, attachments,
//! school card and internal mail.
//!
//! Authenticated calls renew the session once on a 401 when the login kept credentials;
//! otherwise the 401 surfaces as [PortalError::SessionExpired].

use reqwest::{Response, StatusCode};
use reqwest_middleware::RequestBuilder;
use thiserror::Error;

use crate::{
    auth::{LoginError, PasswordLoginRequest},
    client::{LoginMethod, Session},
    http::HttpSession,
    ApiError, Client, NotAuthenticatedError, SessionExpiredError,
};

mod diary;
mod discovery;
mod files;
mod mail;
mod school;

pub use discovery::{get_login_methods, search_schools};

/// Errors returned by the data accessors.
#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum PortalError {
    #[error(transparent)]
    NotAuthenticated(#[from] NotAuthenticatedError),
    #[error(transparent)]
    SessionExpired(#[from] SessionExpiredError),
    #[error("Logging in again after the session expired failed: {0}")]
    Relogin(#[from] LoginError),
    #[error("Could not determine the portal URL for region {0:?}, pass the URL explicitly")]
    UnknownRegion(String),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Subclient with the portal data accessors.
#[derive(Clone)]
pub struct PortalClient {
    pub(crate) client: Client,
}

impl PortalClient {
    /// Constructs a new `PortalClient` with the given `Client`.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn http(&self) -> &HttpSession {
        self.client.internal.http()
    }

    /// Sends an authenticated request built from the current session.
    async fn authed<F>(&self, build: F) -> Result<Response, PortalError>
    where
        F: Fn(&HttpSession, &Session) -> Result<RequestBuilder, ApiError>,
    {
        let session = self.client.internal.authenticated_session()?;
        let http = self.http();

        match http.send(build(http, &session)?).await {
            Err(e) if e.status() == Some(StatusCode::UNAUTHORIZED) => {
                self.relogin().await?;
                let session = self.client.internal.authenticated_session()?;
                Ok(http.send(build(http, &session)?).await?)
            }
            other => Ok(other?),
        }
    }

    async fn relogin(&self) -> Result<(), PortalError> {
        let method = self.client.internal.get_login_method();
        let Some(LoginMethod::Credentials {
            user_name,
            password,
            school,
        }) = method.as_deref()
        else {
            return Err(SessionExpiredError("log in again".to_string()).into());
        };

        tracing::info!("Session expired, logging in again with retained credentials");
        let request = PasswordLoginRequest {
            user_name: user_name.clone(),
            password: password.clone(),
            school: school.clone(),
        };
        crate::auth::login::password::login_password(&self.client, &request).await?;
        Ok(())
    }
}

impl Client {
    /// Portal data accessors.
    pub fn portal(&self) -> PortalClient {
        PortalClient::new(self.clone())
    }
}
