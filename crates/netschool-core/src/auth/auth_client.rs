use reqwest::{Method, StatusCode};

use super::{
    login::{self, LoginError, PasswordLoginRequest, TransferredSession},
    session_export::{self, ExportedSession},
};
use crate::{
    client::{LoginMethod, SchoolIdentifier},
    ApiError, Client, NotAuthenticatedError,
};

/// Subclient containing the portal-side login procedures and session lifecycle.
#[derive(Clone)]
pub struct AuthClient {
    pub(crate) client: Client,
}

impl AuthClient {
    /// Constructs a new `AuthClient` with the given `Client`.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Login with the portal user name and password.
    ///
    /// The credentials are retained so an expired session can be renewed transparently.
    pub async fn login_password(&self, input: &PasswordLoginRequest) -> Result<(), LoginError> {
        login::password::login_password(&self.client, input).await
    }

    /// Login with an access token taken from a browser.
    pub async fn login_with_token(
        &self,
        token: &str,
        school: Option<SchoolIdentifier>,
    ) -> Result<(), LoginError> {
        login::token::login_with_token(&self.client, token, school.as_ref(), LoginMethod::Token)
            .await
    }

    /// Login with the `session-store` value from a browser's local storage.
    pub async fn login_with_session_store(
        &self,
        session_store: &str,
        school: Option<SchoolIdentifier>,
    ) -> Result<(), LoginError> {
        let token = login::extract_access_token(session_store)
            .ok_or(LoginError::MissingSessionStoreToken)?;
        login::token::login_with_token(
            &self.client,
            &token,
            school.as_ref(),
            LoginMethod::SessionStore,
        )
        .await
    }

    /// Login with browser cookies, either a bare `NSSESSIONID` value or a full Cookie header.
    pub async fn login_with_cookies(
        &self,
        cookies: &str,
        school: Option<SchoolIdentifier>,
    ) -> Result<(), LoginError> {
        login::cookies::login_with_cookies(&self.client, cookies, school.as_ref()).await
    }

    /// Installs a portal token obtained by another HTTP identity and initializes the session.
    pub async fn login_with_transferred_session(
        &self,
        transferred: TransferredSession,
    ) -> Result<(), LoginError> {
        login::transferred::complete_transferred_login(&self.client, transferred).await
    }

    /// Snapshot of the current session.
    pub async fn export_session(&self) -> Result<ExportedSession, NotAuthenticatedError> {
        session_export::export_session(&self.client).await
    }

    /// Restores a snapshot produced by [AuthClient::export_session], given as JSON.
    ///
    /// Fails with [LoginError::SessionExpired] if the portal no longer accepts it.
    pub async fn import_session(&self, data: &str) -> Result<(), LoginError> {
        session_export::import_session(&self.client, data).await
    }

    /// Changes the keep-alive interval in seconds, zero disables it.
    pub fn set_keepalive_interval(&self, seconds: u64) {
        self.client.internal.set_keepalive_interval(seconds);
    }

    /// Ends the portal session. A 401 from the portal counts as already logged out.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let internal = &self.client.internal;
        internal.stop_keepalive();

        let http = internal.http();
        let result = match http.send(http.request(Method::POST, "auth/logout")?).await {
            Ok(_) => Ok(()),
            Err(e) if e.status() == Some(StatusCode::UNAUTHORIZED) => Ok(()),
            Err(e) => Err(e),
        };
        internal.clear_session();
        tracing::info!("Logged out");
        result
    }

    /// Logs out if a session exists and stops background work.
    pub async fn close(&self) -> Result<(), ApiError> {
        if self.client.internal.session().access_token.is_some() {
            self.logout().await
        } else {
            self.client.internal.stop_keepalive();
            Ok(())
        }
    }
}

impl Client {
    /// Portal authentication.
    pub fn auth(&self) -> AuthClient {
        AuthClient::new(self.clone())
    }
}
