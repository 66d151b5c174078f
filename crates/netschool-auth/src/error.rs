use netschool_core::{auth::LoginError, http::CookieError, ApiError};
use thiserror::Error;

use crate::{
    broker::{
        BrokerProtocolError, BrokerRejection, EventStreamError, MultiFactorError,
        OrganizationError,
    },
    prompt::PromptError,
};

/// A federated login failed.
///
/// Match on the variant to tell the kinds apart, or treat them all as a failed login.
#[derive(Debug, Error)]
pub enum BrokerLoginError {
    /// The broker or the portal refused the login.
    #[error(transparent)]
    Rejected(#[from] BrokerRejection),
    /// No organization could be selected.
    #[error(transparent)]
    Organization(#[from] OrganizationError),
    /// The second factor failed.
    #[error(transparent)]
    MultiFactor(#[from] MultiFactorError),
    /// The broker did something the flow does not handle.
    #[error(transparent)]
    Protocol(#[from] BrokerProtocolError),
    /// Waiting for the QR scan failed.
    #[error(transparent)]
    EventStream(#[from] EventStreamError),
    /// Every QR code expired before it was used.
    #[error("QR login failed after {attempts} attempts. The QR code may have expired, not be linked to a school, or have been scanned incorrectly: {source}")]
    QrRetriesExhausted {
        /// QR codes generated
        attempts: u32,
        /// The last failure
        #[source]
        source: EventStreamError,
    },
    /// A collaborator failed outside the second factor.
    #[error(transparent)]
    Prompt(#[from] PromptError),
    /// The portal-side session setup failed.
    #[error(transparent)]
    Portal(#[from] LoginError),
    #[allow(missing_docs)]
    #[error(transparent)]
    Api(#[from] ApiError),
    #[allow(missing_docs)]
    #[error(transparent)]
    Cookie(#[from] CookieError),
}

impl From<reqwest::Error> for BrokerLoginError {
    fn from(e: reqwest::Error) -> Self {
        Self::Api(e.into())
    }
}

impl From<reqwest_middleware::Error> for BrokerLoginError {
    fn from(e: reqwest_middleware::Error) -> Self {
        Self::Api(e.into())
    }
}

impl From<url::ParseError> for BrokerLoginError {
    fn from(e: url::ParseError) -> Self {
        Self::Api(e.into())
    }
}
