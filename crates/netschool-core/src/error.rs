//! Errors that can occur when using this SDK

use std::fmt::Debug;

use reqwest::StatusCode;
use thiserror::Error;

/// Errors from performing network requests.
#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
    #[error(transparent)]
    ReqwestMiddleware(#[from] reqwest_middleware::Error),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    InvalidUrl(#[from] url::ParseError),

    #[error("Received error message from server: [{}] {}", .status, .message)]
    ResponseContent { status: StatusCode, message: String },

    /// The wall-clock budget of a call ran out while retrying.
    #[error("The server did not respond in time")]
    ServerUnavailable,
}

impl ApiError {
    /// Returns the HTTP status if the server answered with an error status.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::ResponseContent { status, .. } => Some(*status),
            ApiError::Reqwest(e) => e.status(),
            _ => None,
        }
    }
}

/// Client is not authenticated.
#[derive(Debug, Error)]
#[error("The client is not authenticated")]
pub struct NotAuthenticatedError;

/// A previously established session is no longer accepted by the portal.
#[derive(Debug, Error)]
#[error("The session has expired or is invalid: {0}")]
pub struct SessionExpiredError(pub String);

/// Missing required field.
#[derive(Debug, Error)]
#[error("The response received was missing a required field: {0}")]
pub struct MissingFieldError(pub &'static str);

/// This macro is used to require that a value is present or return an error otherwise.
/// It is equivalent to using `val.ok_or(Error::MissingFields)?`, but easier to use and
/// with a more descriptive error message.
/// Note that this macro will return early from the function if the value is not present.
#[macro_export]
macro_rules! require {
    ($val:expr) => {
        match $val {
            Some(val) => val,
            None => return Err($crate::MissingFieldError(stringify!($val)).into()),
        }
    };
}

/// Shortens `text` to at most `max` characters, marking the cut with an ellipsis.
pub fn truncate_for_display(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_owned();
    }
    let mut out: String = text.chars().take(max).collect();
    out.push('…');
    out
}
