//! Listener for the broker's server-sent event stream.
//!
//! The broker does not send response headers until the first event, which stalls HTTP clients
//! that wait for them. The listener therefore speaks HTTP/1.1 over a raw TLS socket and scans
//! the byte stream for `data:` lines itself.

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use url::Url;

mod line_buffer;
mod listener;

pub use listener::{listen, TlsEventSubscriber};

/// Error codes meaning the QR session on the broker side is gone. A new QR code has to be
/// generated, the current one cannot be retried.
pub const QR_SESSION_EXPIRED_CODES: [&str; 4] = [
    "QR_AUTHORIZATION_SESSION_EXPIRED",
    "QR_CODE_SESSION_NOT_FOUND",
    "QR_CODE_SESSION_OUTDATED",
    "ESIA-007110",
];

/// Failures while waiting for an event.
#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum EventStreamError {
    /// The QR session expired; retried with a fresh QR code.
    #[error("QR session expired: {0}")]
    QrSessionExpired(String),
    #[error("Broker error during QR login: {code} {message}")]
    Broker { code: String, message: String },
    #[error("The broker closed the event stream")]
    Closed,
    #[error("Event stream line longer than {0} bytes")]
    LineTooLong(usize),
    #[error("No event within {0:?}")]
    Timeout(Duration),
    #[error("Invalid event stream URL: {0}")]
    InvalidUrl(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl EventStreamError {
    /// Whether a new attempt with a fresh QR code may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::QrSessionExpired(_))
    }
}

/// Opens the event stream at `url` and returns the first event with a usable payload.
#[async_trait::async_trait]
pub trait EventSubscriber: Send + Sync {
    /// `cookies` is the value of the `Cookie` header, `timeout` bounds the whole wait.
    async fn subscribe(
        &self,
        url: &Url,
        cookies: &str,
        timeout: Duration,
    ) -> Result<Value, EventStreamError>;
}

/// Interprets one line of the stream.
///
/// Returns `None` for lines that are not `data:` lines with a JSON object, such as the HTTP
/// status line, headers, keep-alive comments or chunk sizes.
pub(crate) fn parse_event_line(line: &str) -> Option<Result<Value, EventStreamError>> {
    let data = line.strip_prefix("data:")?.trim();
    if data.is_empty() {
        return None;
    }
    let event: Value = serde_json::from_str(data).ok()?;

    let code = event
        .pointer("/error/code")
        .and_then(Value::as_str)
        .unwrap_or_default();
    if code.is_empty() {
        return Some(Ok(event));
    }
    if QR_SESSION_EXPIRED_CODES.contains(&code) {
        return Some(Err(EventStreamError::QrSessionExpired(code.to_owned())));
    }
    let message = event
        .pointer("/error/message")
        .and_then(Value::as_str)
        .unwrap_or_default();
    Some(Err(EventStreamError::Broker {
        code: code.to_owned(),
        message: message.to_owned(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_data_lines_are_skipped() {
        assert!(parse_event_line("HTTP/1.1 200 OK").is_none());
        assert!(parse_event_line(": ping").is_none());
        assert!(parse_event_line("data:").is_none());
        assert!(parse_event_line("data: not json").is_none());
        assert!(parse_event_line("event: message").is_none());
    }

    #[test]
    fn test_payload_event() {
        let event = parse_event_line(r#"data: {"redirect_url": "https://sgo/cb"}"#)
            .unwrap()
            .unwrap();
        assert_eq!(event["redirect_url"], "https://sgo/cb");
    }

    #[test]
    fn test_expired_session_codes_are_transient() {
        for code in QR_SESSION_EXPIRED_CODES {
            let line = format!(r#"data:{{"error": {{"code": "{code}"}}}}"#);
            let err = parse_event_line(&line).unwrap().unwrap_err();
            assert!(err.is_transient(), "{code}");
        }
    }

    #[test]
    fn test_other_error_codes_are_fatal() {
        let err = parse_event_line(
            r#"data: {"error": {"code": "QR_DECLINED", "message": "Вход отклонён"}}"#,
        )
        .unwrap()
        .unwrap_err();
        assert!(!err.is_transient());
        assert!(
            matches!(err, EventStreamError::Broker { ref code, ref message } if code == "QR_DECLINED" && message == "Вход отклонён")
        );
    }

    #[test]
    fn test_non_object_error_is_a_payload() {
        let event = parse_event_line(r#"data: {"error": "none", "state": "ok"}"#)
            .unwrap()
            .unwrap();
        assert_eq!(event["state"], "ok");
    }
}
