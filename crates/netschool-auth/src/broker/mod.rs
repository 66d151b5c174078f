//! Talking to the ESIA identity broker.
//!
//! The pieces here are combined by [`BrokerAuthClient`](crate::BrokerAuthClient). The broker is
//! reached by walking the portal's redirects. Its answers are resolved step by step until it
//! hands back a callback URL, and the portal session obtained on the callback is transferred to
//! the portal client.

mod error;
mod event_stream;
mod identity;
mod mfa;
mod organization;
mod redirect;
pub(crate) mod resolver;
mod settings;
mod step;
mod tls;
pub(crate) mod transfer;

pub use error::{BrokerProtocolError, BrokerRejection, MultiFactorError, OrganizationError};
pub use event_stream::{
    listen, EventStreamError, EventSubscriber, TlsEventSubscriber, QR_SESSION_EXPIRED_CODES,
};
pub(crate) use identity::BROKER_SESSION_COOKIE;
pub use identity::BrokerIdentity;
pub use mfa::MfaKind;
pub use organization::{select_organization, OrganizationCandidate, Selection};
pub use redirect::{walk_redirects, RedirectOutcome};
pub use settings::{BrokerSettings, BROWSER_USER_AGENT};
pub use step::{action_of, classify, extract_redirect_url, BranchStep, PostStep};

#[cfg(test)]
pub(crate) fn test_settings(server: &wiremock::MockServer) -> BrokerSettings {
    BrokerSettings {
        base_url: server.uri(),
        push_poll_interval: 0,
        push_max_wait: 0,
        qr_retry_backoff: 0,
        ..Default::default()
    }
}
