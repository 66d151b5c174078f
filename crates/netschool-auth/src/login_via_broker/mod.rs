//! The federated login flows. Both reach the broker by following the portal's crosslogin
//! redirects and end the same way once the broker accepted the user: its answers are resolved
//! into a callback URL, the callback redirects yield the `loginState`, and the portal session
//! obtained for it is transferred to the portal client.

use netschool_core::http::HttpSession;
use reqwest::Method;
use serde_json::Value;
use url::Url;

use crate::{
    broker::{
        resolver::StepResolver, transfer::transfer_session, walk_redirects, BrokerIdentity,
        BrokerProtocolError,
    },
    BrokerAuthClient, BrokerLoginError,
};

mod password;
mod qr;

pub(crate) use password::login_via_broker_password;
pub use password::BrokerPasswordRequest;
pub(crate) use qr::login_via_broker_qr;
pub use qr::BrokerQrRequest;

pub(crate) fn crosslogin_url(portal: &HttpSession) -> Result<Url, BrokerLoginError> {
    Ok(portal.api_url("sso/esia/crosslogin")?)
}

/// Follows the portal's crosslogin redirects to the broker's login page.
async fn reach_broker(
    broker: &BrokerAuthClient,
    identity: &BrokerIdentity,
) -> Result<(), BrokerLoginError> {
    let portal = broker.client.internal.http();

    identity
        .send(identity.request(Method::GET, portal.api_url("logindata")?))
        .await?;

    let outcome = walk_redirects(
        identity,
        crosslogin_url(portal)?,
        broker.settings.max_crosslogin_redirects,
    )
    .await?;

    if outcome.final_url.origin() != identity.base().origin() {
        return Err(BrokerProtocolError::BrokerUnreachable(outcome.final_url.to_string()).into());
    }
    tracing::debug!(url = %outcome.final_url, "Reached the broker login page");
    Ok(())
}

/// Everything after the broker accepted the user.
async fn complete_login(
    broker: &BrokerAuthClient,
    identity: &BrokerIdentity,
    answer: Value,
    organization: Option<&str>,
) -> Result<(), BrokerLoginError> {
    let resolver = StepResolver {
        identity,
        settings: &broker.settings,
        proof: broker.proof.as_deref(),
    };
    let callback = identity.base().join(&resolver.resolve(answer).await?)?;
    tracing::info!("Broker login confirmed, returning to the portal");

    let outcome = walk_redirects(identity, callback, broker.settings.max_callback_redirects).await?;
    let login_state = outcome
        .login_state
        .ok_or(BrokerProtocolError::MissingLoginState)?;

    transfer_session(
        &broker.client,
        identity,
        &login_state,
        organization,
        broker.choice.as_deref(),
    )
    .await?;

    tracing::info!("Logged in through the identity broker");
    Ok(())
}
