use netschool_core::{
    auth::{LoginError, TransferredSession},
    http::{CookieStore, HttpSession},
    truncate_for_display, Client,
};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::Value;

use super::{
    identity::read_json,
    organization::{pick_organization, OrganizationCandidate},
    BrokerIdentity, BrokerProtocolError, BrokerRejection,
};
use crate::{prompt::ChoicePrompt, BrokerLoginError};

/// `loginType` of a login vouched for by an identity provider.
const IDP_LOGIN_TYPE: &str = "8";

#[derive(Deserialize)]
struct IdpLoginResponse {
    at: Option<String>,
}

/// Exchanges the broker's `loginState` for a portal session and hands it to `client`.
///
/// Every request goes through the broker identity, which holds the portal cookies collected on
/// the callback. Only cookies for the portal host, or without a domain, are copied over.
pub(crate) async fn transfer_session(
    client: &Client,
    identity: &BrokerIdentity,
    login_state: &str,
    organization: Option<&str>,
    prompt: Option<&dyn ChoicePrompt>,
) -> Result<(), BrokerLoginError> {
    let portal = client.internal.http();

    identity
        .send(identity.request(Method::GET, portal.api_url("logindata")?))
        .await?;

    let candidates = account_info(portal, identity, login_state).await?;
    let selected = pick_organization(&candidates, organization, prompt).await?;
    tracing::info!(organization = %selected.name, "Organization selected");

    let access_token = idp_login(portal, identity, login_state, selected).await?;

    let portal_host = portal.origin().host_str().unwrap_or_default().to_owned();
    let cookies = identity.cookies().cookies_for_host(&portal_host).await?;
    tracing::debug!(count = cookies.len(), "Transferring broker cookies to the portal session");

    client
        .auth()
        .login_with_transferred_session(TransferredSession {
            access_token,
            cookies,
            school_id: None,
        })
        .await?;
    Ok(())
}

async fn account_info(
    portal: &HttpSession,
    identity: &BrokerIdentity,
    login_state: &str,
) -> Result<Vec<OrganizationCandidate>, BrokerLoginError> {
    let request = identity
        .request(Method::GET, portal.api_url("sso/esia/account-info")?)
        .query(&[("loginState", login_state)]);
    let response = identity.send(request).await?;

    let status = response.status();
    if status != StatusCode::OK {
        let body = response.text().await.unwrap_or_default();
        return Err(BrokerProtocolError::AccountInfo {
            status: status.as_u16(),
            body: truncate_for_display(&body, 300),
        }
        .into());
    }

    let (_, info) = read_json(response).await?;
    Ok(info
        .get("users")
        .and_then(Value::as_array)
        .map(|users| {
            users
                .iter()
                .map(OrganizationCandidate::from_account_info)
                .collect()
        })
        .unwrap_or_default())
}

async fn idp_login(
    portal: &HttpSession,
    identity: &BrokerIdentity,
    login_state: &str,
    selected: &OrganizationCandidate,
) -> Result<String, BrokerLoginError> {
    let mut form = vec![
        ("loginType", IDP_LOGIN_TYPE),
        ("lscope", selected.id.as_str()),
        ("idp", "esia"),
        ("loginState", login_state),
    ];
    if let Some(role) = selected.roles.first() {
        form.push(("rolegroup", role.as_str()));
    }

    let response = identity
        .send(
            identity
                .request(Method::POST, portal.api_url("auth/login")?)
                .form(&form),
        )
        .await?;

    let status = response.status();
    if status != StatusCode::OK {
        let body = response.text().await.unwrap_or_default();
        return Err(BrokerRejection::Portal(format!(
            "{} {}",
            status.as_u16(),
            truncate_for_display(&body, 300)
        ))
        .into());
    }

    let result: IdpLoginResponse = response
        .json()
        .await
        .map_err(netschool_core::ApiError::from)?;
    match result.at {
        Some(at) if !at.is_empty() => Ok(at),
        _ => Err(LoginError::MissingAccessToken.into()),
    }
}
