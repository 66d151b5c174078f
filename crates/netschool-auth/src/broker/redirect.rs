use std::sync::LazyLock;

use netschool_core::ApiError;
use regex::Regex;
use reqwest::{header, Method};
use url::Url;

use super::BrokerIdentity;

static LOGIN_STATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"loginState=([a-f0-9-]+)").expect("loginState pattern is valid")
});

/// Where a redirect walk ended.
#[derive(Debug, Clone, PartialEq)]
pub struct RedirectOutcome {
    /// URL of the first non-redirect response, or the last location seen when the hop limit was
    /// reached first.
    pub final_url: Url,
    /// The most recent `loginState` seen in a response URL or `Location` header.
    pub login_state: Option<String>,
}

/// Follows redirects from `start` for at most `max_hops` requests.
///
/// Cookies set along the way land in the identity's jar. Reaching the hop limit is not an error,
/// the caller decides from the outcome whether the walk got where it had to.
pub async fn walk_redirects(
    identity: &BrokerIdentity,
    start: Url,
    max_hops: usize,
) -> Result<RedirectOutcome, ApiError> {
    let mut url = start;
    let mut login_state = None;

    for _ in 0..max_hops {
        let response = identity
            .send(identity.request(Method::GET, url.clone()))
            .await?;
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        let seen = format!(
            "{}{}",
            response.url(),
            location.as_deref().unwrap_or_default()
        );
        if let Some(state) = LOGIN_STATE.captures(&seen).and_then(|c| c.get(1)) {
            login_state = Some(state.as_str().to_owned());
        }

        match location {
            Some(location) if response.status().is_redirection() => {
                url = response.url().join(&location)?;
                tracing::debug!(next = %url, "Following redirect");
            }
            _ => {
                return Ok(RedirectOutcome {
                    final_url: response.url().clone(),
                    login_state,
                })
            }
        }
    }

    tracing::warn!(max_hops, last = %url, "Redirect limit reached");
    Ok(RedirectOutcome {
        final_url: url,
        login_state,
    })
}
