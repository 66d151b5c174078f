//! Calls that need no session and no client, only a portal URL or region name.

use reqwest::Method;

use super::PortalError;
use crate::{
    auth::login::school::search_schools as search,
    http::HttpSession,
    models::{LoginMethods, ShortSchool},
    regions, ApiError, ClientSettings,
};

fn session_for(url_or_region: &str) -> Result<HttpSession, PortalError> {
    let url = regions::resolve_url(url_or_region)
        .ok_or_else(|| PortalError::UnknownRegion(url_or_region.to_owned()))?;
    Ok(HttpSession::new(&ClientSettings::for_url(url))?)
}

/// Searches the schools of the portal at `url_or_region`, which may be a region name.
pub async fn search_schools(
    url_or_region: &str,
    query: &str,
) -> Result<Vec<ShortSchool>, PortalError> {
    let http = session_for(url_or_region)?;
    Ok(search(&http, query).await?)
}

/// The login options of the portal at `url_or_region`, which may be a region name.
pub async fn get_login_methods(url_or_region: &str) -> Result<LoginMethods, PortalError> {
    let http = session_for(url_or_region)?;
    let response = http
        .send(http.request_with_token(Method::GET, "logindata", None)?)
        .await?;
    Ok(response.json().await.map_err(ApiError::from)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_region() {
        let err = get_login_methods("Неизвестная область").await.unwrap_err();
        assert!(matches!(err, PortalError::UnknownRegion(_)));

        let err = search_schools("Республика", "школа").await.unwrap_err();
        assert!(matches!(err, PortalError::UnknownRegion(_)));
    }
}
