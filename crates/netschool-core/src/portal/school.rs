use reqwest::Method;

use super::{PortalClient, PortalError};
use crate::{
    auth::login::school::search_schools,
    models::{LoginMethods, School, ShortSchool},
    ApiError,
};

impl PortalClient {
    /// The card of the session's school.
    pub async fn school_info(&self) -> Result<School, PortalError> {
        let response = self
            .authed(|http, session| {
                http.request(Method::GET, &format!("schools/{}/card", session.school_id))
            })
            .await?;
        Ok(response.json().await.map_err(ApiError::from)?)
    }

    /// Login options of this portal. Does not need a session.
    pub async fn login_methods(&self) -> Result<LoginMethods, PortalError> {
        let http = self.http();
        let response = http
            .send(http.request_with_token(Method::GET, "logindata", None)?)
            .await?;
        Ok(response.json().await.map_err(ApiError::from)?)
    }

    /// Searches schools by name. An empty query lists all schools. Does not need a session.
    pub async fn search_schools(&self, query: &str) -> Result<Vec<ShortSchool>, PortalError> {
        Ok(search_schools(self.http(), query).await?)
    }

    /// All schools of this portal.
    pub async fn schools(&self) -> Result<Vec<ShortSchool>, PortalError> {
        self.search_schools("").await
    }
}
