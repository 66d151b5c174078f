use super::{with_cookie_rollback, LoginError};
use crate::{
    auth::init::build_session,
    client::LoginMethod,
    http::{Cookie, CookieStore},
    Client,
};

/// A portal access token and the cookies obtained for it by another HTTP identity, such as the
/// identity broker's.
#[derive(Clone, Debug)]
pub struct TransferredSession {
    /// Portal access token
    pub access_token: String,
    /// Cookies to copy into the portal jar
    pub cookies: Vec<Cookie>,
    /// School id if already known
    pub school_id: Option<i64>,
}

pub(crate) async fn complete_transferred_login(
    client: &Client,
    transferred: TransferredSession,
) -> Result<(), LoginError> {
    let http = client.internal.http();

    let session = with_cookie_rollback(http, async {
        let jar = http.cookies();
        for cookie in transferred.cookies {
            jar.set_cookie(cookie).await?;
        }
        Ok::<_, LoginError>(
            build_session(http, Some(transferred.access_token), transferred.school_id).await?,
        )
    })
    .await?;

    client.internal.commit_session(session, LoginMethod::Broker);
    Ok(())
}
