use std::collections::BTreeMap;

use super::{resolve_school, with_cookie_rollback, LoginError};
use crate::{
    auth::init::{finish_login, identify_student},
    client::{session::UNSET_ID, LoginMethod, SchoolIdentifier, Session},
    Client, SessionExpiredError,
};

/// Name of the portal session cookie.
pub const SESSION_COOKIE: &str = "NSSESSIONID";

/// Parses browser cookies.
///
/// A bare 32 character hex value is taken as the session cookie itself; anything else must be a
/// `name=value; ...` list containing the session cookie. Returns `None` otherwise.
pub fn parse_cookie_string(raw: &str) -> Option<BTreeMap<String, String>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if raw.len() == 32 && raw.chars().all(|c| c.is_ascii_hexdigit()) {
        return Some(BTreeMap::from([(SESSION_COOKIE.to_string(), raw.to_string())]));
    }

    let cookies: BTreeMap<String, String> = raw
        .split(';')
        .filter_map(|part| part.split_once('='))
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .collect();
    cookies.contains_key(SESSION_COOKIE).then_some(cookies)
}

pub(crate) async fn login_with_cookies(
    client: &Client,
    raw: &str,
    school: Option<&SchoolIdentifier>,
) -> Result<(), LoginError> {
    let cookies = parse_cookie_string(raw).ok_or(LoginError::InvalidCookies)?;
    let http = client.internal.http();

    let session = with_cookie_rollback(http, async {
        for (name, value) in &cookies {
            http.set_cookie(name, value).await?;
        }

        let (student_id, issued_token) = identify_student(http, None)
            .await
            .map_err(|e| SessionExpiredError(format!("cookies are invalid or expired: {e}")))?;

        let school_id = match school {
            Some(school) => resolve_school(http, school).await?,
            None => UNSET_ID,
        };
        let mut session = Session {
            access_token: issued_token,
            student_id,
            school_id,
            ..Session::default()
        };
        finish_login(http, &mut session).await?;
        Ok::<_, LoginError>(session)
    })
    .await?;

    client.internal.commit_session(session, LoginMethod::Cookies);
    Ok(())
}
