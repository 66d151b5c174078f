use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{
    init::{finish_login, identify_student},
    login::{with_cookie_rollback, LoginError},
};
use crate::{
    client::{LoginMethod, Session},
    http::CookieStore,
    Client, NotAuthenticatedError, SessionExpiredError,
};

/// Current version of the exported session format.
pub const SESSION_FORMAT_VERSION: u32 = 1;

/// Snapshot of a portal session that can be stored and restored later.
///
/// This is not a credential store: the snapshot holds a live access token and cookies, so it
/// should be kept as private as a password.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ExportedSession {
    /// Format version, always [SESSION_FORMAT_VERSION] when exported
    pub version: u32,
    /// Portal access token
    pub access_token: Option<String>,
    /// Student id
    pub student_id: i64,
    /// Academic year id
    pub year_id: i64,
    /// School id
    pub school_id: i64,
    /// Portal cookies by name
    #[serde(default)]
    pub cookies: BTreeMap<String, String>,
}

pub(crate) async fn export_session(client: &Client) -> Result<ExportedSession, NotAuthenticatedError> {
    let session = client.internal.authenticated_session()?;
    let cookies = client
        .internal
        .http()
        .cookies()
        .list_cookies()
        .await
        .unwrap_or_default()
        .into_iter()
        .map(|c| (c.name, c.value))
        .collect();

    Ok(ExportedSession {
        version: SESSION_FORMAT_VERSION,
        access_token: session.access_token,
        student_id: session.student_id,
        year_id: session.year_id,
        school_id: session.school_id,
        cookies,
    })
}

pub(crate) async fn import_session(client: &Client, data: &str) -> Result<(), LoginError> {
    let exported: ExportedSession =
        serde_json::from_str(data).map_err(LoginError::InvalidSessionData)?;
    if exported.version != SESSION_FORMAT_VERSION {
        return Err(LoginError::UnsupportedSessionVersion(exported.version));
    }

    let http = client.internal.http();
    let session = with_cookie_rollback(http, async {
        for (name, value) in &exported.cookies {
            http.set_cookie(name, value).await?;
        }

        let (student_id, issued_token) = identify_student(http, exported.access_token.as_deref())
            .await
            .map_err(|e| match e.is_session_rejected() {
                true => LoginError::from(SessionExpiredError(e.to_string())),
                false => e.into(),
            })?;

        let mut session = Session {
            access_token: exported.access_token.clone().or(issued_token),
            student_id,
            year_id: exported.year_id,
            school_id: exported.school_id,
            ..Session::default()
        };
        finish_login(http, &mut session).await?;
        Ok::<_, LoginError>(session)
    })
    .await?;

    client.internal.commit_session(session, LoginMethod::Imported);
    Ok(())
}
