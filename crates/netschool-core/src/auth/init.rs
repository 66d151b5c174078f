use std::collections::HashMap;

use reqwest::Method;
use serde::Deserialize;

use crate::{
    client::{session::UNSET_ID, AssignmentType, Session},
    http::HttpSession,
    require, ApiError, MissingFieldError,
};

#[derive(Debug, thiserror::Error)]
pub(crate) enum InitError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    MissingField(#[from] MissingFieldError),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DiaryInit {
    #[serde(default)]
    students: Vec<StudentRef>,
    current_student_id: Option<usize>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StudentRef {
    student_id: i64,
}

#[derive(Deserialize)]
struct IdOnly {
    id: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Context {
    school_id: Option<i64>,
}

#[derive(Deserialize)]
struct RawAssignmentType {
    id: i64,
    name: String,
    #[serde(default)]
    abbr: Option<String>,
}

/// The identity-init call. Returns the current student id and the `at` header if the portal
/// issued one.
pub(crate) async fn identify_student(
    http: &HttpSession,
    token: Option<&str>,
) -> Result<(i64, Option<String>), InitError> {
    let response = http
        .send(http.request_with_token(Method::GET, "student/diary/init", token)?)
        .await?;
    let issued_token = response
        .headers()
        .get("at")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_owned);

    let init: DiaryInit = response.json().await.map_err(ApiError::from)?;
    let index = require!(init.current_student_id);
    let student = require!(init.students.get(index));
    Ok((student.student_id, issued_token))
}

/// Post-login initialization: academic year, school when still unknown (best effort) and the
/// assignment type dictionary.
pub(crate) async fn finish_login(http: &HttpSession, session: &mut Session) -> Result<(), InitError> {
    let token = session.access_token.as_deref();

    let year: IdOnly = http
        .send(http.request_with_token(Method::GET, "years/current", token)?)
        .await?
        .json()
        .await
        .map_err(ApiError::from)?;
    session.year_id = year.id;

    if session.school_id <= 0 {
        match fetch_school_id(http, token).await {
            Ok(Some(id)) => session.school_id = id,
            Ok(None) => {}
            Err(e) => tracing::debug!("Could not resolve school from context: {e}"),
        }
    }

    let types: Vec<RawAssignmentType> = http
        .send(
            http.request_with_token(Method::GET, "grade/assignment/types", token)?
                .query(&[("all", "false")]),
        )
        .await?
        .json()
        .await
        .map_err(ApiError::from)?;
    session.assignment_types = types
        .into_iter()
        .map(|t| {
            (
                t.id,
                AssignmentType {
                    name: t.name,
                    abbr: t.abbr.unwrap_or_default(),
                },
            )
        })
        .collect::<HashMap<_, _>>();

    Ok(())
}

async fn fetch_school_id(http: &HttpSession, token: Option<&str>) -> Result<Option<i64>, ApiError> {
    let context: Context = http
        .send(http.request_with_token(Method::GET, "context", token)?)
        .await?
        .json()
        .await?;
    Ok(context.school_id)
}

/// Identity-init followed by [finish_login].
pub(crate) async fn build_session(
    http: &HttpSession,
    token: Option<String>,
    school_id: Option<i64>,
) -> Result<Session, InitError> {
    let (student_id, issued_token) = identify_student(http, token.as_deref()).await?;
    let mut session = Session {
        access_token: token.or(issued_token),
        student_id,
        school_id: school_id.unwrap_or(UNSET_ID),
        ..Session::default()
    };
    finish_login(http, &mut session).await?;
    Ok(session)
}

impl InitError {
    /// Whether the portal refused the session, as opposed to not answering.
    pub(crate) fn is_session_rejected(&self) -> bool {
        match self {
            InitError::MissingField(_) => true,
            InitError::Api(ApiError::ResponseContent { status, .. }) => matches!(
                *status,
                reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN
            ),
            InitError::Api(ApiError::Reqwest(e)) => e.is_decode(),
            InitError::Api(ApiError::Serde(_)) => true,
            InitError::Api(_) => false,
        }
    }
}

impl From<InitError> for super::LoginError {
    fn from(e: InitError) -> Self {
        match e {
            InitError::Api(e) => e.into(),
            InitError::MissingField(e) => e.into(),
        }
    }
}
