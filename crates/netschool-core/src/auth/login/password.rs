use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value};

use super::{resolve_school, with_cookie_rollback, LoginError};
use crate::{
    auth::init::build_session,
    client::{LoginMethod, SchoolIdentifier, Session},
    http::{check_status, HttpSession},
    ApiError, Client,
};

/// Portal user name and password login.
#[derive(Clone)]
pub struct PasswordLoginRequest {
    /// Portal user name
    pub user_name: String,
    /// Portal password
    pub password: String,
    /// School id or name
    pub school: SchoolIdentifier,
}

#[derive(Deserialize)]
struct LoginResponse {
    at: Option<String>,
    message: Option<String>,
}

pub(crate) async fn login_password(
    client: &Client,
    input: &PasswordLoginRequest,
) -> Result<(), LoginError> {
    tracing::info!(user_name = %input.user_name, "Logging in with portal credentials");
    let http = client.internal.http();

    let session = with_cookie_rollback(http, password_session(http, input)).await?;
    client.internal.commit_session(
        session,
        LoginMethod::Credentials {
            user_name: input.user_name.clone(),
            password: input.password.clone(),
            school: input.school.clone(),
        },
    );
    Ok(())
}

async fn password_session(
    http: &HttpSession,
    input: &PasswordLoginRequest,
) -> Result<Session, LoginError> {
    // Issues the NSSESSIONID cookie.
    http.send(http.request_with_token(Method::GET, "logindata", None)?)
        .await?;

    let mut meta: Map<String, Value> = http
        .send(http.request_with_token(Method::POST, "auth/getdata", None)?)
        .await?
        .json()
        .await
        .map_err(ApiError::from)?;
    let salt = match meta.remove("salt") {
        Some(Value::String(salt)) => salt,
        _ => return Err(crate::MissingFieldError("salt").into()),
    };

    let (pw, pw2) = hash_password(&input.password, &salt);
    let school_id = resolve_school(http, &input.school).await?;

    let mut form: Vec<(String, String)> = vec![
        ("loginType".into(), "1".into()),
        ("scid".into(), school_id.to_string()),
        ("un".into(), input.user_name.clone()),
        ("pw".into(), pw),
        ("pw2".into(), pw2),
    ];
    form.extend(meta.into_iter().map(|(k, v)| {
        let value = match v {
            Value::String(s) => s,
            other => other.to_string(),
        };
        (k, value)
    }));

    let response = http
        .execute(
            http.request_with_token(Method::POST, "login", None)?
                .form(&form),
            None,
        )
        .await?;

    if response.status() == StatusCode::CONFLICT {
        let message = response
            .json::<LoginResponse>()
            .await
            .ok()
            .and_then(|r| r.message)
            .unwrap_or_else(|| "Ошибка авторизации".to_string());
        return Err(LoginError::InvalidCredentials(message));
    }

    let result: LoginResponse = check_status(response)
        .await?
        .json()
        .await
        .map_err(ApiError::from)?;
    let token = match (result.at, result.message) {
        (Some(at), _) => at,
        (None, Some(message)) => return Err(LoginError::InvalidCredentials(message)),
        (None, None) => return Err(LoginError::MissingAccessToken),
    };

    Ok(build_session(http, Some(token), Some(school_id)).await?)
}

/// Computes the `pw`/`pw2` pair: `pw2 = md5(salt + hex(md5(cp1251(password))))` and `pw` its
/// prefix as long as the password.
pub(crate) fn hash_password(password: &str, salt: &str) -> (String, String) {
    let (encoded, _, _) = encoding_rs::WINDOWS_1251.encode(password);
    let password_hash = format!("{:x}", md5::compute(&encoded));
    let pw2 = format!("{:x}", md5::compute(format!("{salt}{password_hash}")));
    let pw = pw2.chars().take(password.chars().count()).collect();
    (pw, pw2)
}
