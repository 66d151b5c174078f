use std::sync::Arc;

use color_eyre::eyre::Result;
use inquire::Password;
use netschool_auth::{BrokerAuthClientExt, BrokerPasswordRequest, BrokerQrRequest};
use netschool_cli::{text_prompt_when_none, InquireChoicePrompt, InquireProofProvider};
use netschool_core::{auth::PasswordLoginRequest, client::SchoolIdentifier, Client};
use tracing::info;

fn password_prompt_when_none(password: Option<String>) -> Result<String> {
    Ok(match password {
        Some(password) => password,
        None => Password::new("Password").without_confirmation().prompt()?,
    })
}

pub(crate) async fn login_password(
    client: &Client,
    login: Option<String>,
    password: Option<String>,
    school: Option<String>,
) -> Result<()> {
    let user_name = text_prompt_when_none("User name", login)?;
    let password = password_prompt_when_none(password)?;
    let school = text_prompt_when_none("School", school)?;

    client
        .auth()
        .login_password(&PasswordLoginRequest {
            user_name,
            password,
            school: SchoolIdentifier::from(school),
        })
        .await?;
    Ok(())
}

pub(crate) async fn login_token(
    client: &Client,
    token: Option<String>,
    school: Option<String>,
) -> Result<()> {
    let token = text_prompt_when_none("Access token", token)?;
    client
        .auth()
        .login_with_token(&token, school.map(SchoolIdentifier::from))
        .await?;
    Ok(())
}

pub(crate) async fn login_session_store(
    client: &Client,
    value: Option<String>,
    school: Option<String>,
) -> Result<()> {
    let value = text_prompt_when_none("session-store value", value)?;
    client
        .auth()
        .login_with_session_store(&value, school.map(SchoolIdentifier::from))
        .await?;
    Ok(())
}

pub(crate) async fn login_cookies(
    client: &Client,
    cookies: Option<String>,
    school: Option<String>,
) -> Result<()> {
    let cookies = text_prompt_when_none("Cookies", cookies)?;
    client
        .auth()
        .login_with_cookies(&cookies, school.map(SchoolIdentifier::from))
        .await?;
    Ok(())
}

pub(crate) async fn login_broker(
    client: &Client,
    login: Option<String>,
    password: Option<String>,
    organization: Option<String>,
) -> Result<()> {
    let login = text_prompt_when_none("Gosuslugi login", login)?;
    let password = password_prompt_when_none(password)?;

    client
        .broker_auth()
        .with_proof_provider(Arc::new(InquireProofProvider))
        .with_choice_prompt(Arc::new(InquireChoicePrompt))
        .login_password(&BrokerPasswordRequest {
            login,
            password,
            organization,
        })
        .await?;
    Ok(())
}

pub(crate) async fn login_broker_qr(client: &Client, organization: Option<String>) -> Result<()> {
    let show = |deep_link: &str| {
        eprintln!("Scan this link as a QR code with the Gosuslugi app:\n{deep_link}");
    };

    let signed_token = client
        .broker_auth()
        .with_proof_provider(Arc::new(InquireProofProvider))
        .with_choice_prompt(Arc::new(InquireChoicePrompt))
        .with_qr_display(Arc::new(show))
        .login_qr(&BrokerQrRequest { organization })
        .await?;
    info!(signed_token_length = signed_token.len(), "QR login complete");
    Ok(())
}
