use serde_json::{json, Value};

use super::{complete_login, reach_broker};
use crate::{
    broker::{BrokerIdentity, BrokerRejection},
    BrokerAuthClient, BrokerLoginError,
};

/// Gosuslugi login and password.
#[derive(Clone)]
pub struct BrokerPasswordRequest {
    /// Phone number, e-mail or SNILS
    pub login: String,
    /// Gosuslugi password
    pub password: String,
    /// Part of the organization name, used when the account is linked to several
    pub organization: Option<String>,
}

impl std::fmt::Debug for BrokerPasswordRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrokerPasswordRequest")
            .field("login", &self.login)
            .field("organization", &self.organization)
            .finish_non_exhaustive()
    }
}

pub(crate) async fn login_via_broker_password(
    broker: &BrokerAuthClient,
    input: &BrokerPasswordRequest,
) -> Result<(), BrokerLoginError> {
    if input.login.is_empty() || input.password.is_empty() {
        return Err(BrokerRejection::EmptyCredentials.into());
    }
    tracing::info!("Logging in with Gosuslugi credentials");

    let identity = BrokerIdentity::new(&broker.settings)?;
    reach_broker(broker, &identity).await?;

    let (status, answer) = identity
        .api_post(
            "",
            &json!({ "login": input.login, "password": input.password }),
        )
        .await?;
    tracing::debug!(status, "Credentials submitted");

    if let Some(code) = rejection_code(&answer) {
        return Err(BrokerRejection::from_code(&code).into());
    }

    complete_login(broker, &identity, answer, input.organization.as_deref()).await
}

/// The `failed` member of a login answer. Codes that are not strings are kept as JSON text.
fn rejection_code(answer: &Value) -> Option<String> {
    match answer.get("failed")? {
        Value::Null => None,
        Value::String(code) => Some(code.clone()),
        other => Some(other.to_string()),
    }
}
