use netschool_core::truncate_for_display;
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};

use super::{complete_login, reach_broker};
use crate::{
    broker::{BrokerIdentity, BrokerProtocolError, BROKER_SESSION_COOKIE},
    BrokerAuthClient, BrokerLoginError,
};

/// Options of a QR code login.
#[derive(Clone, Debug, Default)]
pub struct BrokerQrRequest {
    /// Part of the organization name, used when the account is linked to several
    pub organization: Option<String>,
}

/// A generated QR code.
struct QrExchange {
    signed_token: String,
    qr_id: String,
}

async fn generate_qr(identity: &BrokerIdentity) -> Result<QrExchange, BrokerLoginError> {
    let mut request = identity.api_request(Method::POST, identity.url("qr-delegate/qr/generate")?);
    if let Some(session) = identity.cookie_value(BROKER_SESSION_COOKIE).await? {
        request = request.json(&json!({ "esia_session": session }));
    }

    let response = identity.send(request).await?;
    let status = response.status();
    let text = response.text().await.map_err(netschool_core::ApiError::from)?;
    if status != StatusCode::OK {
        return Err(BrokerProtocolError::QrGeneration {
            status: status.as_u16(),
            body: truncate_for_display(&text, 300),
        }
        .into());
    }

    let data: Value = serde_json::from_str(&text).unwrap_or(Value::Null);
    let field = |name: &str| {
        data.get(name)
            .and_then(Value::as_str)
            .filter(|v| !v.is_empty())
            .map(str::to_owned)
    };
    match (field("signed_token"), field("qr_id")) {
        (Some(signed_token), Some(qr_id)) => Ok(QrExchange {
            signed_token,
            qr_id,
        }),
        _ => Err(BrokerProtocolError::MissingQrData(truncate_for_display(&text, 300)).into()),
    }
}

pub(crate) async fn login_via_broker_qr(
    broker: &BrokerAuthClient,
    input: &BrokerQrRequest,
) -> Result<String, BrokerLoginError> {
    tracing::info!("Logging in with a Gosuslugi QR code");
    let settings = &broker.settings;
    let subscriber = broker.event_subscriber()?;
    let max_attempts = settings.max_qr_attempts.max(1);

    let identity = BrokerIdentity::new(settings)?;
    reach_broker(broker, &identity).await?;

    let mut attempt = 1;
    let (signed_token, answer) = loop {
        if attempt > 1 {
            identity.clear_cookies().await?;
            reach_broker(broker, &identity).await?;
        }

        let exchange = generate_qr(&identity).await?;
        broker
            .qr_display
            .show(&format!("{}{}", settings.deep_link_prefix, exchange.signed_token))
            .await?;

        let url = identity.url(&format!("qr-delegate/qr/subscribe/{}", exchange.qr_id))?;
        let cookies = identity.cookie_header_for(&url).await?;
        match subscriber.subscribe(&url, &cookies, settings.qr_timeout()).await {
            Ok(answer) => break (exchange.signed_token, answer),
            Err(e) if e.is_transient() && attempt < max_attempts => {
                let delay = settings.qr_retry_delay(attempt);
                tracing::warn!(attempt, max_attempts, ?delay, error = %e, "QR session expired, generating a new code");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) if e.is_transient() => {
                return Err(BrokerLoginError::QrRetriesExhausted {
                    attempts: attempt,
                    source: e,
                })
            }
            Err(e) => return Err(e.into()),
        }
    };
    tracing::info!(attempt, "QR code scanned");

    complete_login(broker, &identity, answer, input.organization.as_deref()).await?;
    Ok(signed_token)
}
