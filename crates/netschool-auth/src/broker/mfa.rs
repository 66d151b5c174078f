//! Second factor and security check confirmation.

use std::time::Duration;

use netschool_core::{truncate_for_display, ApiError};
use reqwest::{Method, Response, StatusCode};
use serde_json::{json, Value};

use super::{resolver::StepResolver, MultiFactorError};
use crate::{
    prompt::{ProofKind, ProofRequest},
    BrokerLoginError,
};

const PROOF_DETAIL_KEYS: [&str; 3] = ["otp_details", "ttp_details", "otp_max_details"];
const DEFAULT_CODE_LENGTH: u32 = 6;

/// Kind of second factor the broker asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MfaKind {
    /// Code sent by SMS
    Sms,
    /// Authenticator app code. The broker also calls it `TTP`.
    Totp,
    /// Code sent to the "Max" messenger
    MaxApp,
    /// Confirmation in the Goskey app
    Push,
    /// Anything else, as sent by the broker
    Unknown(String),
}

impl MfaKind {
    /// Parses the broker's type name, case-insensitively.
    pub fn parse(raw: &str) -> Self {
        match raw.to_uppercase().as_str() {
            "SMS" => Self::Sms,
            "TOTP" | "TTP" => Self::Totp,
            "MAX" => Self::MaxApp,
            "PUSH" => Self::Push,
            _ => Self::Unknown(raw.to_owned()),
        }
    }

    fn verify_path(&self) -> Option<&'static str> {
        match self {
            Self::Sms => Some("otp/verify"),
            Self::Totp => Some("mfa/verify"),
            Self::MaxApp => Some("otp-max/verify"),
            Self::Push | Self::Unknown(_) => None,
        }
    }
}

/// Verification endpoints to try in order: the one of `kind`, then the shapes the broker has
/// used for other types. Without duplicates.
fn verify_paths(kind: &MfaKind, raw: &str) -> Vec<String> {
    let raw = raw.to_lowercase();
    let candidates = kind
        .verify_path()
        .map(str::to_owned)
        .into_iter()
        .chain([
            "mfa/verify".to_owned(),
            format!("{raw}/verify"),
            format!("otp-{raw}/verify"),
            "otp/verify".to_owned(),
        ]);

    let mut paths: Vec<String> = Vec::new();
    for path in candidates {
        if !paths.contains(&path) {
            paths.push(path);
        }
    }
    paths
}

/// The first non-empty details object of `mfa_details`.
fn proof_details(mfa_details: &Value) -> Option<&Value> {
    PROOF_DETAIL_KEYS
        .iter()
        .filter_map(|key| mfa_details.get(key))
        .find(|details| details.as_object().is_some_and(|o| !o.is_empty()))
}

fn u32_field(object: Option<&Value>, key: &str) -> Option<u32> {
    object
        .and_then(|o| o.get(key))
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())
}

fn str_field(object: Option<&Value>, key: &str) -> Option<String> {
    object
        .and_then(|o| o.get(key))
        .and_then(Value::as_str)
        .map(str::to_owned)
}

async fn read_text(response: Response) -> Result<(StatusCode, String), ApiError> {
    let status = response.status();
    Ok((status, response.text().await?))
}

impl StepResolver<'_> {
    /// Confirms the second factor of an `ENTER_MFA` answer. Returns the broker's answer to the
    /// confirmation.
    pub(crate) async fn confirm_mfa(&self, body: &Value) -> Result<Value, BrokerLoginError> {
        let mfa_details = body.get("mfa_details").unwrap_or(&Value::Null);
        let raw = mfa_details
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("UNKNOWN");
        let kind = MfaKind::parse(raw);
        tracing::info!(mfa_type = ?kind, "Second factor required");

        let proof_kind = match &kind {
            MfaKind::Sms => ProofKind::Sms,
            MfaKind::Totp => ProofKind::Totp,
            MfaKind::MaxApp => ProofKind::MaxApp,
            MfaKind::Push => return self.poll_push(body).await,
            MfaKind::Unknown(raw) => return Err(MultiFactorError::UnknownType(raw.clone()).into()),
        };

        let details = proof_details(mfa_details);
        let request = ProofRequest {
            kind: proof_kind,
            destination: str_field(details, "phone"),
            code_length: u32_field(details, "code_length").unwrap_or(DEFAULT_CODE_LENGTH),
            attempts_left: u32_field(details, "verify_attempts_left"),
            valid_for: u32_field(details, "verify_timeout_secs")
                .map(|secs| Duration::from_secs(secs.into())),
        };
        let code = self.ask_proof(&request).await?;

        let answer = self.verify_code(&kind, raw, &code).await?;
        if let Some(failed) = answer.get("failed").filter(|f| !f.is_null()) {
            let attempts_left = answer
                .get("mfa_details")
                .and_then(proof_details)
                .and_then(|d| d.get("verify_attempts_left"))
                .and_then(Value::as_i64);
            return Err(MultiFactorError::Rejected {
                code: failed
                    .as_str()
                    .map(str::to_owned)
                    .unwrap_or_else(|| failed.to_string()),
                attempts_left,
            }
            .into());
        }

        tracing::info!("Confirmation code accepted");
        Ok(answer)
    }

    async fn ask_proof(&self, request: &ProofRequest) -> Result<String, MultiFactorError> {
        let provider = self.proof.ok_or(MultiFactorError::NoProofProvider)?;
        let code = provider.proof(request).await?.trim().to_owned();
        if code.is_empty() {
            return Err(MultiFactorError::EmptyCode);
        }
        Ok(code)
    }

    async fn verify_code(
        &self,
        kind: &MfaKind,
        raw: &str,
        code: &str,
    ) -> Result<Value, BrokerLoginError> {
        let paths = verify_paths(kind, raw);

        for path in &paths {
            let request = self
                .identity
                .api_request(Method::POST, self.identity.login_api(path)?)
                .query(&[("code", code)]);
            let (status, text) = read_text(self.identity.send(request).await?).await?;

            if status == StatusCode::NOT_FOUND {
                tracing::debug!(path = %path, "Verification endpoint not found");
                continue;
            }
            if status != StatusCode::OK && status != StatusCode::CREATED {
                return Err(MultiFactorError::VerifyFailed {
                    status: status.as_u16(),
                    body: truncate_for_display(&text, 300),
                }
                .into());
            }
            return Ok(serde_json::from_str(&text).unwrap_or(Value::Null));
        }

        Err(MultiFactorError::VerifyEndpointNotFound(paths).into())
    }

    /// Polls until the push confirmation is accepted, declined or the wait runs out.
    async fn poll_push(&self, body: &Value) -> Result<Value, BrokerLoginError> {
        let payload = json!({
            "challenge_id": body.get("challenge_id").and_then(Value::as_str).unwrap_or_default(),
            "state": body.get("state").and_then(Value::as_str).unwrap_or_default(),
        });
        let max_wait = self.settings.push_max_wait();
        let deadline = tokio::time::Instant::now() + max_wait;
        tracing::info!("Waiting for the confirmation in the Goskey app");

        loop {
            tokio::time::sleep(self.settings.push_poll_interval()).await;

            match self.identity.api_post("poll", &payload).await {
                Ok((_, answer)) => {
                    if answer.get("redirect_url").is_some() {
                        return Ok(answer);
                    }
                    if let Some(failed) = answer.get("failed") {
                        return Err(MultiFactorError::PushRejected(
                            failed
                                .as_str()
                                .map(str::to_owned)
                                .unwrap_or_else(|| failed.to_string()),
                        )
                        .into());
                    }
                }
                Err(e) => tracing::debug!(error = %e, "Push poll failed"),
            }

            if tokio::time::Instant::now() >= deadline {
                return Err(MultiFactorError::PushTimeout(max_wait).into());
            }
        }
    }

    /// Confirms a `SOLVE_ANOMALY_REACTION` security check with a code sent by SMS.
    pub(crate) async fn confirm_anomaly(&self, body: &Value) -> Result<Value, BrokerLoginError> {
        let reaction = body.get("reaction_details");
        let guid = str_field(reaction, "guid").unwrap_or_default();
        tracing::warn!(
            reaction_type = %str_field(reaction, "type").unwrap_or_default(),
            "The broker requested a security check"
        );

        let (status, started) = self
            .identity
            .api_post("anomaly-reaction/start", &json!({ "guid": guid }))
            .await?;
        let started = (status == 200).then_some(started);

        let request = ProofRequest {
            kind: ProofKind::AnomalyCheck,
            destination: str_field(started.as_ref(), "phone"),
            code_length: u32_field(started.as_ref(), "code_length").unwrap_or(DEFAULT_CODE_LENGTH),
            attempts_left: None,
            valid_for: None,
        };
        let code = self.ask_proof(&request).await?;

        let request = self
            .identity
            .api_request(
                Method::POST,
                self.identity.login_api("anomaly-reaction/verify")?,
            )
            .json(&json!({ "code": code, "guid": guid }));
        let (status, text) = read_text(self.identity.send(request).await?).await?;
        if status != StatusCode::OK {
            return Err(MultiFactorError::AnomalyVerifyFailed {
                status: status.as_u16(),
                body: truncate_for_display(&text, 300),
            }
            .into());
        }

        tracing::info!("Security check passed");
        Ok(serde_json::from_str(&text).unwrap_or(Value::Null))
    }
}
