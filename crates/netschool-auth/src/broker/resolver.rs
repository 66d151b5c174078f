use netschool_core::truncate_for_display;
use serde_json::{json, Value};

use super::{
    step::{action_of, classify, extract_redirect_url, BranchStep, PostStep},
    BrokerIdentity, BrokerProtocolError, BrokerSettings,
};
use crate::{prompt::ProofProvider, BrokerLoginError};

/// Drives the broker from an answer to the login API until it hands out the redirect URL back to
/// the portal.
pub(crate) struct StepResolver<'a> {
    pub(crate) identity: &'a BrokerIdentity,
    pub(crate) settings: &'a BrokerSettings,
    pub(crate) proof: Option<&'a dyn ProofProvider>,
}

impl StepResolver<'_> {
    /// Resolves the first answer after the credentials (or the QR scan) were accepted.
    pub(crate) async fn resolve(&self, body: Value) -> Result<String, BrokerLoginError> {
        match classify(&body) {
            BranchStep::RedirectReady(url) => Ok(url),
            BranchStep::Done => Err(BrokerProtocolError::DoneWithoutRedirect.into()),
            BranchStep::Unrecognized(_) => Err(BrokerProtocolError::UnexpectedResponse(
                truncate_for_display(&body.to_string(), 500),
            )
            .into()),
            _ => self.drive(body).await,
        }
    }

    /// Handles one step per iteration, at most `max_post_steps` of them.
    async fn drive(&self, mut body: Value) -> Result<String, BrokerLoginError> {
        for _ in 0..self.settings.max_post_steps {
            let step = classify(&body);
            tracing::debug!(action = action_of(&body), "Handling broker step");

            body = match step {
                BranchStep::RedirectReady(url) => return Ok(url),
                BranchStep::Done => return Err(BrokerProtocolError::DoneWithoutRedirect.into()),
                BranchStep::NeedsMfa => self.confirm_mfa(&body).await?,
                BranchStep::NeedsAnomalyCheck => {
                    let verified = self.confirm_anomaly(&body).await?;
                    if extract_redirect_url(&verified).is_some() || !action_of(&verified).is_empty() {
                        verified
                    } else {
                        self.identity.api_get("next-step").await?
                    }
                }
                BranchStep::NeedsPostStep(PostStep::MaxQuiz { skippable: false }) => {
                    return Err(BrokerProtocolError::MaxQuizNotSkippable.into())
                }
                BranchStep::NeedsPostStep(PostStep::MaxQuiz { skippable: true }) => {
                    self.skip_max_quiz().await?
                }
                BranchStep::NeedsPostStep(PostStep::ChangePassword) => {
                    self.skip_password_change().await?
                }
                BranchStep::Unrecognized(action) => {
                    let next = self.identity.api_get("next-step").await?;
                    if action_of(&next) == action && extract_redirect_url(&next).is_none() {
                        return Err(BrokerProtocolError::NoProgress {
                            action,
                            body: truncate_for_display(&next.to_string(), 300),
                        }
                        .into());
                    }
                    next
                }
            };
        }

        Err(BrokerProtocolError::TooManySteps(self.settings.max_post_steps).into())
    }

    async fn skip_max_quiz(&self) -> Result<Value, BrokerLoginError> {
        tracing::info!("Skipping the Goskey setup offer");
        let (status, body) = self.identity.api_post("quiz-max/skip", &json!({})).await?;
        if status != 200 {
            return Err(BrokerProtocolError::SkipFailed {
                step: "MAX_QUIZ",
                status,
            }
            .into());
        }
        Ok(body)
    }

    async fn skip_password_change(&self) -> Result<Value, BrokerLoginError> {
        tracing::info!("Skipping the password change offer");
        let (status, body) = self
            .identity
            .api_post("change-password/skip", &json!({}))
            .await?;
        if status == 200 {
            return Ok(body);
        }
        tracing::debug!(status, "Password change skip refused, asking for the next step");
        Ok(self.identity.api_get("next-step").await?)
    }
}
