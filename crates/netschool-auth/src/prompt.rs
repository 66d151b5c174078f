//! Collaborators the login flows call into when they need something from the user: a
//! confirmation code, a choice between organizations, or showing a QR code.

use std::time::Duration;

use thiserror::Error;

/// A collaborator could not produce a value.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct PromptError(pub String);

/// Where a confirmation code comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProofKind {
    /// Code sent by SMS
    Sms,
    /// Code from an authenticator app
    Totp,
    /// Code sent to the "Max" messenger
    MaxApp,
    /// Code confirming a login the broker considered unusual
    AnomalyCheck,
}

/// What the broker asks to confirm.
#[derive(Debug, Clone, PartialEq)]
pub struct ProofRequest {
    /// Kind of code
    pub kind: ProofKind,
    /// Masked phone number the code was sent to, if any
    pub destination: Option<String>,
    /// Expected number of digits
    pub code_length: u32,
    /// Attempts left before the broker blocks verification
    pub attempts_left: Option<u32>,
    /// How long the code stays valid
    pub valid_for: Option<Duration>,
}

impl ProofRequest {
    /// A prompt line for humans.
    pub fn message(&self) -> String {
        match self.kind {
            ProofKind::Sms => format!(
                "Enter the {}-digit code sent by SMS to {}",
                self.code_length,
                self.destination.as_deref().unwrap_or("***")
            ),
            ProofKind::Totp => format!(
                "Enter the {}-digit code from your authenticator app",
                self.code_length
            ),
            ProofKind::MaxApp => format!(
                "Enter the {}-digit code sent to the Max app",
                self.code_length
            ),
            ProofKind::AnomalyCheck => format!(
                "Security check: enter the {}-digit code sent to {}",
                self.code_length,
                self.destination.as_deref().unwrap_or("***")
            ),
        }
    }
}

/// Supplies confirmation codes.
#[async_trait::async_trait]
pub trait ProofProvider: Send + Sync {
    /// Returns the code for `request`.
    async fn proof(&self, request: &ProofRequest) -> Result<String, PromptError>;
}

/// A code known in advance.
#[derive(Clone)]
pub struct FixedProof(pub String);

#[async_trait::async_trait]
impl ProofProvider for FixedProof {
    async fn proof(&self, _request: &ProofRequest) -> Result<String, PromptError> {
        Ok(self.0.clone())
    }
}

/// Picks one option out of several.
#[async_trait::async_trait]
pub trait ChoicePrompt: Send + Sync {
    /// Returns the index of the chosen entry of `options`.
    async fn choose(&self, message: &str, options: &[String]) -> Result<usize, PromptError>;
}

/// Shows the deep link of a QR login to the user, usually as a QR code.
///
/// Called once per generated QR code. Plain functions taking the link implement it too.
#[async_trait::async_trait]
pub trait QrDisplay: Send + Sync {
    /// Presents `deep_link`.
    async fn show(&self, deep_link: &str) -> Result<(), PromptError>;
}

#[async_trait::async_trait]
impl<F> QrDisplay for F
where
    F: Fn(&str) + Send + Sync,
{
    async fn show(&self, deep_link: &str) -> Result<(), PromptError> {
        self(deep_link);
        Ok(())
    }
}

/// Logs the deep link. Used when the caller supplies no display.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogQrDisplay;

#[async_trait::async_trait]
impl QrDisplay for LogQrDisplay {
    async fn show(&self, deep_link: &str) -> Result<(), PromptError> {
        tracing::info!(
            deep_link = %netschool_core::truncate_for_display(deep_link, 80),
            "Scan the QR code with the Gosuslugi app"
        );
        Ok(())
    }
}
