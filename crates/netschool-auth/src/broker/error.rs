use thiserror::Error;

use crate::prompt::PromptError;

/// The broker refused the login itself.
#[derive(Debug, Error)]
pub enum BrokerRejection {
    /// Login or password was empty.
    #[error("Login and password must not be empty")]
    EmptyCredentials,
    /// Wrong password.
    #[error("Invalid password")]
    InvalidPassword,
    /// Unknown login.
    #[error("Invalid login")]
    InvalidLogin,
    /// The account is locked.
    #[error("Account locked")]
    AccountLocked,
    /// No such account.
    #[error("Account not found")]
    AccountNotFound,
    /// Too many attempts, the broker wants a captcha solved in a browser.
    #[error("Captcha required after too many attempts")]
    CaptchaRequired,
    /// Any other rejection code, verbatim.
    #[error("Login rejected by the broker: {0}")]
    Other(String),
    /// The portal did not accept the login the broker vouched for.
    #[error("The portal rejected the broker login: {0}")]
    Portal(String),
}

impl BrokerRejection {
    /// Maps a `failed` code of the login API.
    pub fn from_code(code: &str) -> Self {
        match code {
            "INVALID_PASSWORD" => Self::InvalidPassword,
            "INVALID_LOGIN" => Self::InvalidLogin,
            "ACCOUNT_LOCKED" => Self::AccountLocked,
            "ACCOUNT_NOT_FOUND" => Self::AccountNotFound,
            "CAPTCHA_REQUIRED" => Self::CaptchaRequired,
            other => Self::Other(other.to_owned()),
        }
    }
}

/// The broker behaved in a way the login flow does not know how to handle.
///
/// Never retried.
#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum BrokerProtocolError {
    #[error("Could not reach the broker login page, the redirects ended at {0}")]
    BrokerUnreachable(String),
    #[error("Unexpected broker response: {0}")]
    UnexpectedResponse(String),
    #[error("The broker finished the login without a redirect URL")]
    DoneWithoutRedirect,
    #[error("Gave up after {0} broker steps")]
    TooManySteps(usize),
    #[error("The broker keeps asking for step {action}: {body}")]
    NoProgress { action: String, body: String },
    #[error("The broker requires setting up a Goskey confirmation (MAX_QUIZ) and does not allow skipping it, set it up in the Gosuslugi profile")]
    MaxQuizNotSkippable,
    #[error("Could not skip broker step {step}: HTTP {status}")]
    SkipFailed { step: &'static str, status: u16 },
    #[error("The callback did not carry a loginState")]
    MissingLoginState,
    #[error("Account info request failed: {status} {body}")]
    AccountInfo { status: u16, body: String },
    #[error("QR code generation failed: {status} {body}")]
    QrGeneration { status: u16, body: String },
    #[error("The broker returned no QR data: {0}")]
    MissingQrData(String),
}

/// The second factor could not be completed.
#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum MultiFactorError {
    #[error("Unknown second factor type {0}")]
    UnknownType(String),
    #[error("A confirmation code is required but no code provider was configured")]
    NoProofProvider,
    #[error("No confirmation code was entered")]
    EmptyCode,
    #[error(transparent)]
    Prompt(#[from] PromptError),
    #[error("Wrong confirmation code: {code}{}", .attempts_left.map(|n| format!(" ({n} attempts left)")).unwrap_or_default())]
    Rejected {
        code: String,
        attempts_left: Option<i64>,
    },
    #[error("No verification endpoint accepted the code, tried {0:?}")]
    VerifyEndpointNotFound(Vec<String>),
    #[error("Code verification failed: {status} {body}")]
    VerifyFailed { status: u16, body: String },
    #[error("Security check verification failed: {status} {body}")]
    AnomalyVerifyFailed { status: u16, body: String },
    #[error("Push confirmation declined: {0}")]
    PushRejected(String),
    #[error("No push confirmation within {0:?}")]
    PushTimeout(std::time::Duration),
}

/// No organization could be selected.
#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum OrganizationError {
    #[error("No portal accounts are linked to this Gosuslugi account, link them in the portal first")]
    NoLinkedAccounts,
    #[error("Organization {hint:?} not found. Available: {}", .available.join(", "))]
    NotFound {
        hint: String,
        available: Vec<String>,
    },
    #[error("Organization {hint:?} is ambiguous, it matches: {}", .matches.join(", "))]
    Ambiguous { hint: String, matches: Vec<String> },
    #[error("Several organizations are linked, choose one of: {}", .available.join(", "))]
    SelectionRequired { available: Vec<String> },
    #[error("Choice {0} is out of range")]
    InvalidChoice(usize),
    #[error(transparent)]
    Prompt(#[from] PromptError),
}
