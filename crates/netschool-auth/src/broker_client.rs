use std::sync::Arc;

use netschool_core::{ApiError, Client};
use url::Url;

use crate::{
    broker::{BrokerSettings, EventSubscriber, TlsEventSubscriber},
    login_via_broker::{
        crosslogin_url, login_via_broker_password, login_via_broker_qr, BrokerPasswordRequest,
        BrokerQrRequest,
    },
    prompt::{ChoicePrompt, LogQrDisplay, ProofProvider, QrDisplay},
    BrokerLoginError,
};

/// Subclient for logging in to the portal through the ESIA identity broker.
///
/// Collaborators are optional. Without a [`ProofProvider`] a second factor fails the login,
/// without a [`ChoicePrompt`] an account linked to several organizations needs an organization
/// hint, and without a [`QrDisplay`] the QR deep link is logged.
#[derive(Clone)]
pub struct BrokerAuthClient {
    pub(crate) client: Client,
    pub(crate) settings: BrokerSettings,
    pub(crate) proof: Option<Arc<dyn ProofProvider>>,
    pub(crate) choice: Option<Arc<dyn ChoicePrompt>>,
    pub(crate) qr_display: Arc<dyn QrDisplay>,
    pub(crate) subscriber: Option<Arc<dyn EventSubscriber>>,
}

impl BrokerAuthClient {
    /// Constructs a new `BrokerAuthClient` with default settings.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            settings: BrokerSettings::default(),
            proof: None,
            choice: None,
            qr_display: Arc::new(LogQrDisplay),
            subscriber: None,
        }
    }

    /// Replaces the broker settings.
    pub fn with_settings(mut self, settings: BrokerSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets where confirmation codes come from.
    pub fn with_proof_provider(mut self, proof: Arc<dyn ProofProvider>) -> Self {
        self.proof = Some(proof);
        self
    }

    /// Sets who chooses between several linked organizations.
    pub fn with_choice_prompt(mut self, choice: Arc<dyn ChoicePrompt>) -> Self {
        self.choice = Some(choice);
        self
    }

    /// Sets how QR codes are shown.
    pub fn with_qr_display(mut self, display: Arc<dyn QrDisplay>) -> Self {
        self.qr_display = display;
        self
    }

    /// Replaces the raw TLS event stream listener used to wait for QR scans.
    pub fn with_event_subscriber(mut self, subscriber: Arc<dyn EventSubscriber>) -> Self {
        self.subscriber = Some(subscriber);
        self
    }

    /// The settings in use.
    pub fn settings(&self) -> &BrokerSettings {
        &self.settings
    }

    /// Logs in with the Gosuslugi login and password.
    pub async fn login_password(&self, input: &BrokerPasswordRequest) -> Result<(), BrokerLoginError> {
        login_via_broker_password(self, input).await
    }

    /// Logs in by scanning a QR code with the Gosuslugi app. Returns the signed token of the
    /// QR code that was scanned.
    pub async fn login_qr(&self, input: &BrokerQrRequest) -> Result<String, BrokerLoginError> {
        login_via_broker_qr(self, input).await
    }

    /// The portal URL a browser opens to start a broker login.
    pub fn crosslogin_url(&self) -> Result<Url, BrokerLoginError> {
        crosslogin_url(self.client.internal.http())
    }

    pub(crate) fn event_subscriber(&self) -> Result<Arc<dyn EventSubscriber>, BrokerLoginError> {
        match &self.subscriber {
            Some(subscriber) => Ok(subscriber.clone()),
            None => {
                let subscriber = TlsEventSubscriber::new(&self.settings)
                    .map_err(|e| ApiError::from(std::io::Error::other(e)))?;
                Ok(Arc::new(subscriber))
            }
        }
    }
}

/// Extension trait for `Client` to provide access to the `BrokerAuthClient`.
pub trait BrokerAuthClientExt {
    /// Creates a new `BrokerAuthClient` instance.
    fn broker_auth(&self) -> BrokerAuthClient;
}

impl BrokerAuthClientExt for Client {
    fn broker_auth(&self) -> BrokerAuthClient {
        BrokerAuthClient::new(self.clone())
    }
}
