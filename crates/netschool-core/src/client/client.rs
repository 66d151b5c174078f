use std::sync::Arc;

use super::internal::InternalClient;
use crate::{http::HttpSession, ApiError, ClientSettings};

/// The main struct to interact with a NetSchool portal.
#[derive(Debug, Clone)]
pub struct Client {
    // Cloning must hand out a reference to the same instance, so all mutable state lives behind
    // the Arc in [`InternalClient`].
    #[doc(hidden)]
    pub internal: Arc<InternalClient>,
}

impl Client {
    /// Create a new client for the portal described by `settings`.
    pub fn new(settings: ClientSettings) -> Result<Self, ApiError> {
        let http = HttpSession::new(&settings)?;
        Ok(Self {
            internal: Arc::new(InternalClient::new(settings, http)),
        })
    }

    /// Create a new client for the portal at `base_url` with default settings.
    pub fn for_url(base_url: impl Into<String>) -> Result<Self, ApiError> {
        Self::new(ClientSettings::for_url(base_url))
    }
}

pub(crate) fn new_http_client_builder() -> reqwest::ClientBuilder {
    use rustls::ClientConfig;
    use rustls_platform_verifier::ConfigVerifierExt;

    reqwest::Client::builder()
        .use_preconfigured_tls(
            ClientConfig::with_platform_verifier().expect("Failed to create platform verifier"),
        )
        .redirect(reqwest::redirect::Policy::none())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_base_url() {
        assert!(matches!(
            Client::for_url("not a url"),
            Err(ApiError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_new_client_is_not_authenticated() {
        let client = Client::for_url("https://sgo.example.ru/").unwrap();
        assert!(client.internal.authenticated_session().is_err());
        assert_eq!(
            client.internal.http().api_url("student/diary").unwrap().as_str(),
            "https://sgo.example.ru/webapi/student/diary"
        );
    }
}
