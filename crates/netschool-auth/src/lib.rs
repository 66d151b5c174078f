//! Federated login to the NetSchool portal through the ESIA identity broker ("Gosuslugi").
//!
//! ```no_run
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! use netschool_auth::{BrokerAuthClientExt, BrokerPasswordRequest};
//! use netschool_core::Client;
//!
//! let client = Client::for_url("https://sgo.example.ru")?;
//! client
//!     .broker_auth()
//!     .login_password(&BrokerPasswordRequest {
//!         login: "+79990000000".to_string(),
//!         password: "secret".to_string(),
//!         organization: Some("Лицей".to_string()),
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod broker_client;
pub mod broker;
mod error;
mod login_via_broker;
pub mod prompt;

pub use broker::BrokerSettings;
pub use broker_client::{BrokerAuthClient, BrokerAuthClientExt};
pub use error::BrokerLoginError;
pub use login_via_broker::{BrokerPasswordRequest, BrokerQrRequest};
