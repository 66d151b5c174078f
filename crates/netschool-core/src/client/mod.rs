//! NetSchool SDK Client

#[allow(clippy::module_inception)]
mod client;
pub mod client_settings;
#[allow(missing_docs)]
pub mod internal;
mod keepalive;
pub mod login_method;
pub mod session;

pub(crate) use client::new_http_client_builder;
pub use client::Client;
pub use client_settings::ClientSettings;
pub use login_method::{LoginMethod, SchoolIdentifier};
pub use session::{AssignmentType, Session};
