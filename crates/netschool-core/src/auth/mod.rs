//! Authentication module
//!
//! Portal-side login procedures, the shared post-login initialization and session
//! export/import. Every procedure builds a complete [Session](crate::client::Session) first and
//! installs it only on success.

#[allow(missing_docs)]
pub mod auth_client;
mod init;
#[allow(missing_docs)]
pub mod login;
mod session_export;

pub use auth_client::AuthClient;
pub use login::{LoginError, PasswordLoginRequest, TransferredSession};
pub use session_export::{ExportedSession, SESSION_FORMAT_VERSION};
