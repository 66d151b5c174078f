/// Errors that can occur during cookie storage operations.
#[derive(Debug, thiserror::Error)]
pub enum CookieError {
    /// Cookie storage backend operation failed
    #[error("Cookie storage operation failed: {0}")]
    StorageFailure(String),

    /// Cookie has invalid format or attributes
    #[error("Invalid cookie format or attributes: {0}")]
    InvalidCookie(String),

    /// Cookie not found by name
    #[error("Cookie not found: {name}")]
    NotFound {
        /// Name of the cookie that was not found
        name: String,
    },

    /// Cookie violates security policy (e.g. a `__Host-` cookie carrying a domain)
    #[error("Cookie security policy violation: {0}")]
    SecurityViolation(String),
}
