//! HTTP plumbing shared by the portal client and the broker identity: a cookie jar kept in sync
//! through middleware, and the portal session wrapper with its retry and timeout policy.

/// Cookie data model and parsing.
pub mod cookie;
/// Cookie error types.
pub mod cookie_error;
/// Cookie middleware for reqwest.
pub mod cookie_middleware;
/// Cookie storage abstraction.
pub mod cookie_store;
/// In-memory cookie storage.
pub mod in_memory_cookie_store;
mod session;

pub use cookie::{Cookie, SameSite};
pub use cookie_error::CookieError;
pub use cookie_middleware::CookieJarMiddleware;
pub use cookie_store::CookieStore;
pub use in_memory_cookie_store::InMemoryCookieStore;
pub use session::{check_status, HttpSession};
