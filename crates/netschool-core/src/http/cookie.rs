use std::time::{Duration, SystemTime};

use super::CookieError;

/// Represents an HTTP cookie as received in a `Set-Cookie` header.
///
/// A cookie without a `Domain` attribute is kept domainless: it is sent to every host the owning
/// HTTP identity talks to and is eligible for the session transfer between identities.
#[derive(Clone, Debug, PartialEq)]
pub struct Cookie {
    /// Cookie name
    pub name: String,
    /// Cookie value
    pub value: String,
    /// Cookie domain, without a leading dot
    pub domain: Option<String>,
    /// Cookie path
    pub path: Option<String>,
    /// Cookie expiration timestamp
    pub expires: Option<SystemTime>,
    /// Secure attribute (HTTPS-only)
    pub secure: bool,
    /// HttpOnly attribute (prevents JavaScript access)
    pub http_only: bool,
    /// SameSite attribute (CSRF protection)
    pub same_site: SameSite,
}

/// SameSite cookie attribute for cross-site request policy.
#[derive(Clone, Debug, PartialEq)]
pub enum SameSite {
    /// Cookie only sent to same-site requests
    Strict,
    /// Cookie sent to same-site and top-level navigation
    Lax,
    /// Cookie sent to all requests (requires Secure=true in most browsers)
    None,
}

impl Cookie {
    /// Creates a new domainless cookie.
    ///
    /// Defaults: path="/", same_site=Lax, secure=false, http_only=false, no expiration.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: None,
            path: Some("/".to_string()),
            expires: None,
            secure: false,
            http_only: false,
            same_site: SameSite::Lax,
        }
    }

    /// Parses the value of a single `Set-Cookie` header.
    ///
    /// Unknown attributes are ignored. `Max-Age` takes precedence over `Expires`; a non-positive
    /// `Max-Age` yields an already expired cookie, which stores treat as a deletion.
    pub fn parse_set_cookie(header: &str) -> Result<Self, CookieError> {
        let mut parts = header.split(';');
        let pair = parts.next().unwrap_or_default();
        let (name, value) = pair
            .split_once('=')
            .ok_or_else(|| CookieError::InvalidCookie(format!("missing '=' in {pair:?}")))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(CookieError::InvalidCookie("empty cookie name".to_string()));
        }

        let mut cookie = Cookie::new(name, value.trim().trim_matches('"'));
        let mut max_age: Option<i64> = None;

        for attribute in parts {
            let (key, val) = match attribute.split_once('=') {
                Some((k, v)) => (k.trim(), v.trim()),
                None => (attribute.trim(), ""),
            };
            match key.to_ascii_lowercase().as_str() {
                "domain" if !val.is_empty() => {
                    cookie.domain = Some(val.trim_start_matches('.').to_ascii_lowercase());
                }
                "path" if !val.is_empty() => cookie.path = Some(val.to_string()),
                "expires" => {
                    cookie.expires = chrono::DateTime::parse_from_rfc2822(val)
                        .ok()
                        .map(|dt| SystemTime::from(dt.with_timezone(&chrono::Utc)));
                }
                "max-age" => max_age = val.parse().ok(),
                "secure" => cookie.secure = true,
                "httponly" => cookie.http_only = true,
                "samesite" => {
                    cookie.same_site = match val.to_ascii_lowercase().as_str() {
                        "strict" => SameSite::Strict,
                        "none" => SameSite::None,
                        _ => SameSite::Lax,
                    }
                }
                _ => {}
            }
        }

        if let Some(seconds) = max_age {
            cookie.expires = Some(if seconds <= 0 {
                SystemTime::UNIX_EPOCH
            } else {
                SystemTime::now() + Duration::from_secs(seconds.unsigned_abs())
            });
        }

        Ok(cookie)
    }

    /// Returns true if the cookie has expired (past its expiration timestamp).
    pub fn is_expired(&self) -> bool {
        self.expires.is_some_and(|exp| SystemTime::now() > exp)
    }

    /// Returns true if the cookie should be sent to `host`.
    ///
    /// Domainless cookies match every host.
    pub fn matches_host(&self, host: &str) -> bool {
        match &self.domain {
            None => true,
            Some(domain) => {
                let host = host.to_ascii_lowercase();
                host == *domain || host.ends_with(&format!(".{domain}"))
            }
        }
    }

    /// Validates cookie security attributes.
    ///
    /// Missing recommended attributes are only reported at debug level, server cookies are stored
    /// as received. Returns SecurityViolation error for `__Host-` prefix violations (RFC 6265bis).
    pub fn validate_security_attributes(&self) -> Result<(), CookieError> {
        if !self.http_only || !self.secure {
            tracing::debug!(
                cookie_name = %self.name,
                http_only = self.http_only,
                secure = self.secure,
                "Cookie stored without recommended security attributes"
            );
        }

        if self.name.starts_with("__Host-") {
            if self.path.as_deref() != Some("/") {
                return Err(CookieError::SecurityViolation(format!(
                    "Cookie with __Host- prefix must have path=/ (got {:?})",
                    self.path
                )));
            }
            if self.domain.is_some() {
                return Err(CookieError::SecurityViolation(
                    "__Host- prefix cookies cannot specify domain attribute".to_string(),
                ));
            }
            if !self.secure {
                return Err(CookieError::SecurityViolation(
                    "__Host- prefix cookies must have Secure=true".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Formats cookie as "name=value" for HTTP Cookie header injection.
    pub fn to_cookie_header(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}
