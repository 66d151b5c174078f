//! How the current session was obtained.

use std::fmt;

/// Identifies the school on a portal, either by id or by a name to search for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SchoolIdentifier {
    /// Numeric school id
    Id(i64),
    /// Name, resolved through the school search
    Name(String),
}

impl From<i64> for SchoolIdentifier {
    fn from(id: i64) -> Self {
        SchoolIdentifier::Id(id)
    }
}

impl From<&str> for SchoolIdentifier {
    fn from(name: &str) -> Self {
        match name.trim().parse() {
            Ok(id) => SchoolIdentifier::Id(id),
            Err(_) => SchoolIdentifier::Name(name.to_owned()),
        }
    }
}

impl From<String> for SchoolIdentifier {
    fn from(name: String) -> Self {
        SchoolIdentifier::from(name.as_str())
    }
}

/// The login procedure that produced the current session.
#[derive(Clone)]
pub enum LoginMethod {
    /// Portal user name and password. These are retained for transparent re-login.
    Credentials {
        /// Portal user name
        user_name: String,
        /// Portal password
        password: String,
        /// School the user belongs to
        school: SchoolIdentifier,
    },
    /// An access token copied from a browser.
    Token,
    /// A browser `session-store` value.
    SessionStore,
    /// Browser cookies.
    Cookies,
    /// Federated login through the identity broker.
    Broker,
    /// A previously exported session.
    Imported,
}

impl LoginMethod {
    /// Whether a 401 can be recovered by logging in again.
    pub fn can_relogin(&self) -> bool {
        matches!(self, LoginMethod::Credentials { .. })
    }
}

impl fmt::Debug for LoginMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoginMethod::Credentials {
                user_name, school, ..
            } => f
                .debug_struct("Credentials")
                .field("user_name", user_name)
                .field("school", school)
                .finish_non_exhaustive(),
            LoginMethod::Token => f.write_str("Token"),
            LoginMethod::SessionStore => f.write_str("SessionStore"),
            LoginMethod::Cookies => f.write_str("Cookies"),
            LoginMethod::Broker => f.write_str("Broker"),
            LoginMethod::Imported => f.write_str("Imported"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_school_identifier_from_numeric_string() {
        assert_eq!(SchoolIdentifier::from("1234"), SchoolIdentifier::Id(1234));
        assert_eq!(
            SchoolIdentifier::from("МБОУ СОШ №1"),
            SchoolIdentifier::Name("МБОУ СОШ №1".to_string())
        );
    }

    #[test]
    fn test_debug_hides_password() {
        let method = LoginMethod::Credentials {
            user_name: "ivanov".to_string(),
            password: "hunter2".to_string(),
            school: SchoolIdentifier::Id(1),
        };
        let rendered = format!("{method:?}");
        assert!(rendered.contains("ivanov"));
        assert!(!rendered.contains("hunter2"));
    }
}
