use serde::{Deserialize, Serialize};

/// Login options advertised by a portal's `logindata` endpoint.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(from = "RawLoginMethods")]
pub struct LoginMethods {
    /// Portal version, e.g. `5.47.0`
    pub version: String,
    /// Product name
    pub product_name: String,
    /// Portal user name and password are accepted
    pub password: bool,
    /// Login through the identity broker is available
    pub esia: bool,
    /// The identity broker is the primary way in
    pub esia_main: bool,
    /// The login page shows the identity broker button
    pub esia_button: bool,
    /// Human readable summary of the above
    pub summary: String,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct RawLoginMethods {
    version: Option<String>,
    product_name: Option<String>,
    school_login: Option<bool>,
    esia_login: Option<bool>,
    esia_main_auth: Option<bool>,
    esia_button: Option<bool>,
}

impl From<RawLoginMethods> for LoginMethods {
    fn from(raw: RawLoginMethods) -> Self {
        let esia_main = raw.esia_main_auth.unwrap_or(false);
        let esia_button = raw.esia_button.unwrap_or(false);
        let esia = raw.esia_login.unwrap_or(false) || esia_main || esia_button;
        let password = raw.school_login.unwrap_or(!esia_main);

        let summary = match (password, esia, esia_main) {
            (_, true, true) => "Госуслуги (основной способ)",
            (true, true, false) => "логин/пароль + Госуслуги",
            (true, false, _) => "логин/пароль",
            (false, true, false) => "Госуслуги",
            (false, false, _) => "нет доступных способов",
        };

        Self {
            version: raw.version.unwrap_or_default(),
            product_name: raw.product_name.unwrap_or_default(),
            password,
            esia,
            esia_main,
            esia_button,
            summary: summary.to_string(),
        }
    }
}
