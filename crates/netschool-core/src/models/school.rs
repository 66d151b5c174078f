use serde::{Deserialize, Serialize};

use super::parse;

/// A school as listed by the school search.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShortSchool {
    /// Full name, usually followed by the town in parentheses
    pub name: String,
    /// School id
    pub id: i64,
    /// Short name
    #[serde(default, deserialize_with = "parse::null_as_default")]
    pub short_name: String,
    /// Postal address
    #[serde(
        rename = "addressString",
        default,
        deserialize_with = "parse::null_as_default"
    )]
    pub address: String,
}

/// The school card, flattened from `commonInfo`, `contactInfo` and `managementInfo`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(from = "RawSchool")]
pub struct School {
    /// Full name
    pub name: String,
    /// Free-form description
    pub about: String,
    /// Juridical address, or the postal one
    pub address: String,
    /// Contact e-mail
    pub email: String,
    /// Web site
    pub site: String,
    /// Phone numbers
    pub phone: String,
    /// Director
    pub director: String,
    /// Deputy for administration and maintenance
    pub ahc: String,
    /// Head of IT
    pub it_head: String,
    /// Deputy for education
    pub uvr: String,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct RawSchool {
    common_info: RawCommonInfo,
    contact_info: RawContactInfo,
    management_info: RawManagementInfo,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct RawCommonInfo {
    full_school_name: Option<String>,
    about: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct RawContactInfo {
    juridical_address: Option<String>,
    post_address: Option<String>,
    email: Option<String>,
    web: Option<String>,
    phones: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct RawManagementInfo {
    director: Option<String>,
    #[serde(rename = "principalAHC")]
    principal_ahc: Option<String>,
    #[serde(rename = "principalIT")]
    principal_it: Option<String>,
    #[serde(rename = "principalUVR")]
    principal_uvr: Option<String>,
}

impl From<RawSchool> for School {
    fn from(raw: RawSchool) -> Self {
        let contact = raw.contact_info;
        let address = contact
            .juridical_address
            .filter(|a| !a.is_empty())
            .or(contact.post_address)
            .unwrap_or_default();

        Self {
            name: raw.common_info.full_school_name.unwrap_or_default(),
            about: raw.common_info.about.unwrap_or_default(),
            address,
            email: contact.email.unwrap_or_default(),
            site: contact.web.unwrap_or_default(),
            phone: contact.phones.unwrap_or_default(),
            director: raw.management_info.director.unwrap_or_default(),
            ahc: raw.management_info.principal_ahc.unwrap_or_default(),
            it_head: raw.management_info.principal_it.unwrap_or_default(),
            uvr: raw.management_info.principal_uvr.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_short_school() {
        let s: ShortSchool = serde_json::from_value(json!({
            "id": 42,
            "name": "МБОУ СОШ №1 (г. Саранск)",
            "shortName": "СОШ №1",
            "addressString": null,
        }))
        .unwrap();
        assert_eq!(s.id, 42);
        assert_eq!(s.short_name, "СОШ №1");
        assert_eq!(s.address, "");
    }

    #[test]
    fn test_school_card_flattening() {
        let s: School = serde_json::from_value(json!({
            "commonInfo": {"fullSchoolName": "Лицей №7", "about": "Хорошая школа"},
            "contactInfo": {
                "juridicalAddress": "",
                "postAddress": "ул. Ленина, 1",
                "email": "school@example.ru",
                "web": "https://school.example.ru",
                "phones": "+7 000",
            },
            "managementInfo": {"director": "Петров П.П.", "principalIT": "Сидоров С.С."},
        }))
        .unwrap();

        assert_eq!(s.name, "Лицей №7");
        assert_eq!(s.address, "ул. Ленина, 1");
        assert_eq!(s.it_head, "Сидоров С.С.");
        assert_eq!(s.uvr, "");
    }

    #[test]
    fn test_school_card_empty() {
        let s: School = serde_json::from_value(json!({})).unwrap();
        assert_eq!(s, School::default());
    }
}
