use serde::{Deserialize, Serialize};

use super::parse;

/// A file attached to an assignment, announcement or message.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(from = "RawAttachment")]
pub struct Attachment {
    /// Attachment id, used for downloading
    pub id: i64,
    /// File name
    pub name: String,
    /// Optional description
    pub description: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAttachment {
    #[serde(deserialize_with = "parse::lenient_i64")]
    id: i64,
    #[serde(default)]
    original_file_name: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

impl From<RawAttachment> for Attachment {
    fn from(raw: RawAttachment) -> Self {
        // Assignments carry the file name in `originalFileName`, mail in `name`.
        let name = raw
            .original_file_name
            .filter(|n| !n.is_empty())
            .or(raw.name)
            .unwrap_or_default();
        Self {
            id: raw.id,
            name,
            description: raw.description.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_assignment_style_name() {
        let a: Attachment = serde_json::from_value(
            json!({"id": 1, "originalFileName": "homework.pdf", "description": "ДЗ"}),
        )
        .unwrap();
        assert_eq!(a.name, "homework.pdf");
        assert_eq!(a.description, "ДЗ");
    }

    #[test]
    fn test_mail_style_name_and_missing_fields() {
        let a: Attachment =
            serde_json::from_value(json!({"id": 2, "name": "photo.jpg", "description": null}))
                .unwrap();
        assert_eq!(a.name, "photo.jpg");
        assert_eq!(a.description, "");

        let b: Attachment = serde_json::from_value(json!({"id": 3})).unwrap();
        assert_eq!(b.name, "");
    }
}
