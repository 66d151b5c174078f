use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{parse, Attachment};

/// Mail folders of the internal mail.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MailFolder {
    /// Received messages
    #[default]
    Inbox,
    /// Sent messages
    Sent,
    /// Drafts
    Draft,
    /// Deleted messages
    Deleted,
}

impl MailFolder {
    /// The filter value the registry expects.
    pub fn as_str(&self) -> &'static str {
        match self {
            MailFolder::Inbox => "Inbox",
            MailFolder::Sent => "Sent",
            MailFolder::Draft => "Draft",
            MailFolder::Deleted => "Deleted",
        }
    }

    /// The label the portal UI shows for the folder.
    pub fn label(&self) -> &'static str {
        match self {
            MailFolder::Inbox => "Входящие",
            MailFolder::Sent => "Отправленные",
            MailFolder::Draft => "Черновики",
            MailFolder::Deleted => "Удалённые",
        }
    }
}

impl fmt::Display for MailFolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row of the mail registry.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MailEntry {
    /// Message id
    #[serde(deserialize_with = "parse::lenient_i64")]
    pub id: i64,
    /// Subject
    #[serde(default, deserialize_with = "parse::null_as_default")]
    pub subject: String,
    /// Sender display name
    #[serde(default, deserialize_with = "parse::null_as_default")]
    pub author: String,
    /// When it was sent
    #[serde(deserialize_with = "parse::datetime")]
    pub sent: NaiveDateTime,
    /// Recipients as text
    #[serde(default)]
    pub to_names: Option<String>,
}

/// A page of the mail registry.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MailPage {
    /// Rows on this page
    #[serde(rename = "rows", default, deserialize_with = "parse::null_as_default")]
    pub entries: Vec<MailEntry>,
    /// Page number, starting at 1
    #[serde(default = "first_page")]
    pub page: i64,
    /// Number of messages in the folder
    #[serde(default)]
    pub total_items: i64,
}

fn first_page() -> i64 {
    1
}

/// Someone mail can be sent to.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MailRecipient {
    /// Opaque (base64) recipient id
    #[serde(default, deserialize_with = "parse::null_as_default")]
    pub id: String,
    /// Display name
    #[serde(default, deserialize_with = "parse::null_as_default")]
    pub name: String,
    /// Organization of the recipient
    #[serde(default, deserialize_with = "parse::null_as_default")]
    pub organization_name: String,
}

/// A full message of the internal mail.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(from = "RawMessage")]
pub struct Message {
    /// Message id
    pub id: i64,
    /// Subject
    pub subject: String,
    /// Body (HTML)
    pub text: String,
    /// When it was sent
    pub sent: NaiveDateTime,
    /// Sender id
    pub author_id: i64,
    /// Sender name
    pub author_name: String,
    /// Recipients as text
    pub to_names: String,
    /// Whether the message was read
    pub is_read: bool,
    /// Folder, e.g. `Inbox`
    pub mailbox: String,
    /// Whether replying is allowed
    pub can_reply: bool,
    /// Whether forwarding is allowed
    pub can_forward: bool,
    /// Attached files
    pub file_attachments: Vec<Attachment>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMessage {
    id: i64,
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(deserialize_with = "parse::datetime")]
    sent: NaiveDateTime,
    #[serde(default)]
    author: Option<RawMessageAuthor>,
    #[serde(default)]
    to_names: Option<String>,
    #[serde(default)]
    read: Option<bool>,
    #[serde(default)]
    mail_box: Option<String>,
    #[serde(default)]
    can_reply_all: Option<bool>,
    #[serde(default)]
    no_reply: Option<bool>,
    #[serde(default)]
    can_forward: Option<bool>,
    #[serde(default, deserialize_with = "parse::null_as_default")]
    file_attachments: Vec<Attachment>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawMessageAuthor {
    id: Option<i64>,
    name: Option<String>,
}

impl From<RawMessage> for Message {
    fn from(raw: RawMessage) -> Self {
        let author = raw.author.unwrap_or_default();
        Self {
            id: raw.id,
            subject: raw.subject.unwrap_or_default(),
            text: raw.text.unwrap_or_default(),
            sent: raw.sent,
            author_id: author.id.unwrap_or(0),
            author_name: author.name.unwrap_or_default(),
            to_names: raw.to_names.unwrap_or_default(),
            is_read: raw.read.unwrap_or(false),
            mailbox: raw.mail_box.unwrap_or_else(|| "Inbox".to_string()),
            can_reply: raw.can_reply_all.unwrap_or(false) || !raw.no_reply.unwrap_or(true),
            can_forward: raw.can_forward.unwrap_or(false),
            file_attachments: raw.file_attachments,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_mail_page_with_string_ids() {
        let page: MailPage = serde_json::from_value(json!({
            "rows": [
                {"id": "15", "subject": "Привет", "author": "Учитель", "sent": "2024-10-01T08:00:00.5"},
                {"id": 16, "sent": "2024-10-02T09:00:00", "toNames": "Иванов"},
            ],
            "totalItems": 40,
        }))
        .unwrap();

        assert_eq!(page.entries.len(), 2);
        assert_eq!(page.entries[0].id, 15);
        assert_eq!(page.entries[1].to_names.as_deref(), Some("Иванов"));
        assert_eq!(page.page, 1);
        assert_eq!(page.total_items, 40);
    }

    #[test]
    fn test_message_reply_flags() {
        let msg: Message = serde_json::from_value(json!({
            "id": 5,
            "subject": "Тема",
            "text": "<p>текст</p>",
            "sent": "2024-10-01T08:00:00",
            "author": {"id": 9, "name": "Учитель"},
            "read": true,
            "noReply": false,
            "fileAttachments": [{"id": 1, "name": "a.txt"}],
        }))
        .unwrap();

        assert_eq!(msg.author_name, "Учитель");
        assert!(msg.is_read);
        assert!(msg.can_reply);
        assert!(!msg.can_forward);
        assert_eq!(msg.mailbox, "Inbox");
        assert_eq!(msg.file_attachments[0].name, "a.txt");
    }

    #[test]
    fn test_message_defaults() {
        let msg: Message =
            serde_json::from_value(json!({"id": 6, "sent": "2024-10-01T08:00:00"})).unwrap();
        assert!(!msg.can_reply);
        assert_eq!(msg.author_id, 0);
    }

    #[test]
    fn test_recipient_null_organization() {
        let r: MailRecipient = serde_json::from_value(
            json!({"id": "MTIz", "name": "Директор", "organizationName": null}),
        )
        .unwrap();
        assert_eq!(r.organization_name, "");
    }
}
