use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{parse, Attachment};

/// Author of an announcement.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Author {
    /// User id
    pub id: i64,
    /// Full name
    #[serde(rename = "fio", default, deserialize_with = "parse::null_as_default")]
    pub full_name: String,
    /// Nickname
    #[serde(rename = "nickName", default, deserialize_with = "parse::null_as_default")]
    pub nickname: String,
}

/// A school announcement.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    /// Title
    pub name: String,
    /// Who posted it
    pub author: Author,
    /// Body text
    #[serde(
        rename = "description",
        default,
        deserialize_with = "parse::null_as_default"
    )]
    pub content: String,
    /// When it was posted
    #[serde(deserialize_with = "parse::datetime")]
    pub post_date: NaiveDateTime,
    /// Attached files
    #[serde(default, deserialize_with = "parse::null_as_default")]
    pub attachments: Vec<Attachment>,
}
