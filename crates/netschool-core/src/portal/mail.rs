use reqwest::Method;
use serde_json::json;

use super::{PortalClient, PortalError};
use crate::{
    models::{MailFolder, MailPage, MailRecipient, Message},
    ApiError,
};

impl PortalClient {
    /// A page of a mail folder, newest first. Pages start at 1.
    pub async fn mail_list(
        &self,
        folder: MailFolder,
        page: u32,
        page_size: u32,
    ) -> Result<MailPage, PortalError> {
        let body = json!({
            "filterContext": {
                "selectedData": [
                    {
                        "filterId": "MailBox",
                        "filterValue": folder.as_str(),
                        "filterText": folder.label(),
                    },
                    {
                        "filterId": "MessageType",
                        "filterValue": "All",
                        "filterText": "Все",
                    },
                ],
                "params": null,
            },
            "fields": ["author", "subject", "sent"],
            "page": page,
            "pageSize": page_size,
            "search": null,
            "order": {"fieldId": "sent", "ascending": false},
        });

        let response = self
            .authed(|http, _| Ok(http.request(Method::POST, "mail/registry")?.json(&body)))
            .await?;
        Ok(response.json().await.map_err(ApiError::from)?)
    }

    /// Ids of unread messages.
    pub async fn mail_unread(&self) -> Result<Vec<i64>, PortalError> {
        let response = self
            .authed(|http, session| {
                Ok(http
                    .request(Method::GET, "mail/messages/unread")?
                    .query(&[("userId", session.student_id)]))
            })
            .await?;
        Ok(response.json().await.map_err(ApiError::from)?)
    }

    /// Reads a message, marking it as read.
    pub async fn mail_read(&self, message_id: i64) -> Result<Message, PortalError> {
        let path = format!("mail/messages/{message_id}/read");
        let response = self
            .authed(|http, session| {
                Ok(http
                    .request(Method::GET, &path)?
                    .query(&[("userId", session.student_id)]))
            })
            .await?;
        Ok(response.json().await.map_err(ApiError::from)?)
    }

    /// People mail can be sent to: teachers and administration.
    pub async fn mail_recipients(&self) -> Result<Vec<MailRecipient>, PortalError> {
        let response = self
            .authed(|http, session| {
                Ok(http.request(Method::GET, "mail/recipients")?.query(&[
                    ("userId", session.student_id),
                    ("organizationId", session.school_id),
                    ("funcType", 2),
                    ("orgType", 1),
                    ("group", 1),
                ]))
            })
            .await?;
        Ok(response.json().await.map_err(ApiError::from)?)
    }

    /// Sends a message to recipient ids from [PortalClient::mail_recipients].
    pub async fn mail_send(
        &self,
        subject: &str,
        text: &str,
        to: &[String],
    ) -> Result<(), PortalError> {
        let body = json!({
            "subject": subject,
            "text": text,
            "to": to.iter().map(|id| json!({ "id": id })).collect::<Vec<_>>(),
            "cc": [],
            "bcc": [],
            "notify": false,
            "fileAttachments": [],
        });
        self.authed(|http, _| Ok(http.request(Method::POST, "mail/messages/send")?.json(&body)))
            .await?;
        Ok(())
    }
}
