use reqwest::{header, Method};
use serde::Deserialize;

use super::{PortalClient, PortalError};
use crate::{models::Attachment, ApiError};

const MAX_PICTURE_REDIRECTS: usize = 10;

#[derive(Deserialize)]
struct AssignmentAttachments {
    #[serde(default)]
    attachments: Vec<Attachment>,
}

impl PortalClient {
    /// Files attached to an assignment.
    pub async fn attachments(&self, assignment_id: i64) -> Result<Vec<Attachment>, PortalError> {
        let response = self
            .authed(|http, session| {
                Ok(http
                    .request(Method::POST, "student/diary/get-attachments")?
                    .query(&[("studentId", session.student_id)])
                    .json(&serde_json::json!({ "assignId": [assignment_id] })))
            })
            .await?;

        let items: Vec<AssignmentAttachments> =
            response.json().await.map_err(ApiError::from)?;
        Ok(items
            .into_iter()
            .next()
            .map(|item| item.attachments)
            .unwrap_or_default())
    }

    /// Downloads an attachment.
    pub async fn download_attachment(&self, attachment_id: i64) -> Result<Vec<u8>, PortalError> {
        let path = format!("attachments/{attachment_id}");
        let response = self
            .authed(|http, _| http.request(Method::GET, &path))
            .await?;
        Ok(response.bytes().await.map_err(ApiError::from)?.to_vec())
    }

    /// Downloads a user's profile picture, following redirects to wherever it is stored.
    pub async fn download_profile_picture(&self, user_id: i64) -> Result<Vec<u8>, PortalError> {
        let mut response = self
            .authed(|http, _| {
                Ok(http
                    .request(Method::GET, "users/photo")?
                    .query(&[("userId", user_id)]))
            })
            .await?;

        let http = self.http();
        for _ in 0..MAX_PICTURE_REDIRECTS {
            if !response.status().is_redirection() {
                break;
            }
            let Some(location) = response
                .headers()
                .get(header::LOCATION)
                .and_then(|v| v.to_str().ok())
            else {
                break;
            };
            let next = response.url().join(location).map_err(ApiError::from)?;
            let mut request = http.request_url(Method::GET, next);
            if let Some(token) = http.access_token() {
                request = request.header("at", token);
            }
            response = http.send(request).await?;
        }

        Ok(response.bytes().await.map_err(ApiError::from)?.to_vec())
    }
}
