use chrono::{Datelike, Days, Local, NaiveDate};
use reqwest::Method;

use super::{PortalClient, PortalError};
use crate::models::{Announcement, Assignment, Diary};

/// Monday of the current week and the Saturday after it.
fn default_week(start: Option<NaiveDate>, end: Option<NaiveDate>) -> (NaiveDate, NaiveDate) {
    let start = start.unwrap_or_else(|| {
        let today = Local::now().date_naive();
        today - Days::new(u64::from(today.weekday().num_days_from_monday()))
    });
    let end = end.unwrap_or_else(|| start + Days::new(5));
    (start, end)
}

impl PortalClient {
    /// The diary for a date range, by default the current week.
    pub async fn diary(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Diary, PortalError> {
        let (start, end) = default_week(start, end);
        let response = self
            .authed(|http, session| {
                Ok(http.request(Method::GET, "student/diary")?.query(&[
                    ("studentId", session.student_id.to_string()),
                    ("yearId", session.year_id.to_string()),
                    ("weekStart", start.to_string()),
                    ("weekEnd", end.to_string()),
                ]))
            })
            .await?;

        let mut diary: Diary = response.json().await.map_err(crate::ApiError::from)?;
        diary.resolve_kinds(&self.client.internal.session().assignment_types);
        Ok(diary)
    }

    /// Overdue mandatory assignments for a date range, by default the current week.
    pub async fn overdue(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Assignment>, PortalError> {
        let (start, end) = default_week(start, end);
        let response = self
            .authed(|http, session| {
                Ok(http
                    .request(Method::GET, "student/diary/pastMandatory")?
                    .query(&[
                        ("studentId", session.student_id.to_string()),
                        ("yearId", session.year_id.to_string()),
                        ("weekStart", start.to_string()),
                        ("weekEnd", end.to_string()),
                    ]))
            })
            .await?;

        let mut assignments: Vec<Assignment> =
            response.json().await.map_err(crate::ApiError::from)?;
        let types = self.client.internal.session().assignment_types;
        assignments
            .iter_mut()
            .for_each(|assignment| assignment.resolve_kind(&types));
        Ok(assignments)
    }

    /// School announcements. `take` limits the count, `-1` returns all.
    pub async fn announcements(&self, take: i64) -> Result<Vec<Announcement>, PortalError> {
        let response = self
            .authed(|http, _| {
                Ok(http
                    .request(Method::GET, "announcements")?
                    .query(&[("take", take)]))
            })
            .await?;
        Ok(response.json().await.map_err(crate::ApiError::from)?)
    }
}
