use reqwest::Method;

use super::LoginError;
use crate::{client::SchoolIdentifier, http::HttpSession, models::ShortSchool, ApiError};

/// Placeholder the school search needs when no name is given.
pub(crate) const EMPTY_SEARCH_QUERY: &str = "У";

/// Unauthenticated school search. An empty query lists every school.
pub(crate) async fn search_schools(
    http: &HttpSession,
    query: &str,
) -> Result<Vec<ShortSchool>, ApiError> {
    let name = if query.is_empty() {
        EMPTY_SEARCH_QUERY
    } else {
        query
    };
    let schools = http
        .send(
            http.request_with_token(Method::GET, "schools/search", None)?
                .query(&[("name", name)]),
        )
        .await?
        .json()
        .await?;
    Ok(schools)
}

/// Resolves a school to its id.
///
/// Names are matched exactly against the short name, then against the full name without the
/// town suffix in parentheses; a search with a single result is accepted as is.
pub(crate) async fn resolve_school(
    http: &HttpSession,
    school: &SchoolIdentifier,
) -> Result<i64, LoginError> {
    let name = match school {
        SchoolIdentifier::Id(id) => return Ok(*id),
        SchoolIdentifier::Name(name) => name,
    };

    let candidates = search_schools(http, name).await?;
    pick_school(&candidates, name).ok_or_else(|| LoginError::SchoolNotFound(name.clone()))
}

fn pick_school(candidates: &[ShortSchool], name: &str) -> Option<i64> {
    if let Some(school) = candidates.iter().find(|s| s.short_name == name) {
        return Some(school.id);
    }
    if let Some(school) = candidates
        .iter()
        .find(|s| s.name.split(" (").next() == Some(name))
    {
        return Some(school.id);
    }
    match candidates {
        [only] => Some(only.id),
        _ => None,
    }
}
