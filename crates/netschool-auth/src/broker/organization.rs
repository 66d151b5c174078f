use serde_json::Value;

use super::OrganizationError;
use crate::prompt::ChoicePrompt;

const NAME_KEYS: [&str; 4] = ["displayName", "name", "schoolName", "organizationName"];

/// A portal account linked to the broker identity, one per organization and role set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizationCandidate {
    /// Portal user id, sent back as the login scope
    pub id: String,
    /// Name to show and to match hints against
    pub name: String,
    /// Role group ids, the first one is used for the login
    pub roles: Vec<String>,
}

fn id_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl OrganizationCandidate {
    /// Reads an entry of the portal's `account-info` user list.
    pub fn from_account_info(user: &Value) -> Self {
        let id = id_string(user.get("id")).unwrap_or_else(|| "?".to_owned());
        let name = NAME_KEYS
            .iter()
            .filter_map(|key| user.get(key).and_then(Value::as_str))
            .find(|name| !name.is_empty())
            .map(str::to_owned)
            .unwrap_or_else(|| id.clone());
        let roles = user
            .get("roles")
            .and_then(Value::as_array)
            .map(|roles| {
                roles
                    .iter()
                    .filter_map(|role| id_string(role.get("id")))
                    .collect()
            })
            .unwrap_or_default();

        Self { id, name, roles }
    }
}

/// What [`select_organization`] decided.
#[derive(Debug, PartialEq)]
pub enum Selection<'a> {
    /// A single candidate qualifies.
    Selected(&'a OrganizationCandidate),
    /// Several candidates and no hint, the user has to choose.
    Choose,
}

/// Selects among `candidates` without asking anyone.
///
/// A single candidate is returned whatever the hint. Otherwise the hint is matched as a
/// case-insensitive substring of the names and must match exactly one.
pub fn select_organization<'a>(
    candidates: &'a [OrganizationCandidate],
    hint: Option<&str>,
) -> Result<Selection<'a>, OrganizationError> {
    match candidates {
        [] => return Err(OrganizationError::NoLinkedAccounts),
        [only] => return Ok(Selection::Selected(only)),
        _ => {}
    }

    let Some(hint) = hint.filter(|h| !h.trim().is_empty()) else {
        return Ok(Selection::Choose);
    };

    let needle = hint.to_lowercase();
    let matches: Vec<&OrganizationCandidate> = candidates
        .iter()
        .filter(|c| c.name.to_lowercase().contains(&needle))
        .collect();

    match matches.as_slice() {
        [one] => Ok(Selection::Selected(one)),
        [] => Err(OrganizationError::NotFound {
            hint: hint.to_owned(),
            available: names(candidates),
        }),
        many => Err(OrganizationError::Ambiguous {
            hint: hint.to_owned(),
            matches: many.iter().map(|c| c.name.clone()).collect(),
        }),
    }
}

fn names(candidates: &[OrganizationCandidate]) -> Vec<String> {
    candidates.iter().map(|c| c.name.clone()).collect()
}

/// Selects among `candidates`, asking `prompt` when the hint does not decide.
pub(crate) async fn pick_organization<'a>(
    candidates: &'a [OrganizationCandidate],
    hint: Option<&str>,
    prompt: Option<&dyn ChoicePrompt>,
) -> Result<&'a OrganizationCandidate, OrganizationError> {
    match select_organization(candidates, hint)? {
        Selection::Selected(candidate) => Ok(candidate),
        Selection::Choose => {
            let available = names(candidates);
            let Some(prompt) = prompt else {
                return Err(OrganizationError::SelectionRequired { available });
            };
            let index = prompt
                .choose("Several organizations are linked to this account", &available)
                .await?;
            candidates
                .get(index)
                .ok_or(OrganizationError::InvalidChoice(index))
        }
    }
}
