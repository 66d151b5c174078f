//! Authenticated portal state.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Sentinel for identifiers that have not been resolved yet.
pub const UNSET_ID: i64 = -1;

/// Display name and abbreviation of an assignment type.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct AssignmentType {
    /// Full name, e.g. "Контрольная работа"
    pub name: String,
    /// Short form, e.g. "К"
    #[serde(default)]
    pub abbr: String,
}

/// State resolved by a successful login.
///
/// A session is always built completely before it is handed to the client, a failed login never
/// leaves a partially populated session behind.
#[derive(Clone, Debug)]
pub struct Session {
    /// Portal access token, sent as the `at` header.
    pub access_token: Option<String>,
    /// Identifier of the current student.
    pub student_id: i64,
    /// Identifier of the current academic year.
    pub year_id: i64,
    /// Identifier of the school (organization).
    pub school_id: i64,
    /// Assignment types keyed by their numeric id.
    pub assignment_types: HashMap<i64, AssignmentType>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            access_token: None,
            student_id: UNSET_ID,
            year_id: UNSET_ID,
            school_id: UNSET_ID,
            assignment_types: HashMap::new(),
        }
    }
}

impl Session {
    /// Whether the session holds a resolved student.
    pub fn is_authenticated(&self) -> bool {
        self.student_id != UNSET_ID
    }
}
