use std::collections::HashMap;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::{parse, Attachment};
use crate::client::AssignmentType;

/// An assignment with its mark, flattened from the portal's nested `mark` object.
///
/// `kind` and `kind_abbr` come from the assignment type dictionary loaded at login; until
/// [Assignment::resolve_kind] runs, `kind` holds the numeric type id.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(from = "RawAssignment")]
pub struct Assignment {
    /// Assignment id
    pub id: i64,
    /// Numeric assignment type
    pub type_id: i64,
    /// Teacher's comment on the mark
    pub comment: String,
    /// Type name, e.g. "Контрольная работа"
    pub kind: String,
    /// Type abbreviation, e.g. "К"
    pub kind_abbr: String,
    /// Assignment text
    pub content: String,
    /// Mark, if one was given
    pub mark: Option<i64>,
    /// Weight of the mark
    pub weight: i64,
    /// Whether the mark is an overdue-duty mark
    pub is_duty: bool,
    /// Due date
    pub deadline: NaiveDate,
    /// Attached files
    pub attachments: Vec<Attachment>,
}

impl Assignment {
    /// Fills `kind` and `kind_abbr` from the dictionary. Unknown types keep the numeric id.
    pub fn resolve_kind(&mut self, types: &HashMap<i64, AssignmentType>) {
        match types.get(&self.type_id) {
            Some(t) => {
                self.kind = t.name.clone();
                self.kind_abbr = t.abbr.clone();
            }
            None => {
                self.kind = self.type_id.to_string();
                self.kind_abbr.clear();
            }
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAssignment {
    id: i64,
    #[serde(default)]
    type_id: Option<i64>,
    #[serde(default)]
    assignment_name: Option<String>,
    #[serde(default)]
    mark: Option<serde_json::Value>,
    #[serde(default)]
    mark_comment: Option<serde_json::Value>,
    #[serde(default)]
    weight: Option<i64>,
    #[serde(deserialize_with = "parse::date")]
    due_date: NaiveDate,
    #[serde(default, deserialize_with = "parse::null_as_default")]
    attachments: Vec<Attachment>,
}

impl From<RawAssignment> for Assignment {
    fn from(raw: RawAssignment) -> Self {
        let (mark, is_duty) = match raw.mark.as_ref().and_then(|m| m.as_object()) {
            Some(m) => (
                m.get("mark").and_then(serde_json::Value::as_i64),
                m.get("dutyMark")
                    .and_then(serde_json::Value::as_bool)
                    .unwrap_or(false),
            ),
            None => (None, false),
        };
        let comment = raw
            .mark_comment
            .as_ref()
            .and_then(|c| c.get("name"))
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
            .to_owned();
        let type_id = raw.type_id.unwrap_or(0);

        Self {
            id: raw.id,
            type_id,
            comment,
            kind: type_id.to_string(),
            kind_abbr: String::new(),
            content: raw.assignment_name.unwrap_or_default(),
            mark,
            weight: raw.weight.unwrap_or(1),
            is_duty,
            deadline: raw.due_date,
            attachments: raw.attachments,
        }
    }
}

/// A lesson in the timetable.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    /// Date of the lesson
    #[serde(deserialize_with = "parse::date")]
    pub day: NaiveDate,
    /// Start time
    #[serde(rename = "startTime", deserialize_with = "parse::time")]
    pub start: NaiveTime,
    /// End time
    #[serde(rename = "endTime", deserialize_with = "parse::time")]
    pub end: NaiveTime,
    /// Classroom
    #[serde(default, deserialize_with = "parse::null_as_default")]
    pub room: String,
    /// Lesson number within the day
    pub number: i64,
    /// Subject name
    #[serde(
        rename = "subjectName",
        default,
        deserialize_with = "parse::null_as_default"
    )]
    pub subject: String,
    /// Assignments given in this lesson
    #[serde(default, deserialize_with = "parse::null_as_default")]
    pub assignments: Vec<Assignment>,
}

/// One school day.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Day {
    /// The date
    #[serde(rename = "date", deserialize_with = "parse::date")]
    pub day: NaiveDate,
    /// Lessons in order
    #[serde(default, deserialize_with = "parse::null_as_default")]
    pub lessons: Vec<Lesson>,
}

/// The diary for a range of days.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Diary {
    /// First day of the range
    #[serde(rename = "weekStart", deserialize_with = "parse::date")]
    pub start: NaiveDate,
    /// Last day of the range
    #[serde(rename = "weekEnd", deserialize_with = "parse::date")]
    pub end: NaiveDate,
    /// School days
    #[serde(
        rename = "weekDays",
        default,
        deserialize_with = "parse::null_as_default"
    )]
    pub schedule: Vec<Day>,
}

impl Diary {
    /// Resolves the kind of every assignment in the diary.
    pub fn resolve_kinds(&mut self, types: &HashMap<i64, AssignmentType>) {
        self.schedule
            .iter_mut()
            .flat_map(|day| day.lessons.iter_mut())
            .flat_map(|lesson| lesson.assignments.iter_mut())
            .for_each(|assignment| assignment.resolve_kind(types));
    }
}
