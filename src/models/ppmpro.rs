use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;

/// Timesheet identifier as returned by PPM Pro; the API has been seen to use
/// both numbers and strings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum TimesheetId {
    Number(i64),
    Text(String),
}

impl fmt::Display for TimesheetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimesheetId::Number(id) => write!(f, "{id}"),
            TimesheetId::Text(id) => f.write_str(id),
        }
    }
}

// Response structs for GET /timesheet/recent
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct RecentTimesheets {
    #[serde(default)]
    pub items: Vec<TimesheetSummary>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimesheetSummary {
    pub id: TimesheetId,
    pub start_date: Option<String>,
}

// Response structs for GET /timesheet/{id}
#[derive(Serialize, Deserialize, Debug)]
pub struct TimesheetResponse {
    pub timesheet: Timesheet,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Timesheet {
    pub id: Option<TimesheetId>,
    pub start_date: Option<String>,
    pub state_name: Option<String>,
    #[serde(default)]
    pub activities: Vec<Activity>,
}

impl Timesheet {
    pub fn state_name(&self) -> &str {
        self.state_name.as_deref().unwrap_or("UNKNOWN")
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub project_id: Value,
    pub project_name: Option<String>,
    #[serde(default)]
    pub task_id: Value,
    #[serde(default)]
    pub role: Value,
    #[serde(rename = "type", default)]
    pub activity_type: Value,
    pub is_pinned: Option<bool>,
    pub is_billable: Option<bool>,
    pub is_capitalized: Option<bool>,
    pub is_editable: Option<bool>,
    #[serde(default)]
    pub state: Value,
    #[serde(default)]
    pub entries: Vec<Entry>,
}

const ENTRY_HOURS: &str = "entryHours";

/// A single day's hours on an activity. Everything except the date, hours
/// included, stays in `extra` as received so untouched entries are written
/// back exactly as they came.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub entry_date: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entry {
    /// Hours worked; a missing or `null` value counts as zero.
    pub fn hours(&self) -> f64 {
        self.extra
            .get(ENTRY_HOURS)
            .and_then(Value::as_f64)
            .unwrap_or_default()
    }

    /// Returns false, leaving the entry alone, if `hours` is not finite.
    pub fn set_hours(&mut self, hours: f64) -> bool {
        match Number::from_f64(hours) {
            Some(number) => {
                self.extra.insert(ENTRY_HOURS.to_string(), Value::Number(number));
                true
            }
            None => false,
        }
    }
}

/// Record sent to PUT /timesheet/{id}/activities.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityUpdate {
    pub entries: Vec<Entry>,
    pub id: Value,
    pub project_id: Value,
    pub task_id: Value,
    pub role: Value,
    pub task_schedule_id: u32,
    pub remaining_hours: u32,
    pub dynamic_fields: Map<String, Value>,
    #[serde(rename = "type")]
    pub activity_type: Value,
    pub is_pinned: Option<bool>,
    pub is_billable: Option<bool>,
    pub is_capitalized: Option<bool>,
    pub is_editable: Option<bool>,
    pub state: Value,
}

/// Body of the submit and approve requests.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct Note {
    pub note: String,
}
