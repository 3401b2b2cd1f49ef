use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const DEFAULT_EVENT_TEXT: &str = "Event Text";

/// The single persisted record: how many people will be there, what the
/// event is, and who has already been counted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterState {
    pub count: u64,
    pub event_text: String,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub voters: BTreeSet<String>,
}

impl Default for CounterState {
    fn default() -> Self {
        Self {
            count: 0,
            event_text: DEFAULT_EVENT_TEXT.to_string(),
            voters: BTreeSet::new(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateResponse {
    pub count: u64,
    pub event_text: String,
    pub clicked: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IncrementResponse {
    pub count: u64,
    pub clicked: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminRequest {
    pub password: String,
    #[serde(default)]
    pub event_text: Option<String>,
    #[serde(default)]
    pub reset_count: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminResponse {
    pub count: u64,
    pub event_text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
