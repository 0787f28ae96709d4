use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One highlight submission, kept for display only
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EditLogEntry {
    pub highlighted: String,
    pub comment: String,
    pub recorded_at: DateTime<Utc>,
}

impl EditLogEntry {
    pub fn new(highlighted: String, comment: String) -> Self {
        Self {
            highlighted,
            comment,
            recorded_at: Utc::now(),
        }
    }
}
