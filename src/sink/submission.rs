//! Saved form snapshot

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// One press of "save": the form's values at that moment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: Uuid,
    pub saved_at: DateTime<Utc>,
    /// Whether every validator passed when the snapshot was taken
    pub valid: bool,
    pub customer: Value,
}

impl Submission {
    pub fn new(customer: Value, valid: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            saved_at: Utc::now(),
            valid,
            customer,
        }
    }
}
