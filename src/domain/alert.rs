use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

/// Advisory alert row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: Uuid,
    pub title: String,
    pub message: String,
    pub severity: Severity,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub is_demo: bool,
}

/// Alert produced by the evaluator before it is stored
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewAlert {
    pub title: String,
    pub message: String,
    pub severity: Severity,
}

impl NewAlert {
    pub fn into_alert(self, created_at: DateTime<Utc>, is_demo: bool) -> Alert {
        Alert {
            id: Uuid::new_v4(),
            title: self.title,
            message: self.message,
            severity: self.severity,
            is_read: false,
            created_at,
            is_demo,
        }
    }
}
