use chrono::{DateTime, Utc};

use serde::Serialize;

use uuid::Uuid;

/// Stored staff action on a mail item
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ActionRecord {
    pub action_id: Uuid,
    pub mail_item_id: Uuid,
    pub action_type: String,
    pub action_description: String,
    pub previous_value: Option<String>,
    pub new_value: Option<String>,
    pub performed_by: String,
    pub notes: Option<String>,
    pub action_timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAction {
    pub mail_item_id: Uuid,
    pub action_type: String,
    pub action_description: String,
    pub previous_value: Option<String>,
    pub new_value: Option<String>,
    pub performed_by: String,
    pub notes: Option<String>,
}

impl NewAction {
    /// A status change of a mail item
    pub fn status_change(
        mail_item_id: Uuid,
        action_type: &str,
        previous: impl ToString,
        new: impl ToString,
        performed_by: &str,
    ) -> Self {
        let previous_value = previous.to_string();
        let new_value = new.to_string();
        Self {
            mail_item_id,
            action_type: action_type.to_string(),
            action_description: format!("Status changed from {} to {}", previous_value, new_value),
            previous_value: Some(previous_value),
            new_value: Some(new_value),
            performed_by: performed_by.to_string(),
            notes: None,
        }
    }
}
