use chrono::{DateTime, Utc};

use serde::Serialize;

use uuid::Uuid;

/// Stored notification template
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MessageTemplate {
    pub template_id: Uuid,
    /// Owning staff user, `None` for shared templates
    pub user_id: Option<Uuid>,
    pub template_name: String,
    pub template_type: String,
    pub subject_line: String,
    pub message_body: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct NewTemplate {
    pub user_id: Option<Uuid>,
    pub template_name: String,
    pub template_type: String,
    pub subject_line: String,
    pub message_body: String,
    pub is_default: bool,
}
