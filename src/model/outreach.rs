use chrono::{DateTime, Utc};

use serde::Serialize;

use uuid::Uuid;

pub const EMAIL_CHANNEL: &str = "Email";

/// Audit record of a communication sent to a contact
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OutreachMessage {
    pub message_id: Uuid,
    pub contact_id: Uuid,
    pub mail_item_id: Option<Uuid>,
    pub message_type: String,
    pub channel: String,
    pub message_content: String,
    pub sent_at: DateTime<Utc>,
    pub responded: bool,
    pub follow_up_needed: bool,
}

#[derive(Debug)]
pub struct NewOutreachMessage {
    pub contact_id: Uuid,
    pub mail_item_id: Option<Uuid>,
    pub message_type: String,
    pub channel: String,
    pub message_content: String,
    pub responded: bool,
    pub follow_up_needed: bool,
}

/// Filters for listing outreach messages
#[derive(Debug, Default)]
pub struct OutreachFilter {
    pub contact_id: Option<Uuid>,
    pub mail_item_id: Option<Uuid>,
}
