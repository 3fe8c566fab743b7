use chrono::{DateTime, Utc};

use serde::Serialize;

use uuid::Uuid;

use crate::domain::{ItemType, MailStatus};

/// Stored mail or package record
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MailItem {
    pub mail_item_id: Uuid,
    pub contact_id: Uuid,
    pub item_type: ItemType,
    pub tracking_number: Option<String>,
    pub description: Option<String>,
    pub received_date: DateTime<Utc>,
    pub quantity: i32,
    pub status: MailStatus,
    pub pickup_date: Option<DateTime<Utc>>,
    pub last_notified: Option<DateTime<Utc>>,
    pub notification_count: i32,
    pub dismissed_at: Option<DateTime<Utc>>,
    pub dismissed_by: Option<String>,
    pub archived_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MailItem {
    /// Whether the item belongs on the follow-up dashboard
    pub fn needs_follow_up(&self) -> bool {
        self.archived_at.is_none() && self.dismissed_at.is_none() && self.status.awaits_pickup()
    }
}

/// New mail item intake
#[derive(Debug)]
pub struct NewMailItem {
    pub contact_id: Uuid,
    pub item_type: ItemType,
    pub tracking_number: Option<String>,
    pub description: Option<String>,
    pub received_date: DateTime<Utc>,
    pub quantity: i32,
    pub status: MailStatus,
}

/// Partial update of a mail item; `None` leaves a field unchanged
#[derive(Debug, Default)]
pub struct MailItemUpdate {
    pub status: Option<MailStatus>,
    pub quantity: Option<i32>,
    pub tracking_number: Option<String>,
    pub description: Option<String>,
}

/// Filters for listing mail items
#[derive(Debug, Default)]
pub struct MailItemFilter {
    pub contact_id: Option<Uuid>,
    pub status: Option<MailStatus>,
}
