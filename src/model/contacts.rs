use chrono::{DateTime, Utc};

use serde::Serialize;

use uuid::Uuid;

use crate::domain::{
    display_name, ContactName, ContactStatus, DisplayNamePreference, EmailAddress, MailboxNumber,
    PreferredLanguage,
};

/// Shown wherever a contact has neither a person nor a company name
pub const UNKNOWN_CUSTOMER: &str = "Unknown Customer";

/// Stored mailbox renter record
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Contact {
    pub contact_id: Uuid,
    pub contact_person: Option<String>,
    pub company_name: Option<String>,
    pub mailbox_number: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub preferred_language: PreferredLanguage,
    pub display_name_preference: DisplayNamePreference,
    pub status: ContactStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Contact {
    /// The derived name this contact is addressed by, if they have any name at all
    pub fn display_name(&self) -> Option<String> {
        display_name(
            self.display_name_preference,
            self.company_name.as_deref(),
            self.contact_person.as_deref(),
        )
    }
}

/// API representation of a contact, carrying the derived display name
#[derive(Debug, Serialize)]
pub struct ContactView {
    #[serde(flatten)]
    pub contact: Contact,
    pub display_name: String,
}

impl From<Contact> for ContactView {
    fn from(contact: Contact) -> Self {
        let display_name = contact
            .display_name()
            .unwrap_or_else(|| UNKNOWN_CUSTOMER.to_string());
        Self {
            contact,
            display_name,
        }
    }
}

/// Validated contact fields, used both for inserts and full updates
#[derive(Debug)]
pub struct NewContact {
    pub contact_person: Option<ContactName>,
    pub company_name: Option<ContactName>,
    pub mailbox_number: MailboxNumber,
    pub email: Option<EmailAddress>,
    pub phone: Option<String>,
    pub preferred_language: PreferredLanguage,
    pub display_name_preference: DisplayNamePreference,
    pub status: ContactStatus,
    pub notes: Option<String>,
}

/// Filters for listing contacts
#[derive(Debug, Default)]
pub struct ContactFilter {
    pub status: Option<ContactStatus>,
    pub search: Option<String>,
}
