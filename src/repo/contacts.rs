use sqlx::PgExecutor;

use uuid::Uuid;

use crate::domain::ContactStatus;
use crate::model::{Contact, ContactFilter, NewContact};

use super::{opt_text, text};

/// Repository for the contact directory
pub struct ContactsRepo;

impl ContactsRepo {
    #[tracing::instrument(name = "Insert contact", skip(executor, contact))]
    pub async fn insert<'con>(
        executor: impl PgExecutor<'con>,
        contact: &NewContact,
    ) -> sqlx::Result<Contact> {
        sqlx::query_as(
            "insert into contacts(contact_person, company_name, mailbox_number, email, phone, \
             preferred_language, display_name_preference, status, notes) \
             values ($1, $2, $3, $4, $5, $6, $7, $8, $9) returning *",
        )
        .bind(opt_text(&contact.contact_person))
        .bind(opt_text(&contact.company_name))
        .bind(text(&contact.mailbox_number))
        .bind(opt_text(&contact.email))
        .bind(contact.phone.as_deref())
        .bind(contact.preferred_language)
        .bind(contact.display_name_preference)
        .bind(contact.status)
        .bind(contact.notes.as_deref())
        .fetch_one(executor)
        .await
    }

    #[tracing::instrument(name = "Fetch contact by id", skip(executor))]
    pub async fn fetch_by_id<'con>(
        executor: impl PgExecutor<'con>,
        contact_id: Uuid,
    ) -> sqlx::Result<Option<Contact>> {
        sqlx::query_as("select * from contacts where contact_id = $1")
            .bind(contact_id)
            .fetch_optional(executor)
            .await
    }

    #[tracing::instrument(name = "Fetch contacts by ids", skip(executor))]
    pub async fn fetch_by_ids<'con>(
        executor: impl PgExecutor<'con>,
        contact_ids: &[Uuid],
    ) -> sqlx::Result<Vec<Contact>> {
        sqlx::query_as("select * from contacts where contact_id = any($1)")
            .bind(contact_ids)
            .fetch_all(executor)
            .await
    }

    /// List contacts by mailbox number; archived contacts only when asked for
    #[tracing::instrument(name = "List contacts", skip(executor))]
    pub async fn list<'con>(
        executor: impl PgExecutor<'con>,
        filter: &ContactFilter,
    ) -> sqlx::Result<Vec<Contact>> {
        let search = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s));

        sqlx::query_as(
            "select * from contacts \
             where (($1::text is null and status <> $3) or status = $1) \
             and ($2::text is null \
                  or mailbox_number ilike $2 or contact_person ilike $2 \
                  or company_name ilike $2 or email ilike $2) \
             order by mailbox_number, created_at",
        )
        .bind(filter.status)
        .bind(search)
        .bind(ContactStatus::Archived)
        .fetch_all(executor)
        .await
    }

    /// Replace every editable field of a contact
    #[tracing::instrument(name = "Update contact", skip(executor, contact))]
    pub async fn update<'con>(
        executor: impl PgExecutor<'con>,
        contact_id: Uuid,
        contact: &NewContact,
    ) -> sqlx::Result<Option<Contact>> {
        sqlx::query_as(
            "update contacts set contact_person = $2, company_name = $3, mailbox_number = $4, \
             email = $5, phone = $6, preferred_language = $7, display_name_preference = $8, \
             status = $9, notes = $10, updated_at = now() \
             where contact_id = $1 returning *",
        )
        .bind(contact_id)
        .bind(opt_text(&contact.contact_person))
        .bind(opt_text(&contact.company_name))
        .bind(text(&contact.mailbox_number))
        .bind(opt_text(&contact.email))
        .bind(contact.phone.as_deref())
        .bind(contact.preferred_language)
        .bind(contact.display_name_preference)
        .bind(contact.status)
        .bind(contact.notes.as_deref())
        .fetch_optional(executor)
        .await
    }

    /// Soft delete
    #[tracing::instrument(name = "Archive contact", skip(executor))]
    pub async fn archive<'con>(
        executor: impl PgExecutor<'con>,
        contact_id: Uuid,
    ) -> sqlx::Result<Option<Contact>> {
        sqlx::query_as(
            "update contacts set status = $2, updated_at = now() where contact_id = $1 returning *",
        )
        .bind(contact_id)
        .bind(ContactStatus::Archived)
        .fetch_optional(executor)
        .await
    }
}
