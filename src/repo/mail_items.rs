use std::collections::HashMap;

use sqlx::{PgExecutor, PgPool};

use uuid::Uuid;

use crate::domain::MailStatus;
use crate::followup::FollowUpEntry;
use crate::model::{Contact, MailItem, MailItemFilter, MailItemUpdate, NewMailItem, PackageFee};

/// Items still on the shelf and not hidden from follow-up
const FOLLOW_UP_CONDITION: &str = "archived_at is null and dismissed_at is null \
     and status in ('Received', 'Notified')";

/// Repository for logged mail items
pub struct MailItemsRepo;

impl MailItemsRepo {
    #[tracing::instrument(name = "Insert mail item", skip(executor))]
    pub async fn insert<'con>(
        executor: impl PgExecutor<'con>,
        item: &NewMailItem,
    ) -> sqlx::Result<MailItem> {
        sqlx::query_as(
            "insert into mail_items(contact_id, item_type, tracking_number, description, \
             received_date, quantity, status) \
             values ($1, $2, $3, $4, $5, $6, $7) returning *",
        )
        .bind(item.contact_id)
        .bind(item.item_type)
        .bind(item.tracking_number.as_deref())
        .bind(item.description.as_deref())
        .bind(item.received_date)
        .bind(item.quantity)
        .bind(item.status)
        .fetch_one(executor)
        .await
    }

    /// Fetch a mail item that has not been archived
    #[tracing::instrument(name = "Fetch mail item by id", skip(executor))]
    pub async fn fetch_by_id<'con>(
        executor: impl PgExecutor<'con>,
        mail_item_id: Uuid,
    ) -> sqlx::Result<Option<MailItem>> {
        sqlx::query_as("select * from mail_items where mail_item_id = $1 and archived_at is null")
            .bind(mail_item_id)
            .fetch_optional(executor)
            .await
    }

    #[tracing::instrument(name = "List mail items", skip(executor))]
    pub async fn list<'con>(
        executor: impl PgExecutor<'con>,
        filter: &MailItemFilter,
    ) -> sqlx::Result<Vec<MailItem>> {
        sqlx::query_as(
            "select * from mail_items where archived_at is null \
             and ($1::uuid is null or contact_id = $1) \
             and ($2::text is null or status = $2) \
             order by received_date desc",
        )
        .bind(filter.contact_id)
        .bind(filter.status)
        .fetch_all(executor)
        .await
    }

    /// Apply a partial update; picking an item up stamps the pickup date
    #[tracing::instrument(name = "Update mail item", skip(executor))]
    pub async fn update<'con>(
        executor: impl PgExecutor<'con>,
        mail_item_id: Uuid,
        update: &MailItemUpdate,
    ) -> sqlx::Result<Option<MailItem>> {
        sqlx::query_as(
            "update mail_items set \
             status = coalesce($2, status), \
             quantity = coalesce($3, quantity), \
             tracking_number = coalesce($4, tracking_number), \
             description = coalesce($5, description), \
             pickup_date = case when $2::text = $6 then now() else pickup_date end, \
             updated_at = now() \
             where mail_item_id = $1 and archived_at is null returning *",
        )
        .bind(mail_item_id)
        .bind(update.status)
        .bind(update.quantity)
        .bind(update.tracking_number.as_deref())
        .bind(update.description.as_deref())
        .bind(MailStatus::PickedUp)
        .fetch_optional(executor)
        .await
    }

    /// Soft delete
    #[tracing::instrument(name = "Archive mail item", skip(executor))]
    pub async fn archive<'con>(
        executor: impl PgExecutor<'con>,
        mail_item_id: Uuid,
    ) -> sqlx::Result<Option<MailItem>> {
        sqlx::query_as(
            "update mail_items set archived_at = now(), updated_at = now() \
             where mail_item_id = $1 and archived_at is null returning *",
        )
        .bind(mail_item_id)
        .fetch_optional(executor)
        .await
    }

    /// Record a sent notification; only items still awaiting pickup move to `Notified`
    #[tracing::instrument(name = "Mark mail item notified", skip(executor))]
    pub async fn mark_notified<'con>(
        executor: impl PgExecutor<'con>,
        mail_item_id: Uuid,
    ) -> sqlx::Result<Option<MailItem>> {
        sqlx::query_as(
            "update mail_items set status = $2, notification_count = notification_count + 1, \
             last_notified = now(), updated_at = now() \
             where mail_item_id = $1 and archived_at is null \
             and status in ('Received', 'Notified') returning *",
        )
        .bind(mail_item_id)
        .bind(MailStatus::Notified)
        .fetch_optional(executor)
        .await
    }

    /// Move several items to one status at once
    #[tracing::instrument(name = "Set mail item statuses", skip(executor))]
    pub async fn set_status<'con>(
        executor: impl PgExecutor<'con>,
        mail_item_ids: &[Uuid],
        status: MailStatus,
    ) -> sqlx::Result<Vec<MailItem>> {
        sqlx::query_as(
            "update mail_items set status = $2, updated_at = now() \
             where mail_item_id = any($1) and archived_at is null returning *",
        )
        .bind(mail_item_ids)
        .bind(status)
        .fetch_all(executor)
        .await
    }

    /// Hide items still awaiting pickup from follow-up without touching their status
    #[tracing::instrument(name = "Dismiss mail items", skip(executor))]
    pub async fn dismiss<'con>(
        executor: impl PgExecutor<'con>,
        mail_item_ids: &[Uuid],
        dismissed_by: &str,
    ) -> sqlx::Result<Vec<MailItem>> {
        sqlx::query_as(
            "update mail_items set dismissed_at = now(), dismissed_by = $2, updated_at = now() \
             where mail_item_id = any($1) and archived_at is null \
             and status in ('Received', 'Notified') returning *",
        )
        .bind(mail_item_ids)
        .bind(dismissed_by)
        .fetch_all(executor)
        .await
    }

    #[tracing::instrument(name = "Restore dismissed mail item", skip(executor))]
    pub async fn restore<'con>(
        executor: impl PgExecutor<'con>,
        mail_item_id: Uuid,
    ) -> sqlx::Result<Option<MailItem>> {
        sqlx::query_as(
            "update mail_items set dismissed_at = null, dismissed_by = null, updated_at = now() \
             where mail_item_id = $1 and archived_at is null and dismissed_at is not null \
             returning *",
        )
        .bind(mail_item_id)
        .fetch_optional(executor)
        .await
    }

    /// Bring back every dismissed item of a contact that is still awaiting pickup
    #[tracing::instrument(name = "Restore dismissed mail items of contact", skip(executor))]
    pub async fn restore_for_contact<'con>(
        executor: impl PgExecutor<'con>,
        contact_id: Uuid,
    ) -> sqlx::Result<Vec<MailItem>> {
        sqlx::query_as(
            "update mail_items set dismissed_at = null, dismissed_by = null, updated_at = now() \
             where contact_id = $1 and archived_at is null and dismissed_at is not null \
             and status in ('Received', 'Notified') returning *",
        )
        .bind(contact_id)
        .fetch_all(executor)
        .await
    }

    /// Follow-up items of one contact
    #[tracing::instrument(name = "Fetch follow-up items of contact", skip(executor))]
    pub async fn fetch_follow_ups_for_contact<'con>(
        executor: impl PgExecutor<'con>,
        contact_id: Uuid,
    ) -> sqlx::Result<Vec<MailItem>> {
        let query = format!(
            "select * from mail_items where contact_id = $1 and {} order by received_date",
            FOLLOW_UP_CONDITION
        );
        sqlx::query_as(&query)
            .bind(contact_id)
            .fetch_all(executor)
            .await
    }

    /// Dismissed items that are still waiting to be picked up
    #[tracing::instrument(name = "Fetch dismissed mail items", skip(executor))]
    pub async fn fetch_dismissed<'con>(
        executor: impl PgExecutor<'con>,
    ) -> sqlx::Result<Vec<MailItem>> {
        sqlx::query_as(
            "select * from mail_items where archived_at is null and dismissed_at is not null \
             and status in ('Received', 'Notified') order by dismissed_at desc",
        )
        .fetch_all(executor)
        .await
    }

    /// Load every follow-up item together with its contact and fee
    #[tracing::instrument(name = "Fetch follow-up entries", skip(pool))]
    pub async fn fetch_follow_up_entries(pool: &PgPool) -> sqlx::Result<Vec<FollowUpEntry>> {
        let query = format!("select * from mail_items where {}", FOLLOW_UP_CONDITION);
        let items: Vec<MailItem> = sqlx::query_as(&query).fetch_all(pool).await?;
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let item_ids: Vec<Uuid> = items.iter().map(|item| item.mail_item_id).collect();
        let contact_ids: Vec<Uuid> = items.iter().map(|item| item.contact_id).collect();

        let contacts: Vec<Contact> =
            sqlx::query_as("select * from contacts where contact_id = any($1)")
                .bind(&contact_ids)
                .fetch_all(pool)
                .await?;
        let fees: Vec<PackageFee> =
            sqlx::query_as("select * from package_fees where mail_item_id = any($1)")
                .bind(&item_ids)
                .fetch_all(pool)
                .await?;

        let contacts: HashMap<Uuid, Contact> = contacts
            .into_iter()
            .map(|contact| (contact.contact_id, contact))
            .collect();
        let mut fees: HashMap<Uuid, PackageFee> = fees
            .into_iter()
            .map(|fee| (fee.mail_item_id, fee))
            .collect();

        Ok(items
            .into_iter()
            .filter_map(|item| {
                let contact = contacts.get(&item.contact_id)?.clone();
                let fee = fees.remove(&item.mail_item_id);
                Some(FollowUpEntry { item, contact, fee })
            })
            .collect())
    }
}
