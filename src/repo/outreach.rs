use sqlx::PgExecutor;

use crate::model::{NewOutreachMessage, OutreachFilter, OutreachMessage};

/// Repository for the append-only outreach log
pub struct OutreachMessagesRepo;

impl OutreachMessagesRepo {
    #[tracing::instrument(name = "Insert outreach message", skip(executor, message))]
    pub async fn insert<'con>(
        executor: impl PgExecutor<'con>,
        message: &NewOutreachMessage,
    ) -> sqlx::Result<OutreachMessage> {
        sqlx::query_as(
            "insert into outreach_messages(contact_id, mail_item_id, message_type, channel, \
             message_content, responded, follow_up_needed) \
             values ($1, $2, $3, $4, $5, $6, $7) returning *",
        )
        .bind(message.contact_id)
        .bind(message.mail_item_id)
        .bind(&message.message_type)
        .bind(&message.channel)
        .bind(&message.message_content)
        .bind(message.responded)
        .bind(message.follow_up_needed)
        .fetch_one(executor)
        .await
    }

    #[tracing::instrument(name = "List outreach messages", skip(executor))]
    pub async fn list<'con>(
        executor: impl PgExecutor<'con>,
        filter: &OutreachFilter,
    ) -> sqlx::Result<Vec<OutreachMessage>> {
        sqlx::query_as(
            "select * from outreach_messages \
             where ($1::uuid is null or contact_id = $1) \
             and ($2::uuid is null or mail_item_id = $2) \
             order by sent_at desc",
        )
        .bind(filter.contact_id)
        .bind(filter.mail_item_id)
        .fetch_all(executor)
        .await
    }
}
