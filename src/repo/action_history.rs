use sqlx::{PgConnection, PgExecutor};

use uuid::Uuid;

use crate::model::{ActionRecord, NewAction};

/// Repository for the append-only staff action log
pub struct ActionHistoryRepo;

impl ActionHistoryRepo {
    #[tracing::instrument(name = "Insert action history", skip(executor))]
    pub async fn insert<'con>(
        executor: impl PgExecutor<'con>,
        action: &NewAction,
    ) -> sqlx::Result<ActionRecord> {
        sqlx::query_as(
            "insert into action_history(mail_item_id, action_type, action_description, \
             previous_value, new_value, performed_by, notes) \
             values ($1, $2, $3, $4, $5, $6, $7) returning *",
        )
        .bind(action.mail_item_id)
        .bind(&action.action_type)
        .bind(&action.action_description)
        .bind(action.previous_value.as_deref())
        .bind(action.new_value.as_deref())
        .bind(&action.performed_by)
        .bind(action.notes.as_deref())
        .fetch_one(executor)
        .await
    }

    /// Insert several entries on one connection, usually inside a transaction
    #[tracing::instrument(name = "Insert action history batch", skip(conn, actions), fields(count = actions.len()))]
    pub async fn insert_many(
        conn: &mut PgConnection,
        actions: &[NewAction],
    ) -> sqlx::Result<Vec<ActionRecord>> {
        let mut records = Vec::with_capacity(actions.len());
        for action in actions {
            records.push(Self::insert(&mut *conn, action).await?);
        }
        Ok(records)
    }

    /// History of one mail item, newest first
    #[tracing::instrument(name = "List action history of mail item", skip(executor))]
    pub async fn list_for_item<'con>(
        executor: impl PgExecutor<'con>,
        mail_item_id: Uuid,
    ) -> sqlx::Result<Vec<ActionRecord>> {
        sqlx::query_as(
            "select * from action_history where mail_item_id = $1 \
             order by action_timestamp desc",
        )
        .bind(mail_item_id)
        .fetch_all(executor)
        .await
    }
}
