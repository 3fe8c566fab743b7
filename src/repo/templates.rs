use sqlx::PgExecutor;

use uuid::Uuid;

use crate::model::{MessageTemplate, NewTemplate};

/// Repository for notification templates
pub struct TemplatesRepo;

impl TemplatesRepo {
    /// Templates a staff member can use: their own plus the shared ones
    #[tracing::instrument(name = "List templates for user", skip(executor))]
    pub async fn list_for_user<'con>(
        executor: impl PgExecutor<'con>,
        user_id: Uuid,
    ) -> sqlx::Result<Vec<MessageTemplate>> {
        sqlx::query_as(
            "select * from message_templates \
             where user_id = $1 or user_id is null or is_default \
             order by is_default desc, template_name",
        )
        .bind(user_id)
        .fetch_all(executor)
        .await
    }

    #[tracing::instrument(name = "Fetch template by id", skip(executor))]
    pub async fn fetch_by_id<'con>(
        executor: impl PgExecutor<'con>,
        template_id: Uuid,
    ) -> sqlx::Result<Option<MessageTemplate>> {
        sqlx::query_as("select * from message_templates where template_id = $1")
            .bind(template_id)
            .fetch_optional(executor)
            .await
    }

    #[tracing::instrument(name = "Insert template", skip(executor, template))]
    pub async fn insert<'con>(
        executor: impl PgExecutor<'con>,
        template: &NewTemplate,
    ) -> sqlx::Result<MessageTemplate> {
        sqlx::query_as(
            "insert into message_templates(user_id, template_name, template_type, \
             subject_line, message_body, is_default) \
             values ($1, $2, $3, $4, $5, $6) returning *",
        )
        .bind(template.user_id)
        .bind(&template.template_name)
        .bind(&template.template_type)
        .bind(&template.subject_line)
        .bind(&template.message_body)
        .bind(template.is_default)
        .fetch_one(executor)
        .await
    }
}
