use secrecy::Secret;

use sqlx::PgExecutor;

use uuid::Uuid;

use crate::domain::EmailAddress;
use crate::model::{NewUser, UserCredentials};

use super::text;

#[derive(sqlx::FromRow)]
struct CredentialsRow {
    id: Uuid,
    email: String,
    password_hash: String,
}

/// Repository for staff accounts
pub struct UsersRepo;

impl UsersRepo {
    #[tracing::instrument("Insert a new user record", skip(executor, new_user), fields(email = %new_user.email))]
    pub async fn insert<'con>(
        executor: impl PgExecutor<'con>,
        new_user: &NewUser,
    ) -> sqlx::Result<Uuid> {
        sqlx::query_scalar("insert into staff_users(email, password_hash) values ($1, $2) returning id")
            .bind(text(&new_user.email))
            .bind(&new_user.password_hash)
            .fetch_one(executor)
            .await
    }

    #[tracing::instrument("Fetch user credentials", skip(executor))]
    pub async fn fetch_credentials_by_email<'con>(
        executor: impl PgExecutor<'con>,
        email: &EmailAddress,
    ) -> sqlx::Result<Option<UserCredentials>> {
        let row: Option<CredentialsRow> =
            sqlx::query_as("select id, email, password_hash from staff_users where email = $1")
                .bind(text(email))
                .fetch_optional(executor)
                .await?;

        Ok(row.map(|row| UserCredentials {
            id: row.id,
            email: row.email,
            password_hash: Secret::new(row.password_hash),
        }))
    }
}
