use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::{web, HttpRequest};

use sqlx::PgPool;

use crate::error::RestError;
use crate::model::NewAction;
use crate::repo::ActionHistoryRepo;

pub mod action_history;
pub mod auth;
pub mod contacts;
pub mod emails;
pub mod fees;
pub mod follow_ups;
pub mod mail_items;
pub mod outreach_messages;
pub mod templates;
pub mod translate;

/// Extractor settings so malformed input gets the same JSON error body as everything else
pub fn extractor_configs() -> (web::JsonConfig, web::QueryConfig, web::PathConfig) {
    let json = web::JsonConfig::default().error_handler(
        |error: JsonPayloadError, _: &HttpRequest| {
            RestError::Validation(format!("Invalid request body: {}", error)).into()
        },
    );
    let query = web::QueryConfig::default().error_handler(
        |error: QueryPayloadError, _: &HttpRequest| {
            RestError::Validation(format!("Invalid query: {}", error)).into()
        },
    );
    let path = web::PathConfig::default().error_handler(|error: PathError, _: &HttpRequest| {
        RestError::Validation(format!("Invalid path: {}", error)).into()
    });
    (json, query, path)
}

/// Append entries to the action history; failures are logged, never returned
pub(crate) async fn record_actions(pool: &PgPool, actions: &[NewAction]) {
    if actions.is_empty() {
        return;
    }

    let result = async {
        let mut tx = pool.begin().await?;
        ActionHistoryRepo::insert_many(&mut *tx, actions).await?;
        tx.commit().await
    }
    .await;

    if let Err(error) = result {
        tracing::warn!(
            error.cause_chain = ?error,
            "Failed to record {} action history entries",
            actions.len()
        );
    }
}

/// Treat blank optional strings as missing
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
