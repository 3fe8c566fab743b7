use actix_web::dev::HttpServiceFactory;
use actix_web::{get, post, web, HttpResponse, Responder};

use chrono::Utc;

use serde::Serialize;

use sqlx::PgPool;

use uuid::Uuid;

use crate::auth::StaffUser;
use crate::domain::MailStatus;
use crate::error::RestResult;
use crate::followup::{
    abandonment_candidates, aggregate, summarize, FollowUpGroup, FollowUpSummary,
    ABANDONED_AFTER_DAYS,
};
use crate::model::{MailItem, NewAction};
use crate::repo::MailItemsRepo;

use super::record_actions;

const ABANDONED_ACTION: &str = "marked_abandoned";

#[derive(Debug, Serialize)]
struct FollowUps {
    groups: Vec<FollowUpGroup>,
    summary: FollowUpSummary,
}

#[derive(Debug, Serialize)]
struct Abandoned {
    success: bool,
    updated: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    items: Vec<MailItem>,
}

/// Contacts with mail still waiting on the shelf, most urgent first
#[tracing::instrument(name = "List follow-ups", skip(_staff, pool))]
#[get("")]
async fn list(_staff: StaffUser, pool: web::Data<PgPool>) -> RestResult<impl Responder> {
    let entries = MailItemsRepo::fetch_follow_up_entries(pool.get_ref()).await?;

    let groups = aggregate(entries, Utc::now());
    let summary = summarize(&groups);

    Ok(HttpResponse::Ok().json(FollowUps { groups, summary }))
}

/// Move a contact's long-uncollected items into the abandoned workflow
#[tracing::instrument(name = "Mark items abandoned", skip(staff, pool))]
#[post("/{contact_id}/mark-abandoned")]
async fn mark_abandoned(
    staff: StaffUser,
    path: web::Path<(Uuid,)>,
    pool: web::Data<PgPool>,
) -> RestResult<impl Responder> {
    let pool = pool.get_ref();
    let (contact_id,) = path.into_inner();

    let items = MailItemsRepo::fetch_follow_ups_for_contact(pool, contact_id).await?;
    let candidates = abandonment_candidates(&items, Utc::now());
    if candidates.is_empty() {
        return Ok(HttpResponse::Ok().json(Abandoned {
            success: false,
            updated: 0,
            message: Some(format!(
                "No items over {} days old for this customer",
                ABANDONED_AFTER_DAYS
            )),
            items: Vec::new(),
        }));
    }

    let updated = MailItemsRepo::set_status(pool, &candidates, MailStatus::Abandoned).await?;

    let actions: Vec<NewAction> = items
        .iter()
        .filter(|item| candidates.contains(&item.mail_item_id))
        .map(|item| {
            NewAction::status_change(
                item.mail_item_id,
                ABANDONED_ACTION,
                item.status,
                MailStatus::Abandoned,
                &staff.email,
            )
        })
        .collect();
    record_actions(pool, &actions).await;

    Ok(HttpResponse::Ok().json(Abandoned {
        success: true,
        updated: updated.len(),
        message: None,
        items: updated,
    }))
}

/// Follow-up dashboard API endpoints
pub fn scope() -> impl HttpServiceFactory {
    web::scope("/follow-ups")
        .service(list)
        .service(mark_abandoned)
}
