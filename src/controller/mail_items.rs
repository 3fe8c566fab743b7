use std::collections::HashMap;

use actix_web::dev::HttpServiceFactory;
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};

use chrono::{DateTime, Utc};

use serde::{Deserialize, Serialize};

use sqlx::PgPool;

use uuid::Uuid;

use crate::auth::StaffUser;
use crate::domain::{ItemType, MailStatus};
use crate::error::{RestError, RestResult};
use crate::model::{
    Contact, MailItem, MailItemFilter, MailItemUpdate, NewAction, NewMailItem, UNKNOWN_CUSTOMER,
};
use crate::repo::{ContactsRepo, MailItemsRepo};

use super::{non_blank, record_actions};

const STATUS_CHANGE_ACTION: &str = "status_change";
const DISMISSED_ACTION: &str = "dismissed";
const RESTORED_ACTION: &str = "restored";
const ARCHIVED_ACTION: &str = "archived";

#[derive(Debug, Deserialize)]
pub struct NewMailItemBody {
    contact_id: Option<Uuid>,
    item_type: Option<String>,
    tracking_number: Option<String>,
    description: Option<String>,
    received_date: Option<DateTime<Utc>>,
    quantity: Option<i32>,
    status: Option<String>,
}

impl TryFrom<NewMailItemBody> for NewMailItem {
    type Error = String;

    fn try_from(body: NewMailItemBody) -> Result<Self, Self::Error> {
        let contact_id = body.contact_id.ok_or("contact_id is required")?;
        let item_type: ItemType = non_blank(body.item_type)
            .ok_or("item_type is required")?
            .parse()?;
        let quantity = validate_quantity(body.quantity.unwrap_or(1))?;
        let status: MailStatus = non_blank(body.status)
            .map(|status| status.parse())
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            contact_id,
            item_type,
            tracking_number: non_blank(body.tracking_number),
            description: non_blank(body.description),
            received_date: body.received_date.unwrap_or_else(Utc::now),
            quantity,
            status,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct MailItemUpdateBody {
    status: Option<String>,
    quantity: Option<i32>,
    tracking_number: Option<String>,
    description: Option<String>,
}

impl TryFrom<MailItemUpdateBody> for MailItemUpdate {
    type Error = String;

    fn try_from(body: MailItemUpdateBody) -> Result<Self, Self::Error> {
        Ok(Self {
            status: non_blank(body.status)
                .map(|status| status.parse())
                .transpose()?,
            quantity: body.quantity.map(validate_quantity).transpose()?,
            tracking_number: non_blank(body.tracking_number),
            description: non_blank(body.description),
        })
    }
}

fn validate_quantity(quantity: i32) -> Result<i32, String> {
    if quantity < 1 {
        return Err("Quantity must be at least 1".into());
    }
    Ok(quantity)
}

/// Reject moves backwards or out of a final status
fn check_transition(from: MailStatus, to: MailStatus) -> RestResult<()> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(RestError::Validation(format!(
            "Cannot change status from {} to {}",
            from, to
        )))
    }
}

#[derive(Debug, Deserialize)]
pub struct MailItemQuery {
    contact_id: Option<Uuid>,
    status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DismissBody {
    dismissed_by: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BulkResult {
    success: bool,
    updated: usize,
    items: Vec<MailItem>,
}

impl BulkResult {
    fn new(items: Vec<MailItem>) -> Self {
        Self {
            success: true,
            updated: items.len(),
            items,
        }
    }
}

#[derive(Debug, Serialize)]
struct ContactSummary {
    contact_id: Uuid,
    display_name: String,
    mailbox_number: String,
}

impl From<&Contact> for ContactSummary {
    fn from(contact: &Contact) -> Self {
        Self {
            contact_id: contact.contact_id,
            display_name: contact
                .display_name()
                .unwrap_or_else(|| UNKNOWN_CUSTOMER.to_string()),
            mailbox_number: contact.mailbox_number.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct DismissedItem {
    #[serde(flatten)]
    item: MailItem,
    contact: Option<ContactSummary>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DismissedItems {
    dismissed_items: Vec<DismissedItem>,
}

#[tracing::instrument(name = "List mail items", skip(_staff, pool))]
#[get("")]
async fn list(
    _staff: StaffUser,
    query: web::Query<MailItemQuery>,
    pool: web::Data<PgPool>,
) -> RestResult<impl Responder> {
    let MailItemQuery { contact_id, status } = query.into_inner();
    let filter = MailItemFilter {
        contact_id,
        status: non_blank(status)
            .map(|status| status.parse())
            .transpose()
            .map_err(RestError::Validation)?,
    };

    let items = MailItemsRepo::list(pool.get_ref(), &filter).await?;

    Ok(HttpResponse::Ok().json(items))
}

#[tracing::instrument(name = "Log a mail item", skip(_staff, pool))]
#[post("")]
async fn create(
    _staff: StaffUser,
    body: web::Json<NewMailItemBody>,
    pool: web::Data<PgPool>,
) -> RestResult<impl Responder> {
    let pool = pool.get_ref();
    let new_item: NewMailItem = body.into_inner().try_into().map_err(RestError::Validation)?;

    ContactsRepo::fetch_by_id(pool, new_item.contact_id)
        .await?
        .ok_or_else(|| RestError::not_found("Contact not found"))?;

    let item = MailItemsRepo::insert(pool, &new_item).await?;

    Ok(HttpResponse::Created().json(item))
}

#[tracing::instrument(name = "Update a mail item", skip(staff, pool))]
#[put("/{mail_item_id}")]
async fn update(
    staff: StaffUser,
    path: web::Path<(Uuid,)>,
    body: web::Json<MailItemUpdateBody>,
    pool: web::Data<PgPool>,
) -> RestResult<impl Responder> {
    let pool = pool.get_ref();
    let (mail_item_id,) = path.into_inner();
    let mut update: MailItemUpdate = body.into_inner().try_into().map_err(RestError::Validation)?;

    let current = MailItemsRepo::fetch_by_id(pool, mail_item_id)
        .await?
        .ok_or_else(|| RestError::not_found("Mail item not found"))?;

    // Resubmitting the current status is not a transition
    if update.status == Some(current.status) && current.status != MailStatus::Notified {
        update.status = None;
    }
    if let Some(status) = update.status {
        check_transition(current.status, status)?;
    }

    let item = MailItemsRepo::update(pool, mail_item_id, &update)
        .await?
        .ok_or_else(|| RestError::not_found("Mail item not found"))?;

    if update.status.is_some() {
        let action = NewAction::status_change(
            mail_item_id,
            STATUS_CHANGE_ACTION,
            current.status,
            item.status,
            &staff.email,
        );
        record_actions(pool, &[action]).await;
    }

    Ok(HttpResponse::Ok().json(item))
}

/// Soft delete
#[tracing::instrument(name = "Archive a mail item", skip(staff, pool))]
#[delete("/{mail_item_id}")]
async fn archive(
    staff: StaffUser,
    path: web::Path<(Uuid,)>,
    pool: web::Data<PgPool>,
) -> RestResult<impl Responder> {
    let pool = pool.get_ref();
    let (mail_item_id,) = path.into_inner();

    let item = MailItemsRepo::archive(pool, mail_item_id)
        .await?
        .ok_or_else(|| RestError::not_found("Mail item not found"))?;

    record_actions(
        pool,
        &[NewAction {
            mail_item_id,
            action_type: ARCHIVED_ACTION.into(),
            action_description: "Mail item archived".into(),
            previous_value: None,
            new_value: None,
            performed_by: staff.email,
            notes: None,
        }],
    )
    .await;

    Ok(HttpResponse::Ok().json(item))
}

#[tracing::instrument(name = "List dismissed mail items", skip(_staff, pool))]
#[get("/dismissed-contacts")]
async fn dismissed_contacts(
    _staff: StaffUser,
    pool: web::Data<PgPool>,
) -> RestResult<impl Responder> {
    let pool = pool.get_ref();

    let items = MailItemsRepo::fetch_dismissed(pool).await?;
    let mut contact_ids: Vec<Uuid> = items.iter().map(|item| item.contact_id).collect();
    contact_ids.sort();
    contact_ids.dedup();

    let contacts: HashMap<Uuid, Contact> = ContactsRepo::fetch_by_ids(pool, &contact_ids)
        .await?
        .into_iter()
        .map(|contact| (contact.contact_id, contact))
        .collect();

    let dismissed_items = items
        .into_iter()
        .map(|item| DismissedItem {
            contact: contacts.get(&item.contact_id).map(ContactSummary::from),
            item,
        })
        .collect();

    Ok(HttpResponse::Ok().json(DismissedItems { dismissed_items }))
}

/// Hide an item from the follow-up dashboard without changing its status
#[tracing::instrument(name = "Dismiss a mail item", skip(staff, body, pool))]
#[post("/dismiss-item/{mail_item_id}")]
async fn dismiss_item(
    staff: StaffUser,
    path: web::Path<(Uuid,)>,
    body: Option<web::Json<DismissBody>>,
    pool: web::Data<PgPool>,
) -> RestResult<impl Responder> {
    let pool = pool.get_ref();
    let (mail_item_id,) = path.into_inner();
    let dismissed_by = body
        .and_then(|body| non_blank(body.into_inner().dismissed_by))
        .unwrap_or_else(|| staff.email.clone());

    let items = MailItemsRepo::dismiss(pool, &[mail_item_id], &dismissed_by).await?;
    if items.is_empty() {
        return Err(RestError::not_found("Mail item not found"));
    }

    record_actions(pool, &dismissal_actions(&items, &staff.email)).await;

    Ok(HttpResponse::Ok().json(BulkResult::new(items)))
}

#[tracing::instrument(name = "Restore a dismissed mail item", skip(staff, pool))]
#[post("/restore-item/{mail_item_id}")]
async fn restore_item(
    staff: StaffUser,
    path: web::Path<(Uuid,)>,
    pool: web::Data<PgPool>,
) -> RestResult<impl Responder> {
    let pool = pool.get_ref();
    let (mail_item_id,) = path.into_inner();

    let item = MailItemsRepo::restore(pool, mail_item_id)
        .await?
        .ok_or_else(|| RestError::not_found("Mail item not found"))?;

    let actions = restoration_actions(std::slice::from_ref(&item), &staff.email);
    record_actions(pool, &actions).await;

    Ok(HttpResponse::Ok().json(item))
}

/// Bring every dismissed item of a contact back to follow-up
#[tracing::instrument(name = "Restore a contact's mail items", skip(staff, pool))]
#[post("/restore-contact/{contact_id}")]
async fn restore_contact(
    staff: StaffUser,
    path: web::Path<(Uuid,)>,
    pool: web::Data<PgPool>,
) -> RestResult<impl Responder> {
    let pool = pool.get_ref();
    let (contact_id,) = path.into_inner();

    let items = MailItemsRepo::restore_for_contact(pool, contact_id).await?;
    record_actions(pool, &restoration_actions(&items, &staff.email)).await;

    Ok(HttpResponse::Ok().json(BulkResult::new(items)))
}

#[tracing::instrument(name = "Resolve a mail item", skip(staff, pool))]
#[post("/resolve-item/{mail_item_id}")]
async fn resolve_item(
    staff: StaffUser,
    path: web::Path<(Uuid,)>,
    pool: web::Data<PgPool>,
) -> RestResult<impl Responder> {
    let pool = pool.get_ref();
    let (mail_item_id,) = path.into_inner();

    let current = MailItemsRepo::fetch_by_id(pool, mail_item_id)
        .await?
        .ok_or_else(|| RestError::not_found("Mail item not found"))?;
    check_transition(current.status, MailStatus::Resolved)?;

    let items = resolve(pool, &[current], &staff.email).await?;

    Ok(HttpResponse::Ok().json(BulkResult::new(items)))
}

/// Dismiss every follow-up item of a contact
#[tracing::instrument(name = "Dismiss a contact's mail items", skip(staff, body, pool))]
#[post("/dismiss-contact/{contact_id}")]
async fn dismiss_contact(
    staff: StaffUser,
    path: web::Path<(Uuid,)>,
    body: Option<web::Json<DismissBody>>,
    pool: web::Data<PgPool>,
) -> RestResult<impl Responder> {
    let pool = pool.get_ref();
    let (contact_id,) = path.into_inner();
    let dismissed_by = body
        .and_then(|body| non_blank(body.into_inner().dismissed_by))
        .unwrap_or_else(|| staff.email.clone());

    let ids: Vec<Uuid> = MailItemsRepo::fetch_follow_ups_for_contact(pool, contact_id)
        .await?
        .iter()
        .map(|item| item.mail_item_id)
        .collect();

    let items = MailItemsRepo::dismiss(pool, &ids, &dismissed_by).await?;
    record_actions(pool, &dismissal_actions(&items, &staff.email)).await;

    Ok(HttpResponse::Ok().json(BulkResult::new(items)))
}

/// Resolve every item of a contact still awaiting pickup, dismissed or not
#[tracing::instrument(name = "Resolve a contact's mail items", skip(staff, pool))]
#[post("/resolve-contact/{contact_id}")]
async fn resolve_contact(
    staff: StaffUser,
    path: web::Path<(Uuid,)>,
    pool: web::Data<PgPool>,
) -> RestResult<impl Responder> {
    let pool = pool.get_ref();
    let (contact_id,) = path.into_inner();

    let filter = MailItemFilter {
        contact_id: Some(contact_id),
        status: None,
    };
    let pending: Vec<MailItem> = MailItemsRepo::list(pool, &filter)
        .await?
        .into_iter()
        .filter(|item| item.status.awaits_pickup())
        .collect();

    let items = resolve(pool, &pending, &staff.email).await?;

    Ok(HttpResponse::Ok().json(BulkResult::new(items)))
}

async fn resolve(
    pool: &PgPool,
    items: &[MailItem],
    performed_by: &str,
) -> RestResult<Vec<MailItem>> {
    let ids: Vec<Uuid> = items.iter().map(|item| item.mail_item_id).collect();
    let resolved = MailItemsRepo::set_status(pool, &ids, MailStatus::Resolved).await?;

    let actions: Vec<NewAction> = items
        .iter()
        .map(|item| {
            NewAction::status_change(
                item.mail_item_id,
                STATUS_CHANGE_ACTION,
                item.status,
                MailStatus::Resolved,
                performed_by,
            )
        })
        .collect();
    record_actions(pool, &actions).await;

    Ok(resolved)
}

fn dismissal_actions(items: &[MailItem], performed_by: &str) -> Vec<NewAction> {
    items
        .iter()
        .map(|item| NewAction {
            mail_item_id: item.mail_item_id,
            action_type: DISMISSED_ACTION.into(),
            action_description: "Dismissed from follow-up".into(),
            previous_value: None,
            new_value: item.dismissed_by.clone(),
            performed_by: performed_by.to_string(),
            notes: None,
        })
        .collect()
}

fn restoration_actions(items: &[MailItem], performed_by: &str) -> Vec<NewAction> {
    items
        .iter()
        .map(|item| NewAction {
            mail_item_id: item.mail_item_id,
            action_type: RESTORED_ACTION.into(),
            action_description: "Restored to follow-up".into(),
            previous_value: None,
            new_value: None,
            performed_by: performed_by.to_string(),
            notes: None,
        })
        .collect()
}

/// Mail item API endpoints
pub fn scope() -> impl HttpServiceFactory {
    web::scope("/mail-items")
        .service(dismissed_contacts)
        .service(dismiss_item)
        .service(restore_item)
        .service(resolve_item)
        .service(dismiss_contact)
        .service(restore_contact)
        .service(resolve_contact)
        .service(list)
        .service(create)
        .service(update)
        .service(archive)
}
