use actix_web::dev::HttpServiceFactory;
use actix_web::{get, post, web, HttpResponse, Responder};

use serde::Deserialize;

use sqlx::PgPool;

use uuid::Uuid;

use crate::auth::StaffUser;
use crate::error::{RestError, RestResult};
use crate::model::NewAction;
use crate::repo::{ActionHistoryRepo, MailItemsRepo};

use super::non_blank;

#[derive(Debug, Deserialize)]
pub struct ActionForm {
    mail_item_id: Option<Uuid>,
    action_type: Option<String>,
    action_description: Option<String>,
    previous_value: Option<String>,
    new_value: Option<String>,
    performed_by: Option<String>,
    notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BulkActionForm {
    actions: Vec<ActionForm>,
}

impl ActionForm {
    /// `performed_by` defaults to the signed-in staff member
    fn into_action(self, staff: &StaffUser) -> Result<NewAction, String> {
        Ok(NewAction {
            mail_item_id: self.mail_item_id.ok_or("mail_item_id is required")?,
            action_type: non_blank(self.action_type).ok_or("action_type is required")?,
            action_description: non_blank(self.action_description)
                .ok_or("action_description is required")?,
            previous_value: non_blank(self.previous_value),
            new_value: non_blank(self.new_value),
            performed_by: non_blank(self.performed_by).unwrap_or_else(|| staff.email.clone()),
            notes: non_blank(self.notes),
        })
    }
}

/// History of one mail item, newest first
#[tracing::instrument(name = "List action history", skip(_staff, pool))]
#[get("/{mail_item_id}")]
async fn list_for_item(
    _staff: StaffUser,
    path: web::Path<(Uuid,)>,
    pool: web::Data<PgPool>,
) -> RestResult<impl Responder> {
    let (mail_item_id,) = path.into_inner();

    let history = ActionHistoryRepo::list_for_item(pool.get_ref(), mail_item_id).await?;

    Ok(HttpResponse::Ok().json(history))
}

#[tracing::instrument(name = "Record an action", skip(staff, pool))]
#[post("")]
async fn create(
    staff: StaffUser,
    form: web::Json<ActionForm>,
    pool: web::Data<PgPool>,
) -> RestResult<impl Responder> {
    let pool = pool.get_ref();
    let action = form
        .into_inner()
        .into_action(&staff)
        .map_err(RestError::Validation)?;

    MailItemsRepo::fetch_by_id(pool, action.mail_item_id)
        .await?
        .ok_or_else(|| RestError::not_found("Mail item not found"))?;

    let record = ActionHistoryRepo::insert(pool, &action).await?;

    Ok(HttpResponse::Created().json(record))
}

/// Record several actions at once; either all are stored or none
#[tracing::instrument(name = "Record actions in bulk", skip(staff, form, pool), fields(count = form.actions.len()))]
#[post("/bulk")]
async fn create_bulk(
    staff: StaffUser,
    form: web::Json<BulkActionForm>,
    pool: web::Data<PgPool>,
) -> RestResult<impl Responder> {
    let actions = form
        .into_inner()
        .actions
        .into_iter()
        .map(|action| action.into_action(&staff))
        .collect::<Result<Vec<_>, _>>()
        .map_err(RestError::Validation)?;
    if actions.is_empty() {
        return Err(RestError::validation("At least one action is required"));
    }

    let mut tx = pool.begin().await?;
    let records = ActionHistoryRepo::insert_many(&mut *tx, &actions).await?;
    tx.commit().await?;

    Ok(HttpResponse::Created().json(records))
}

/// Action history API endpoints
pub fn scope() -> impl HttpServiceFactory {
    web::scope("/action-history")
        .service(create_bulk)
        .service(create)
        .service(list_for_item)
}
