use actix_web::dev::HttpServiceFactory;
use actix_web::{get, post, web, HttpResponse, Responder};

use serde::Deserialize;

use sqlx::PgPool;

use uuid::Uuid;

use crate::auth::StaffUser;
use crate::error::{RestError, RestResult};
use crate::model::{NewOutreachMessage, OutreachFilter, EMAIL_CHANNEL};
use crate::repo::{ContactsRepo, OutreachMessagesRepo};

use super::non_blank;

#[derive(Debug, Deserialize)]
pub struct OutreachQuery {
    contact_id: Option<Uuid>,
    mail_item_id: Option<Uuid>,
}

/// A manually logged outreach, e.g. a phone call or a text message
#[derive(Debug, Deserialize)]
pub struct OutreachForm {
    contact_id: Option<Uuid>,
    mail_item_id: Option<Uuid>,
    message_type: Option<String>,
    channel: Option<String>,
    message_content: Option<String>,
    #[serde(default)]
    responded: bool,
    #[serde(default)]
    follow_up_needed: bool,
}

impl TryFrom<OutreachForm> for NewOutreachMessage {
    type Error = String;

    fn try_from(form: OutreachForm) -> Result<Self, Self::Error> {
        Ok(Self {
            contact_id: form.contact_id.ok_or("contact_id is required")?,
            mail_item_id: form.mail_item_id,
            message_type: non_blank(form.message_type).ok_or("message_type is required")?,
            channel: non_blank(form.channel).unwrap_or_else(|| EMAIL_CHANNEL.to_string()),
            message_content: non_blank(form.message_content)
                .ok_or("message_content is required")?,
            responded: form.responded,
            follow_up_needed: form.follow_up_needed,
        })
    }
}

/// Outreach log, newest first
#[tracing::instrument(name = "List outreach messages", skip(_staff, pool))]
#[get("")]
async fn list(
    _staff: StaffUser,
    query: web::Query<OutreachQuery>,
    pool: web::Data<PgPool>,
) -> RestResult<impl Responder> {
    let OutreachQuery {
        contact_id,
        mail_item_id,
    } = query.into_inner();
    let filter = OutreachFilter {
        contact_id,
        mail_item_id,
    };

    let messages = OutreachMessagesRepo::list(pool.get_ref(), &filter).await?;

    Ok(HttpResponse::Ok().json(messages))
}

#[tracing::instrument(name = "Log an outreach message", skip(_staff, pool))]
#[post("")]
async fn create(
    _staff: StaffUser,
    form: web::Json<OutreachForm>,
    pool: web::Data<PgPool>,
) -> RestResult<impl Responder> {
    let pool = pool.get_ref();
    let message: NewOutreachMessage = form.into_inner().try_into().map_err(RestError::Validation)?;

    ContactsRepo::fetch_by_id(pool, message.contact_id)
        .await?
        .ok_or_else(|| RestError::not_found("Contact not found"))?;

    let message = OutreachMessagesRepo::insert(pool, &message).await?;

    Ok(HttpResponse::Created().json(message))
}

/// Outreach log API endpoints
pub fn scope() -> impl HttpServiceFactory {
    web::scope("/outreach-messages")
        .service(list)
        .service(create)
}
