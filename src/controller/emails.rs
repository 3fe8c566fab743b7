use actix_web::dev::HttpServiceFactory;
use actix_web::{post, web, HttpResponse, Responder};

use serde::{Deserialize, Serialize};

use sqlx::PgPool;

use uuid::Uuid;

use crate::auth::StaffUser;
use crate::client::EmailClient;
use crate::domain::EmailAddress;
use crate::error::{RestError, RestResult};
use crate::notification::{
    send_custom_email, send_notification, CustomEmail, Notification, SentNotification,
};
use crate::ratelimit::{EmailRoutes, Quota};
use crate::template::TemplateVariables;

use super::non_blank;

#[derive(Debug, Deserialize)]
pub struct SendBody {
    contact_id: Option<Uuid>,
    template_id: Option<Uuid>,
    mail_item_id: Option<Uuid>,
    message_type: Option<String>,
    #[serde(default)]
    custom_variables: TemplateVariables,
}

impl SendBody {
    fn into_notification(self, performed_by: String) -> Result<Notification, String> {
        match (self.contact_id, self.template_id) {
            (Some(contact_id), Some(template_id)) => Ok(Notification {
                contact_id,
                mail_item_id: self.mail_item_id,
                template_id,
                message_type: non_blank(self.message_type),
                custom_variables: self.custom_variables,
                performed_by,
            }),
            _ => Err("contact_id and template_id are required".into()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SendCustomBody {
    to: Option<String>,
    subject: Option<String>,
    body: Option<String>,
    contact_id: Option<Uuid>,
    mail_item_id: Option<Uuid>,
}

impl TryFrom<SendCustomBody> for CustomEmail {
    type Error = String;

    fn try_from(body: SendCustomBody) -> Result<Self, Self::Error> {
        let (to, subject, text) = match (
            non_blank(body.to),
            non_blank(body.subject),
            body.body.filter(|text| !text.trim().is_empty()),
        ) {
            (Some(to), Some(subject), Some(text)) => (to, subject, text),
            _ => return Err("to, subject, and body are required".into()),
        };
        let to: EmailAddress = to.parse()?;

        Ok(Self {
            to,
            subject,
            body: text,
            contact_id: body.contact_id,
            mail_item_id: body.mail_item_id,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendResponse {
    success: bool,
    #[serde(flatten)]
    sent: SentNotification,
}

impl From<SentNotification> for SendResponse {
    fn from(sent: SentNotification) -> Self {
        Self {
            success: true,
            sent,
        }
    }
}

/// Send a templated notification to a contact
#[tracing::instrument(name = "Send a templated email", skip(_quota, staff, pool, email_client))]
#[post("/send")]
async fn send(
    _quota: Quota<EmailRoutes>,
    staff: StaffUser,
    body: web::Json<SendBody>,
    pool: web::Data<PgPool>,
    email_client: web::Data<EmailClient>,
) -> RestResult<impl Responder> {
    let notification = body
        .into_inner()
        .into_notification(staff.email)
        .map_err(RestError::Validation)?;

    let sent = send_notification(pool.get_ref(), email_client.get_ref(), notification).await?;

    Ok(HttpResponse::Ok().json(SendResponse::from(sent)))
}

/// Send a free-form email
#[tracing::instrument(name = "Send a custom email", skip(_quota, _staff, pool, email_client))]
#[post("/send-custom")]
async fn send_custom(
    _quota: Quota<EmailRoutes>,
    _staff: StaffUser,
    body: web::Json<SendCustomBody>,
    pool: web::Data<PgPool>,
    email_client: web::Data<EmailClient>,
) -> RestResult<impl Responder> {
    let custom: CustomEmail = body.into_inner().try_into().map_err(RestError::Validation)?;

    let sent = send_custom_email(pool.get_ref(), email_client.get_ref(), custom).await?;

    Ok(HttpResponse::Ok().json(SendResponse::from(sent)))
}

/// Email API endpoints
pub fn scope() -> impl HttpServiceFactory {
    web::scope("/emails").service(send).service(send_custom)
}
