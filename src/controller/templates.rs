use actix_web::dev::HttpServiceFactory;
use actix_web::{get, post, web, HttpResponse, Responder};

use serde::Deserialize;

use sqlx::PgPool;

use crate::auth::StaffUser;
use crate::error::{RestError, RestResult};
use crate::model::NewTemplate;
use crate::repo::TemplatesRepo;

use super::non_blank;

#[derive(Debug, Deserialize)]
pub struct TemplateForm {
    template_name: Option<String>,
    template_type: Option<String>,
    subject_line: Option<String>,
    message_body: Option<String>,
    #[serde(default)]
    is_default: bool,
}

impl TemplateForm {
    /// Templates created through the API belong to the caller
    fn into_template(self, staff: &StaffUser) -> Result<NewTemplate, String> {
        let required = |value: Option<String>, name: &str| {
            non_blank(value).ok_or_else(|| format!("{} is required", name))
        };

        Ok(NewTemplate {
            user_id: Some(staff.user_id),
            template_name: required(self.template_name, "template_name")?,
            template_type: required(self.template_type, "template_type")?,
            subject_line: required(self.subject_line, "subject_line")?,
            // Keep the body exactly as written, line breaks included
            message_body: self
                .message_body
                .filter(|body| !body.trim().is_empty())
                .ok_or("message_body is required")?,
            is_default: self.is_default,
        })
    }
}

/// The caller's own templates plus the shared defaults
#[tracing::instrument(name = "List templates", skip(staff, pool), fields(user_id = %staff.user_id))]
#[get("")]
async fn list(staff: StaffUser, pool: web::Data<PgPool>) -> RestResult<impl Responder> {
    let templates = TemplatesRepo::list_for_user(pool.get_ref(), staff.user_id).await?;

    Ok(HttpResponse::Ok().json(templates))
}

#[tracing::instrument(name = "Create a template", skip(staff, pool))]
#[post("")]
async fn create(
    staff: StaffUser,
    form: web::Json<TemplateForm>,
    pool: web::Data<PgPool>,
) -> RestResult<impl Responder> {
    let template = form
        .into_inner()
        .into_template(&staff)
        .map_err(RestError::Validation)?;

    let template = TemplatesRepo::insert(pool.get_ref(), &template).await?;

    Ok(HttpResponse::Created().json(template))
}

/// Notification template API endpoints
pub fn scope() -> impl HttpServiceFactory {
    web::scope("/templates").service(list).service(create)
}
