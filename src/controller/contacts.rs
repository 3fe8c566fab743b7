use actix_web::dev::HttpServiceFactory;
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};

use serde::Deserialize;

use sqlx::PgPool;

use uuid::Uuid;

use crate::auth::StaffUser;
use crate::domain::{ContactName, EmailAddress, MailboxNumber};
use crate::error::{RestError, RestResult};
use crate::model::{ContactFilter, ContactView, NewContact};
use crate::repo::ContactsRepo;

use super::non_blank;

/// Contact fields as submitted by the front desk
#[derive(Debug, Default, Deserialize)]
pub struct ContactForm {
    contact_person: Option<String>,
    company_name: Option<String>,
    mailbox_number: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    preferred_language: Option<String>,
    display_name_preference: Option<String>,
    status: Option<String>,
    notes: Option<String>,
}

impl TryFrom<ContactForm> for NewContact {
    type Error = String;

    fn try_from(form: ContactForm) -> Result<Self, Self::Error> {
        let contact_person: Option<ContactName> = non_blank(form.contact_person)
            .map(|name| name.parse())
            .transpose()?;
        let company_name: Option<ContactName> = non_blank(form.company_name)
            .map(|name| name.parse())
            .transpose()?;
        if contact_person.is_none() && company_name.is_none() {
            return Err("Either contact person or company name is required".into());
        }

        let mailbox_number: MailboxNumber = non_blank(form.mailbox_number)
            .ok_or("Mailbox number is required")?
            .parse()?;
        let email: Option<EmailAddress> = non_blank(form.email)
            .map(|email| email.parse())
            .transpose()?;

        Ok(Self {
            contact_person,
            company_name,
            mailbox_number,
            email,
            phone: non_blank(form.phone),
            preferred_language: parse_or_default(form.preferred_language)?,
            display_name_preference: parse_or_default(form.display_name_preference)?,
            status: parse_or_default(form.status)?,
            notes: non_blank(form.notes),
        })
    }
}

fn parse_or_default<T>(value: Option<String>) -> Result<T, String>
where
    T: std::str::FromStr<Err = String> + Default,
{
    non_blank(value)
        .map(|value| value.parse())
        .transpose()
        .map(Option::unwrap_or_default)
}

#[derive(Debug, Deserialize)]
pub struct ContactQuery {
    status: Option<String>,
    search: Option<String>,
}

#[tracing::instrument(name = "List contacts", skip(_staff, pool))]
#[get("")]
async fn list(
    _staff: StaffUser,
    query: web::Query<ContactQuery>,
    pool: web::Data<PgPool>,
) -> RestResult<impl Responder> {
    let ContactQuery { status, search } = query.into_inner();
    let filter = ContactFilter {
        status: non_blank(status)
            .map(|status| status.parse())
            .transpose()
            .map_err(RestError::Validation)?,
        search,
    };

    let contacts: Vec<ContactView> = ContactsRepo::list(pool.get_ref(), &filter)
        .await?
        .into_iter()
        .map(ContactView::from)
        .collect();

    Ok(HttpResponse::Ok().json(contacts))
}

#[tracing::instrument(name = "Create a contact", skip(_staff, pool))]
#[post("")]
async fn create(
    _staff: StaffUser,
    form: web::Json<ContactForm>,
    pool: web::Data<PgPool>,
) -> RestResult<impl Responder> {
    let new_contact: NewContact = form.into_inner().try_into().map_err(RestError::Validation)?;

    let contact = ContactsRepo::insert(pool.get_ref(), &new_contact).await?;

    Ok(HttpResponse::Created().json(ContactView::from(contact)))
}

#[tracing::instrument(name = "Fetch a contact", skip(_staff, pool))]
#[get("/{contact_id}")]
async fn fetch(
    _staff: StaffUser,
    path: web::Path<(Uuid,)>,
    pool: web::Data<PgPool>,
) -> RestResult<impl Responder> {
    let (contact_id,) = path.into_inner();

    let contact = ContactsRepo::fetch_by_id(pool.get_ref(), contact_id)
        .await?
        .ok_or_else(|| RestError::not_found("Contact not found"))?;

    Ok(HttpResponse::Ok().json(ContactView::from(contact)))
}

#[tracing::instrument(name = "Update a contact", skip(_staff, pool))]
#[put("/{contact_id}")]
async fn update(
    _staff: StaffUser,
    path: web::Path<(Uuid,)>,
    form: web::Json<ContactForm>,
    pool: web::Data<PgPool>,
) -> RestResult<impl Responder> {
    let (contact_id,) = path.into_inner();
    let contact: NewContact = form.into_inner().try_into().map_err(RestError::Validation)?;

    let contact = ContactsRepo::update(pool.get_ref(), contact_id, &contact)
        .await?
        .ok_or_else(|| RestError::not_found("Contact not found"))?;

    Ok(HttpResponse::Ok().json(ContactView::from(contact)))
}

/// Soft delete: the contact is archived, never removed
#[tracing::instrument(name = "Archive a contact", skip(_staff, pool))]
#[delete("/{contact_id}")]
async fn archive(
    _staff: StaffUser,
    path: web::Path<(Uuid,)>,
    pool: web::Data<PgPool>,
) -> RestResult<impl Responder> {
    let (contact_id,) = path.into_inner();

    let contact = ContactsRepo::archive(pool.get_ref(), contact_id)
        .await?
        .ok_or_else(|| RestError::not_found("Contact not found"))?;

    Ok(HttpResponse::Ok().json(ContactView::from(contact)))
}

/// Contact directory API endpoints
pub fn scope() -> impl HttpServiceFactory {
    web::scope("/contacts")
        .service(list)
        .service(create)
        .service(fetch)
        .service(update)
        .service(archive)
}
