use serde::Serialize;

use sqlx::PgPool;

use thiserror::Error;

use uuid::Uuid;

use crate::client::{Email, EmailClient};
use crate::domain::{long_date, EmailAddress};
use crate::error::RestError;
use crate::model::{
    Contact, MailItem, NewAction, NewOutreachMessage, OutreachMessage, EMAIL_CHANNEL,
};
use crate::repo::{
    ActionHistoryRepo, ContactsRepo, MailItemsRepo, OutreachMessagesRepo, TemplatesRepo,
};
use crate::template::{resolve, TemplateVariables};

/// Salutation used when a contact has no name on file
const FALLBACK_CUSTOMER_NAME: &str = "Customer";
const CUSTOM_MESSAGE_TYPE: &str = "Custom";
const NOTIFIED_ACTION: &str = "notified";

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Contact not found")]
    ContactNotFound,

    #[error("Contact has no email address")]
    MissingEmail,

    #[error("Template not found")]
    TemplateNotFound,

    #[error("Mail item not found")]
    MailItemNotFound,

    #[error("Failed to send email")]
    Transport(#[from] reqwest::Error),

    #[error("Database error")]
    Database(#[from] sqlx::Error),
}

impl From<NotifyError> for RestError {
    fn from(e: NotifyError) -> Self {
        match e {
            NotifyError::ContactNotFound
            | NotifyError::TemplateNotFound
            | NotifyError::MailItemNotFound => RestError::NotFound(e.to_string()),
            NotifyError::MissingEmail => RestError::Validation(e.to_string()),
            NotifyError::Transport(e) => {
                tracing::error!(error.cause_chain = ?e, "Email transport failed");
                RestError::Transport(e)
            }
            NotifyError::Database(e) => e.into(),
        }
    }
}

/// A templated notification to one contact
#[derive(Debug)]
pub struct Notification {
    pub contact_id: Uuid,
    pub mail_item_id: Option<Uuid>,
    pub template_id: Uuid,
    /// Defaults to the template type
    pub message_type: Option<String>,
    pub custom_variables: TemplateVariables,
    pub performed_by: String,
}

/// A free-form email, optionally tied to a contact for the outreach log
#[derive(Debug)]
pub struct CustomEmail {
    pub to: EmailAddress,
    pub subject: String,
    pub body: String,
    pub contact_id: Option<Uuid>,
    pub mail_item_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SentNotification {
    pub sent_to: String,
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outreach_message: Option<OutreachMessage>,
}

/// Variables describing a contact and, optionally, one of their mail items.
///
/// Both naming styles are provided so older templates keep working.
pub fn build_variables(contact: &Contact, item: Option<&MailItem>) -> TemplateVariables {
    let name = contact
        .display_name()
        .unwrap_or_else(|| FALLBACK_CUSTOMER_NAME.to_string());

    let mut variables = TemplateVariables::new();
    variables.insert("CUSTOMER_NAME", name.clone());
    variables.insert("Name", name);
    variables.insert("MAILBOX_NUMBER", contact.mailbox_number.clone());
    variables.insert("BoxNumber", contact.mailbox_number.clone());
    variables.insert("CONTACT_EMAIL", contact.email.clone().unwrap_or_default());

    if let Some(item) = item {
        let received = long_date(item.received_date);
        variables.insert("MAIL_TYPE", item.item_type.to_string());
        variables.insert(
            "TRACKING_NUMBER",
            item.tracking_number.clone().unwrap_or_default(),
        );
        variables.insert("RECEIVED_DATE", received.clone());
        variables.insert("Date", received);
        variables.insert("QUANTITY", i64::from(item.quantity.max(1)));
        variables.insert("STATUS", item.status.to_string());
    }

    variables
}

/// Compose a templated email for a contact, send it, then record it.
///
/// Recording is best effort: once the email has left, failures writing the
/// outreach log or bumping the mail item are logged and ignored.
#[tracing::instrument(name = "Send notification", skip(pool, email_client, notification), fields(contact_id = %notification.contact_id))]
pub async fn send_notification(
    pool: &PgPool,
    email_client: &EmailClient,
    notification: Notification,
) -> Result<SentNotification, NotifyError> {
    let contact = ContactsRepo::fetch_by_id(pool, notification.contact_id)
        .await?
        .ok_or(NotifyError::ContactNotFound)?;
    let recipient: EmailAddress = contact
        .email
        .as_deref()
        .and_then(|email| email.parse().ok())
        .ok_or(NotifyError::MissingEmail)?;
    let template = TemplatesRepo::fetch_by_id(pool, notification.template_id)
        .await?
        .ok_or(NotifyError::TemplateNotFound)?;
    let item = match notification.mail_item_id {
        Some(id) => Some(
            MailItemsRepo::fetch_by_id(pool, id)
                .await?
                .ok_or(NotifyError::MailItemNotFound)?,
        ),
        None => None,
    };

    let mut variables = build_variables(&contact, item.as_ref());
    variables.merge(notification.custom_variables);

    let subject = resolve(&template.subject_line, &variables);
    let body = resolve(&template.message_body, &variables);

    let email = Email::from_text(recipient.clone(), subject.clone(), body.clone());
    email_client.send(&email).await?;

    let message_type = notification
        .message_type
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(template.template_type);
    let outreach_message = record_outreach(
        pool,
        NewOutreachMessage {
            contact_id: contact.contact_id,
            mail_item_id: item.as_ref().map(|item| item.mail_item_id),
            message_type,
            channel: EMAIL_CHANNEL.into(),
            message_content: body,
            responded: false,
            follow_up_needed: true,
        },
    )
    .await;

    if let Some(item) = item {
        record_notified(pool, &item, &notification.performed_by).await;
    }

    Ok(SentNotification {
        sent_to: recipient.to_string(),
        subject,
        outreach_message,
    })
}

/// Send a free-form email; logged as `Custom` outreach when a contact is given
#[tracing::instrument(name = "Send custom email", skip(pool, email_client, custom), fields(recipient = %custom.to))]
pub async fn send_custom_email(
    pool: &PgPool,
    email_client: &EmailClient,
    custom: CustomEmail,
) -> Result<SentNotification, NotifyError> {
    let email = Email::from_text(custom.to.clone(), custom.subject.clone(), custom.body.clone());
    email_client.send(&email).await?;

    let outreach_message = match custom.contact_id {
        Some(contact_id) => {
            record_outreach(
                pool,
                NewOutreachMessage {
                    contact_id,
                    mail_item_id: custom.mail_item_id,
                    message_type: CUSTOM_MESSAGE_TYPE.into(),
                    channel: EMAIL_CHANNEL.into(),
                    message_content: custom.body,
                    responded: false,
                    follow_up_needed: false,
                },
            )
            .await
        }
        None => None,
    };

    Ok(SentNotification {
        sent_to: custom.to.to_string(),
        subject: custom.subject,
        outreach_message,
    })
}

async fn record_outreach(pool: &PgPool, message: NewOutreachMessage) -> Option<OutreachMessage> {
    match OutreachMessagesRepo::insert(pool, &message).await {
        Ok(message) => Some(message),
        Err(error) => {
            tracing::error!(
                error.cause_chain = ?error,
                "Email sent but the outreach message was not recorded (contact: {})",
                message.contact_id
            );
            None
        }
    }
}

async fn record_notified(pool: &PgPool, item: &MailItem, performed_by: &str) {
    let notified = match MailItemsRepo::mark_notified(pool, item.mail_item_id).await {
        Ok(Some(notified)) => notified,
        Ok(None) => {
            tracing::info!(
                "Mail item {} is no longer awaiting pickup, status left as {}",
                item.mail_item_id,
                item.status
            );
            return;
        }
        Err(error) => {
            tracing::error!(
                error.cause_chain = ?error,
                "Email sent but mail item {} was not marked notified",
                item.mail_item_id
            );
            return;
        }
    };

    let action = NewAction::status_change(
        item.mail_item_id,
        NOTIFIED_ACTION,
        item.status,
        notified.status,
        performed_by,
    );
    if let Err(error) = ActionHistoryRepo::insert(pool, &action).await {
        tracing::warn!(
            error.cause_chain = ?error,
            "Failed to record notification of mail item {}",
            item.mail_item_id
        );
    }
}
