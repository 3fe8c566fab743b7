mod action_history;
mod contacts;
mod fees;
mod mail_items;
mod outreach;
mod templates;
mod users;

pub use action_history::ActionHistoryRepo;
pub use contacts::ContactsRepo;
pub use fees::FeesRepo;
pub use mail_items::MailItemsRepo;
pub use outreach::OutreachMessagesRepo;
pub use templates::TemplatesRepo;
pub use users::UsersRepo;

/// Bind a validated domain string as plain text
pub(crate) fn text<T: AsRef<str>>(value: &T) -> &str {
    value.as_ref()
}

pub(crate) fn opt_text<T: AsRef<str>>(value: &Option<T>) -> Option<&str> {
    value.as_ref().map(|v| v.as_ref())
}
