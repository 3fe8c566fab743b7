mod email_client;
mod translation_client;

pub use email_client::{Email, EmailClient};
pub use translation_client::TranslationClient;
