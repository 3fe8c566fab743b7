mod action_history;
mod contacts;
mod fees;
mod mail_items;
mod outreach;
mod templates;
mod users;

pub use action_history::*;
pub use contacts::*;
pub use fees::*;
pub use mail_items::*;
pub use outreach::*;
pub use templates::*;
pub use users::*;
