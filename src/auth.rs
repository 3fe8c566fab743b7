mod bearer;
mod staff_user;

pub use bearer::bearer_token;
pub use staff_user::{caller_key, validate_credentials, StaffUser, TokenTtl};
