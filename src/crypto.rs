mod signing_key;
mod token;

pub use signing_key::SigningKey;
pub use token::{SessionToken, StaffClaims, TokenError, TokenResult};
