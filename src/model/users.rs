use secrecy::Secret;

use uuid::Uuid;

use crate::domain::EmailAddress;

/// New staff account
#[derive(Debug)]
pub struct NewUser {
    pub email: EmailAddress,
    pub password_hash: String,
}

/// Stored login details of a staff account
#[derive(Debug)]
pub struct UserCredentials {
    pub id: Uuid,
    pub email: String,
    pub password_hash: Secret<String>,
}
