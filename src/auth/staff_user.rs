use std::future::Future;
use std::pin::Pin;

use actix_web::{dev, web, FromRequest, HttpRequest};

use anyhow::Context;

use argon2::{Argon2, PasswordHash, PasswordVerifier};

use secrecy::Secret;

use sqlx::PgPool;

use uuid::Uuid;

use crate::crypto::{SigningKey, StaffClaims};
use crate::domain::EmailAddress;
use crate::error::{RestError, RestResult};
use crate::repo::UsersRepo;
use crate::telemetry::spawn_blocking_with_tracing;

use super::bearer_token;

const INVALID_LOGIN: &str = "Invalid email or password";

/// Lifetime of issued session tokens
#[derive(Debug, Clone, Copy)]
pub struct TokenTtl(pub chrono::Duration);

/// An authenticated staff member, taken from the bearer token of a request
#[derive(Debug, Clone)]
pub struct StaffUser {
    pub user_id: Uuid,
    pub email: String,
}

impl StaffUser {
    /// Key identifying this caller to the rate limiters
    pub fn rate_limit_key(&self) -> String {
        self.user_id.to_string()
    }
}

impl From<StaffClaims> for StaffUser {
    fn from(claims: StaffClaims) -> Self {
        Self {
            user_id: claims.user_id,
            email: claims.email,
        }
    }
}

impl FromRequest for StaffUser {
    type Error = RestError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            // Registered with the application at startup
            let signing_key = req
                .app_data::<web::Data<SigningKey>>()
                .ok_or_else(|| RestError::Internal("Signing key not registered".into()))?;

            let token = bearer_token(req.headers()).map_err(|error| {
                tracing::debug!(error.cause_chain = ?error, "Rejected request without bearer token");
                RestError::Unauthorized("Authentication required".into())
            })?;

            let claims = token.verify(signing_key.get_ref()).map_err(|error| {
                tracing::debug!(error.cause_chain = ?error, "Rejected session token");
                RestError::Unauthorized("Invalid or expired token".into())
            })?;

            Ok(claims.into())
        })
    }
}

/// Key identifying a caller to the rate limiters: the staff user id when the
/// request carries a valid token, the peer address otherwise
pub fn caller_key(req: &HttpRequest) -> String {
    let claims = req
        .app_data::<web::Data<SigningKey>>()
        .and_then(|key| bearer_token(req.headers()).ok()?.verify(key.get_ref()).ok());

    match claims {
        Some(claims) => StaffUser::from(claims).rate_limit_key(),
        None => req
            .peer_addr()
            .map(|addr| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".into()),
    }
}

/// Check a staff login, returning the claims to put in a session token
#[tracing::instrument("Validate credentials", skip(pool, password))]
pub async fn validate_credentials(
    pool: &PgPool,
    email: &str,
    password: Secret<String>,
) -> RestResult<StaffClaims> {
    let unauthorized = || RestError::Unauthorized(INVALID_LOGIN.into());

    let email: EmailAddress = email.parse().map_err(|_| unauthorized())?;

    let user = UsersRepo::fetch_credentials_by_email(pool, &email)
        .await?
        .ok_or_else(unauthorized)?;

    let verified = spawn_blocking_with_tracing(move || {
        verify_password_hash(password, user.password_hash)
    })
    .await
    .context("Failed to spawn blocking task")?;

    verified.map_err(|error| {
        tracing::info!(error.cause_chain = ?error, "Failed login attempt");
        unauthorized()
    })?;

    Ok(StaffClaims {
        user_id: user.id,
        email: user.email,
    })
}

#[tracing::instrument("Verify password hash", skip(password, password_hash))]
fn verify_password_hash(
    password: Secret<String>,
    password_hash: Secret<String>,
) -> anyhow::Result<()> {
    use secrecy::ExposeSecret;

    let password_hash = PasswordHash::new(password_hash.expose_secret())
        .context("Failed to parse stored password hash")?;

    Argon2::default()
        .verify_password(password.expose_secret().as_bytes(), &password_hash)
        .context("Failed to verify password hash")
}
