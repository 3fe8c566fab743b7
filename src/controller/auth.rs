use actix_web::dev::HttpServiceFactory;
use actix_web::{post, web, HttpResponse, Responder};

use chrono::{DateTime, Utc};

use secrecy::Secret;

use serde::{Deserialize, Serialize};

use sqlx::PgPool;

use crate::auth::{validate_credentials, TokenTtl};
use crate::crypto::{SessionToken, SigningKey};
use crate::error::{RestError, RestResult};

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    email: String,
    password: Secret<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Exchange staff credentials for a session token
#[tracing::instrument(name = "Staff login", skip(body, pool, signing_key, token_ttl), fields(email = %body.email))]
#[post("/login")]
async fn login(
    body: web::Json<LoginBody>,
    pool: web::Data<PgPool>,
    signing_key: web::Data<SigningKey>,
    token_ttl: web::Data<TokenTtl>,
) -> RestResult<impl Responder> {
    let LoginBody { email, password } = body.into_inner();

    let claims = validate_credentials(pool.get_ref(), &email, password).await?;

    let (token, expires_at) = SessionToken::issue_for(signing_key.get_ref(), claims, token_ttl.0)
        .map_err(|error| {
            tracing::error!(error.cause_chain = ?error, "Failed to sign session token");
            RestError::Internal("Failed to sign token".into())
        })?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        token: token.as_ref().to_string(),
        expires_at,
    }))
}

/// Authentication API endpoints
pub fn scope() -> impl HttpServiceFactory {
    web::scope("/auth").service(login)
}
