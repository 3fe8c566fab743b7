use actix_web::http::header::{self, HeaderMap};

use anyhow::Context;

use crate::crypto::SessionToken;

const BEARER_AUTH_PREFIX: &str = "Bearer ";

/// Extract the session token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> anyhow::Result<SessionToken> {
    let header_value = headers
        .get(header::AUTHORIZATION)
        .context("Missing authorization in header")?
        .to_str()
        .context("Authorization header is not valid text")?;

    let token = header_value
        .strip_prefix(BEARER_AUTH_PREFIX)
        .context("Authorization scheme not bearer")?;

    token
        .parse()
        .map_err(|e| anyhow::anyhow!("Failed to parse bearer token: {}", e))
}
