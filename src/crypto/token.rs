use std::str::FromStr;

use chrono::{DateTime, Duration, TimeZone, Utc};

use serde::{Deserialize, Serialize};

use uuid::Uuid;

use base64::{
    alphabet,
    engine::{self, general_purpose},
    Engine as _,
};

use super::SigningKey;

lazy_static::lazy_static! {
    static ref BASE64_ENGINE: engine::GeneralPurpose =
        engine::GeneralPurpose::new(&alphabet::URL_SAFE, general_purpose::NO_PAD);
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("Token signature does not match")]
    SignatureMismatch,
    #[error("Token is expired")]
    Expired,
    #[error("Failed to decode or encode token")]
    Malformed,
}

impl From<std::str::Utf8Error> for TokenError {
    fn from(_e: std::str::Utf8Error) -> Self {
        Self::Malformed
    }
}

impl From<serde_json::Error> for TokenError {
    fn from(_e: serde_json::Error) -> Self {
        Self::Malformed
    }
}

impl From<base64::DecodeError> for TokenError {
    fn from(_e: base64::DecodeError) -> Self {
        Self::Malformed
    }
}

pub type TokenResult<T> = Result<T, TokenError>;

/// Identity of the staff member a session token was issued to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffClaims {
    pub user_id: Uuid,
    pub email: String,
}

/// Signed bearer token of the form `<base64 message>.<base64 signature>`
#[derive(Debug, Clone, PartialEq)]
pub struct SessionToken(String);

#[derive(Debug, Serialize, Deserialize)]
struct TokenMessage {
    exp: i64,
    data: StaffClaims,
}

impl SessionToken {
    /// Issue a token for `claims` that expires at `expires_at`
    pub fn issue(
        key: &SigningKey,
        claims: StaffClaims,
        expires_at: DateTime<Utc>,
    ) -> TokenResult<Self> {
        let msg = serde_json::to_string(&TokenMessage {
            exp: expires_at.timestamp(),
            data: claims,
        })?;
        let sig = key.sign(msg.as_bytes());

        Ok(Self(format!(
            "{}.{}",
            BASE64_ENGINE.encode(msg),
            BASE64_ENGINE.encode(sig)
        )))
    }

    /// Issue a token that expires after `ttl`
    pub fn issue_for(
        key: &SigningKey,
        claims: StaffClaims,
        ttl: Duration,
    ) -> TokenResult<(Self, DateTime<Utc>)> {
        let expires_at = Utc::now() + ttl;
        Ok((Self::issue(key, claims, expires_at)?, expires_at))
    }

    /// Check the signature and expiry, yielding the staff claims
    pub fn verify(&self, key: &SigningKey) -> TokenResult<StaffClaims> {
        self.verify_at(key, Utc::now())
    }

    fn verify_at(&self, key: &SigningKey, now: DateTime<Utc>) -> TokenResult<StaffClaims> {
        let (msg, sig) = self.0.split_once('.').ok_or(TokenError::Malformed)?;
        let msg = BASE64_ENGINE.decode(msg)?;
        let sig = BASE64_ENGINE.decode(sig)?;

        if !key.verify(&msg, &sig) {
            return Err(TokenError::SignatureMismatch);
        }

        let msg: TokenMessage = serde_json::from_str(std::str::from_utf8(&msg)?)?;
        // Unrepresentable timestamps count as expired
        let expired = Utc
            .timestamp_opt(msg.exp, 0)
            .earliest()
            .map_or(true, |exp| now >= exp);
        if expired {
            Err(TokenError::Expired)
        } else {
            Ok(msg.data)
        }
    }
}

impl AsRef<str> for SessionToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for SessionToken {
    type Err = TokenError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let token = token.trim();
        if token.is_empty() {
            return Err(TokenError::Malformed);
        }
        Ok(Self(token.to_string()))
    }
}
