use actix_web::dev::HttpServiceFactory;
use actix_web::{get, post, web, HttpResponse, Responder};

use serde::{Deserialize, Serialize};

use serde_json::Value;

use crate::auth::StaffUser;
use crate::client::TranslationClient;
use crate::error::{RestError, RestResult};
use crate::ratelimit::{Quota, TranslateRoutes};

pub const MAX_TEXT_LEN: usize = 10_000;

const NOT_CONFIGURED: &str =
    "Translation service is not configured. Please contact the administrator.";
const TRANSLATION_FAILED: &str = "Translation failed. Please try again.";

#[derive(Debug, Default, Deserialize)]
pub struct TranslateBody {
    #[serde(default)]
    text: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Translated {
    translated_text: String,
    success: bool,
    original_length: usize,
    translated_length: usize,
}

#[derive(Debug, Serialize)]
struct TranslationStatus {
    success: bool,
    available: bool,
}

/// Check the text to translate, returning it unchanged when valid
fn validate_text(text: Value) -> Result<String, String> {
    let text = match text {
        Value::Null => return Err("Text is required".into()),
        Value::String(text) if text.is_empty() => return Err("Text is required".into()),
        Value::String(text) => text,
        _ => return Err("Text must be a string".into()),
    };
    if text.trim().is_empty() {
        return Err("Text cannot be empty".into());
    }
    if text.chars().count() > MAX_TEXT_LEN {
        return Err("Text exceeds maximum length of 10,000 characters".into());
    }
    Ok(text)
}

/// Translate English text to Simplified Chinese
#[tracing::instrument(name = "Translate text", skip(_quota, _staff, body, translator))]
#[post("")]
async fn translate(
    _quota: Quota<TranslateRoutes>,
    _staff: StaffUser,
    body: Option<web::Json<TranslateBody>>,
    translator: web::Data<Option<TranslationClient>>,
) -> RestResult<impl Responder> {
    let body = body.map(web::Json::into_inner).unwrap_or_default();
    let text = validate_text(body.text).map_err(RestError::Validation)?;

    let translator = translator
        .get_ref()
        .as_ref()
        .ok_or_else(|| RestError::Unavailable(NOT_CONFIGURED.into()))?;

    let translated_text = translator.translate(&text).await.map_err(|error| {
        tracing::error!(error.cause_chain = ?error, "Translation provider failed");
        RestError::Internal(TRANSLATION_FAILED.into())
    })?;

    Ok(HttpResponse::Ok().json(Translated {
        original_length: text.chars().count(),
        translated_length: translated_text.chars().count(),
        translated_text,
        success: true,
    }))
}

#[tracing::instrument(name = "Translation status", skip(_staff, translator))]
#[get("/status")]
async fn status(
    _staff: StaffUser,
    translator: web::Data<Option<TranslationClient>>,
) -> RestResult<impl Responder> {
    Ok(HttpResponse::Ok().json(TranslationStatus {
        success: true,
        available: translator.get_ref().is_some(),
    }))
}

/// Translation API endpoints
pub fn scope() -> impl HttpServiceFactory {
    web::scope("/translate").service(translate).service(status)
}
