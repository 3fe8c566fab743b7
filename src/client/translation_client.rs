use std::time::Duration;

use reqwest::Client;

use serde::{Deserialize, Serialize};

use secrecy::Secret;

use url::Url;

const SOURCE_LANGUAGE: &str = "en";
const TARGET_LANGUAGE: &str = "zh";

/// REST client for the English to Chinese translation service
#[derive(Debug)]
pub struct TranslationClient {
    client: Client,

    api_translate_url: Url,
    api_key: Secret<String>,
}

impl TranslationClient {
    pub fn new(
        api_timeout: Duration,
        api_base_url: Url,
        api_key: Secret<String>,
    ) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(api_timeout).build()?;

        let api_translate_url = api_base_url.join("translate")?;

        Ok(Self {
            client,
            api_translate_url,
            api_key,
        })
    }

    /// Translate English text to Simplified Chinese
    #[tracing::instrument(name = "Translate text via API", skip(self, text), fields(text_length = text.len()))]
    pub async fn translate(&self, text: &str) -> reqwest::Result<String> {
        use secrecy::ExposeSecret;

        let body = TranslateRequest {
            q: text,
            source: SOURCE_LANGUAGE,
            target: TARGET_LANGUAGE,
            format: "text",
            api_key: self.api_key.expose_secret(),
        };

        let response: TranslateResponse = self
            .client
            .post(self.api_translate_url.clone())
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response.translated_text)
    }
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'a str,
    api_key: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateResponse {
    translated_text: String,
}
