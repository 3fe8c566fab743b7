use std::net::TcpListener;

use anyhow::Context;

use sqlx::PgPool;

use mailroom::app::{self, Services};
use mailroom::auth::TokenTtl;
use mailroom::client::{EmailClient, TranslationClient};
use mailroom::crypto::SigningKey;
use mailroom::ratelimit::RateLimits;
use mailroom::settings::Settings;
use mailroom::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = telemetry::create_subscriber("info".into(), std::io::stdout);
    telemetry::set_subscriber(subscriber)?;

    let settings = Settings::load().context("Failed to load settings")?;

    let pool = PgPool::connect_with(settings.database.with_db()).await?;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    let email_client = EmailClient::new(
        settings.email.sender()?,
        settings.email.api_timeout(),
        settings.email.api_base_url()?,
        settings.email.api_auth_token(),
    )?;

    let translation_client = match &settings.translation {
        Some(translation) => Some(TranslationClient::new(
            translation.api_timeout(),
            translation.api_base_url()?,
            translation.api_key(),
        )?),
        None => {
            tracing::warn!("No translation provider configured, translation is disabled");
            None
        }
    };

    let services = Services {
        signing_key: SigningKey::new(settings.app.secret_key())?,
        token_ttl: TokenTtl(settings.app.token_ttl()),
        email_client,
        translation_client,
        fee_schedule: settings.fees.schedule(),
        rate_limits: RateLimits::new(
            settings.rate_limit.window(),
            settings.rate_limit.email_max,
            settings.rate_limit.translate_max,
        ),
    };

    let listener = TcpListener::bind(settings.app.addr())?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    app::run(listener, pool, services)?
        .await
        .context("Failed to run app")
}
