use std::net::TcpListener;

use actix_web::dev::Server;
use actix_web::{get, HttpResponse, Responder};
use actix_web::{web, App, HttpServer};

use sqlx::PgPool;

use tracing_actix_web::TracingLogger;

use crate::auth::TokenTtl;
use crate::client::{EmailClient, TranslationClient};
use crate::controller::{
    action_history, auth, contacts, emails, extractor_configs, fees, follow_ups, mail_items,
    outreach_messages, templates, translate,
};
use crate::crypto::SigningKey;
use crate::domain::FeeSchedule;
use crate::ratelimit::RateLimits;

/// Services and policies shared by every request
pub struct Services {
    pub signing_key: SigningKey,
    pub token_ttl: TokenTtl,
    pub email_client: EmailClient,
    /// `None` when no translation provider is configured
    pub translation_client: Option<TranslationClient>,
    pub fee_schedule: FeeSchedule,
    pub rate_limits: RateLimits,
}

/// Simple health-check endpoint
#[tracing::instrument(name = "Health check")]
#[get("/health_check")]
async fn health_check() -> impl Responder {
    HttpResponse::Ok().body("I am alive")
}

/// Run the application on a specified TCP listener
pub fn run(listener: TcpListener, pool: PgPool, services: Services) -> anyhow::Result<Server> {
    // Wrap application data
    let pool = web::Data::new(pool);
    let signing_key = web::Data::new(services.signing_key);
    let token_ttl = web::Data::new(services.token_ttl);
    let email_client = web::Data::new(services.email_client);
    let translation_client = web::Data::new(services.translation_client);
    let fee_schedule = web::Data::new(services.fee_schedule);
    // Shared across workers so limits hold process-wide
    let rate_limits = web::Data::new(services.rate_limits);

    // Start the server
    let server = HttpServer::new(move || {
        let (json_config, query_config, path_config) = extractor_configs();

        App::new()
            .wrap(TracingLogger::default())
            .app_data(json_config)
            .app_data(query_config)
            .app_data(path_config)
            .app_data(pool.clone())
            .app_data(signing_key.clone())
            .app_data(token_ttl.clone())
            .app_data(email_client.clone())
            .app_data(translation_client.clone())
            .app_data(fee_schedule.clone())
            .app_data(rate_limits.clone())
            .service(health_check)
            .service(
                web::scope("/api")
                    .service(auth::scope())
                    .service(contacts::scope())
                    .service(mail_items::scope())
                    .service(fees::scope())
                    .service(follow_ups::scope())
                    .service(templates::scope())
                    .service(emails::scope())
                    .service(translate::scope())
                    .service(outreach_messages::scope())
                    .service(action_history::scope()),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
