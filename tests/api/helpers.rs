use std::net::TcpListener;
use std::time::Duration;

use chrono::{DateTime, Utc};

use reqwest::{Client, Method, RequestBuilder, Response};

use rust_decimal_macros::dec;

use secrecy::Secret;

use serde::Serialize;
use serde_json::{json, Value};

use sqlx::PgPool;

use url::Url;

use uuid::Uuid;

use wiremock::MockServer;

use mailroom::app::{self, Services};
use mailroom::auth::TokenTtl;
use mailroom::client::{EmailClient, TranslationClient};
use mailroom::crypto::SigningKey;
use mailroom::domain::FeeSchedule;
use mailroom::model::NewUser;
use mailroom::ratelimit::RateLimits;
use mailroom::repo::UsersRepo;

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Knobs for a spawned test instance
pub struct TestOptions {
    pub translation: bool,
    pub email_max: u32,
    pub translate_max: u32,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            translation: true,
            email_max: 100,
            translate_max: 100,
        }
    }
}

pub struct TestApp {
    addr: String,
    token: String,

    pub client: Client,
    pub user: TestUser,
    pub email_server: MockServer,
    pub translation_server: MockServer,
}

impl TestApp {
    pub async fn spawn(pool: &PgPool) -> Self {
        Self::spawn_with(pool, TestOptions::default()).await
    }

    pub async fn spawn_without_translation(pool: &PgPool) -> Self {
        let options = TestOptions {
            translation: false,
            ..TestOptions::default()
        };
        Self::spawn_with(pool, options).await
    }

    pub async fn spawn_with(pool: &PgPool, options: TestOptions) -> Self {
        use rand::{distributions::Alphanumeric, Rng};

        let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to listen on random port");
        let port = listener.local_addr().unwrap().port();

        let addr = format!("http://127.0.0.1:{}", port);

        let signing_key = {
            let rand_key: String = rand::thread_rng()
                .sample_iter(&Alphanumeric)
                .take(32)
                .map(char::from)
                .collect();
            let rand_key = Secret::new(rand_key);

            SigningKey::new(&rand_key).expect("Failed to create crypto signing key")
        };

        let email_server = MockServer::start().await;
        let translation_server = MockServer::start().await;

        let email_client = {
            let sender = "mailroom@test.com"
                .parse()
                .expect("Failed to parse sender email address");
            let api_base_url =
                Url::parse(&email_server.uri()).expect("Failed to parse mock server uri");
            let api_auth_token = Secret::new("TestAuthorization".into());
            let api_timeout = Duration::from_secs(2);

            EmailClient::new(sender, api_timeout, api_base_url, api_auth_token)
                .expect("Failed to create email client")
        };

        let translation_client = if options.translation {
            let api_base_url =
                Url::parse(&translation_server.uri()).expect("Failed to parse mock server uri");
            let client = TranslationClient::new(
                Duration::from_secs(2),
                api_base_url,
                Secret::new("TestKey".into()),
            )
            .expect("Failed to create translation client");
            Some(client)
        } else {
            None
        };

        let services = Services {
            signing_key,
            token_ttl: TokenTtl(chrono::Duration::minutes(30)),
            email_client,
            translation_client,
            fee_schedule: FeeSchedule {
                daily_rate: dec!(2.00),
                grace_days: 1,
            },
            rate_limits: RateLimits::new(
                Duration::from_secs(60),
                options.email_max,
                options.translate_max,
            ),
        };

        let server =
            app::run(listener, pool.clone(), services).expect("Failed to spawn app instance");
        let _ = tokio::spawn(server);

        let client = Client::new();

        let user = TestUser::register(pool, "staff@mailroom.test", "correct horse battery").await;

        let mut app = Self {
            addr,
            token: String::new(),
            client,
            user,
            email_server,
            translation_server,
        };
        app.token = app.login_token(&app.user.credentials()).await;
        app
    }

    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let url = format!("{}/{}", &self.addr, url);
        self.client.request(method, url)
    }

    /// Request carrying the signed-in staff member's bearer token
    pub fn authorized_request(&self, method: Method, url: &str) -> RequestBuilder {
        self.request(method, url).bearer_auth(&self.token)
    }

    pub async fn health_check(&self) -> reqwest::Result<Response> {
        self.request(Method::GET, "health_check").send().await
    }

    pub async fn login(&self, credentials: &Credentials) -> reqwest::Result<Response> {
        self.request(Method::POST, "api/auth/login")
            .json(credentials)
            .send()
            .await
    }

    async fn login_token(&self, credentials: &Credentials) -> String {
        let body: Value = self
            .login(credentials)
            .await
            .expect("Failed to execute request")
            .json()
            .await
            .expect("Failed to parse login response");

        body["token"]
            .as_str()
            .expect("Login response has no token")
            .to_string()
    }

    pub async fn get(&self, url: &str) -> Response {
        self.authorized_request(Method::GET, url)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post_json(&self, url: &str, body: &Value) -> Response {
        self.authorized_request(Method::POST, url)
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn put_json(&self, url: &str, body: &Value) -> Response {
        self.authorized_request(Method::PUT, url)
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn delete(&self, url: &str) -> Response {
        self.authorized_request(Method::DELETE, url)
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Create a contact through the API and return its JSON representation
    pub async fn create_contact(&self, body: Value) -> Value {
        let res = self.post_json("api/contacts", &body).await;
        assert_eq!(201, res.status().as_u16(), "contact was not created");

        res.json().await.expect("Failed to parse contact")
    }

    pub async fn create_mail_item(
        &self,
        contact_id: &str,
        item_type: &str,
        received_date: DateTime<Utc>,
    ) -> Value {
        let body = json!({
            "contact_id": contact_id,
            "item_type": item_type,
            "received_date": received_date,
        });
        let res = self.post_json("api/mail-items", &body).await;
        assert_eq!(201, res.status().as_u16(), "mail item was not created");

        res.json().await.expect("Failed to parse mail item")
    }

    pub async fn create_template(&self, subject_line: &str, message_body: &str) -> Value {
        let body = json!({
            "template_name": "Pickup reminder",
            "template_type": "Reminder",
            "subject_line": subject_line,
            "message_body": message_body,
        });
        let res = self.post_json("api/templates", &body).await;
        assert_eq!(201, res.status().as_u16(), "template was not created");

        res.json().await.expect("Failed to parse template")
    }
}

/// A contact with a random name and email
pub fn fake_contact(mailbox_number: &str) -> Value {
    use fake::faker::internet::en::SafeEmail;
    use fake::faker::name::en::Name;
    use fake::Fake;

    let name: String = Name().fake();
    let email: String = SafeEmail().fake();

    json!({
        "contact_person": name,
        "mailbox_number": mailbox_number,
        "email": email,
    })
}

/// Pull a JSON string field, failing the test when absent
pub fn field<'a>(value: &'a Value, name: &str) -> &'a str {
    value[name]
        .as_str()
        .unwrap_or_else(|| panic!("Missing string field {}", name))
}

#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub password: String,
}

impl TestUser {
    pub async fn register(pool: &PgPool, email: &str, password: &str) -> Self {
        use argon2::password_hash::SaltString;
        use argon2::{Argon2, PasswordHasher};

        let salt = SaltString::generate(&mut rand::thread_rng());

        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .expect("Failed to hash user password")
            .to_string();

        let new_user = NewUser {
            email: email.parse().expect("Failed to parse email address"),
            password_hash,
        };

        let id = UsersRepo::insert(pool, &new_user)
            .await
            .expect("Failed to insert test user");

        let email = email.to_string();
        let password = password.to_string();
        Self {
            id,
            email,
            password,
        }
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            email: self.email.clone(),
            password: self.password.clone(),
        }
    }
}
