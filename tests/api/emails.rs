use chrono::Utc;

use reqwest::StatusCode;

use serde_json::{json, Value};

use sqlx::PgPool;

use wiremock::matchers::*;
use wiremock::{Mock, ResponseTemplate};

use crate::helpers::{field, TestApp, TestOptions};

/// Contact with an email address and one waiting package
async fn contact_with_package(app: &TestApp) -> (Value, Value) {
    let contact = app
        .create_contact(json!({
            "contact_person": "Jane Doe",
            "mailbox_number": "A7",
            "email": "jane@example.test",
        }))
        .await;
    let item = app
        .create_mail_item(field(&contact, "contact_id"), "Package", Utc::now())
        .await;
    (contact, item)
}

/// Bodies of the emails the mock mail service received
async fn sent_emails(app: &TestApp) -> Vec<Value> {
    app.email_server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|req| serde_json::from_slice(&req.body).expect("Email request is not JSON"))
        .collect()
}

#[sqlx::test]
async fn send_resolves_template_and_records_outreach(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;

    Mock::given(path("/email"))
        .and(method("POST"))
        .and(header_exists("X-Postmark-Server-Token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let (contact, item) = contact_with_package(&app).await;
    let template = app
        .create_template(
            "Mail for box {BoxNumber}",
            "Hello {{Name}}, your {{MAIL_TYPE}} is waiting.{{Unknown}}",
        )
        .await;

    let res = app
        .post_json(
            "api/emails/send",
            &json!({
                "contact_id": contact["contact_id"],
                "template_id": template["template_id"],
                "mail_item_id": item["mail_item_id"],
            }),
        )
        .await;
    assert_eq!(StatusCode::OK, res.status());

    let body: Value = res.json().await.unwrap();
    assert_eq!(true, body["success"]);
    assert_eq!("jane@example.test", body["sentTo"]);
    assert_eq!("Mail for box A7", body["subject"]);
    assert_eq!("Reminder", body["outreachMessage"]["message_type"]);

    let emails = sent_emails(&app).await;
    assert_eq!(
        "Hello Jane Doe, your Package is waiting.",
        emails[0]["TextBody"]
    );

    let items: Vec<Value> = app
        .get(&format!(
            "api/mail-items?contact_id={}",
            field(&contact, "contact_id")
        ))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!("Notified", items[0]["status"]);
    assert_eq!(1, items[0]["notification_count"]);

    let history: Vec<Value> = app
        .get(&format!(
            "api/action-history/{}",
            field(&item, "mail_item_id")
        ))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!("notified", history[0]["action_type"]);

    Ok(())
}

#[sqlx::test]
async fn custom_variables_override_contact_data(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .mount(&app.email_server)
        .await;

    let (contact, _) = contact_with_package(&app).await;
    let template = app.create_template("Hi {Name}", "Pickup by {Deadline}").await;

    let res = app
        .post_json(
            "api/emails/send",
            &json!({
                "contact_id": contact["contact_id"],
                "template_id": template["template_id"],
                "custom_variables": { "Name": "Janie", "Deadline": "Friday" },
            }),
        )
        .await;
    assert_eq!(StatusCode::OK, res.status());

    let emails = sent_emails(&app).await;
    assert_eq!("Hi Janie", emails[0]["Subject"]);
    assert_eq!("Pickup by Friday", emails[0]["TextBody"]);

    Ok(())
}

#[sqlx::test]
async fn send_returns_errors_before_contacting_the_mail_service(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    let (contact, _) = contact_with_package(&app).await;
    let no_email = app
        .create_contact(json!({ "company_name": "Paper Only", "mailbox_number": "P1" }))
        .await;
    let template = app.create_template("Subject", "Body").await;

    let test_cases = vec![
        (
            "missing template",
            json!({ "contact_id": contact["contact_id"] }),
            StatusCode::BAD_REQUEST,
        ),
        (
            "unknown template",
            json!({ "contact_id": contact["contact_id"], "template_id": uuid::Uuid::new_v4() }),
            StatusCode::NOT_FOUND,
        ),
        (
            "unknown contact",
            json!({ "contact_id": uuid::Uuid::new_v4(), "template_id": template["template_id"] }),
            StatusCode::NOT_FOUND,
        ),
        (
            "contact without email",
            json!({ "contact_id": no_email["contact_id"], "template_id": template["template_id"] }),
            StatusCode::BAD_REQUEST,
        ),
    ];

    for (desc, body, status) in test_cases {
        let res = app.post_json("api/emails/send", &body).await;

        assert_eq!(status, res.status(), "unexpected status with {}", desc);
    }

    Ok(())
}

#[sqlx::test]
async fn transport_failure_is_a_bad_gateway(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .mount(&app.email_server)
        .await;

    let (contact, item) = contact_with_package(&app).await;
    let template = app.create_template("Subject", "Body").await;

    let res = app
        .post_json(
            "api/emails/send",
            &json!({
                "contact_id": contact["contact_id"],
                "template_id": template["template_id"],
                "mail_item_id": item["mail_item_id"],
            }),
        )
        .await;
    assert_eq!(StatusCode::BAD_GATEWAY, res.status());

    let body: Value = res.json().await.unwrap();
    assert_eq!(false, body["success"]);
    assert_eq!("Failed to send email", body["error"]);

    let count: i64 = sqlx::query_scalar("select count(*) from outreach_messages")
        .fetch_one(&pool)
        .await?;
    assert_eq!(0, count);

    let status: String =
        sqlx::query_scalar("select status from mail_items where mail_item_id = $1")
            .bind(
                field(&item, "mail_item_id")
                    .parse::<uuid::Uuid>()
                    .unwrap(),
            )
            .fetch_one(&pool)
            .await?;
    assert_eq!("Received", status);

    Ok(())
}

#[sqlx::test]
async fn failed_outreach_log_does_not_fail_a_sent_email(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let (contact, _) = contact_with_package(&app).await;
    let template = app.create_template("Subject", "Body").await;

    sqlx::query("drop table outreach_messages")
        .execute(&pool)
        .await?;

    let res = app
        .post_json(
            "api/emails/send",
            &json!({
                "contact_id": contact["contact_id"],
                "template_id": template["template_id"],
            }),
        )
        .await;
    assert_eq!(StatusCode::OK, res.status());

    let body: Value = res.json().await.unwrap();
    assert_eq!(true, body["success"]);
    assert_eq!(Value::Null, body["outreachMessage"]);

    Ok(())
}

#[sqlx::test]
async fn send_custom_requires_all_fields(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;

    let test_cases = vec![
        ("missing to", json!({ "subject": "Hi", "body": "Hello" })),
        ("missing subject", json!({ "to": "a@b.test", "body": "Hello" })),
        ("blank body", json!({ "to": "a@b.test", "subject": "Hi", "body": "  " })),
    ];

    for (desc, body) in test_cases {
        let res = app.post_json("api/emails/send-custom", &body).await;

        assert_eq!(
            StatusCode::BAD_REQUEST,
            res.status(),
            "request did not fail with {}",
            desc
        );
        let body: Value = res.json().await.unwrap();
        assert_eq!("to, subject, and body are required", body["error"], "{}", desc);
    }

    Ok(())
}

#[sqlx::test]
async fn send_custom_logs_outreach_for_known_contacts(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let (contact, _) = contact_with_package(&app).await;

    let res = app
        .post_json(
            "api/emails/send-custom",
            &json!({
                "to": "jane@example.test",
                "subject": "Your package",
                "body": "Please come by <soon>",
                "contact_id": contact["contact_id"],
            }),
        )
        .await;
    assert_eq!(StatusCode::OK, res.status());

    let body: Value = res.json().await.unwrap();
    assert_eq!("Custom", body["outreachMessage"]["message_type"]);
    assert_eq!("Email", body["outreachMessage"]["channel"]);

    let emails = sent_emails(&app).await;
    assert_eq!("Please come by &lt;soon&gt;", emails[0]["HtmlBody"]);

    let logged: Vec<Value> = app
        .get(&format!(
            "api/outreach-messages?contact_id={}",
            field(&contact, "contact_id")
        ))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(1, logged.len());

    Ok(())
}

#[sqlx::test]
async fn email_requests_are_rate_limited(pool: PgPool) -> sqlx::Result<()> {
    let options = TestOptions {
        email_max: 1,
        ..TestOptions::default()
    };
    let app = TestApp::spawn_with(&pool, options).await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let email = json!({ "to": "a@b.test", "subject": "Hi", "body": "Hello" });

    let res = app.post_json("api/emails/send-custom", &email).await;
    assert_eq!(StatusCode::OK, res.status());

    let res = app.post_json("api/emails/send-custom", &email).await;
    assert_eq!(StatusCode::TOO_MANY_REQUESTS, res.status());

    let body: Value = res.json().await.unwrap();
    assert_eq!(
        "Too many email requests. Please try again in a moment.",
        body["error"]
    );

    Ok(())
}
