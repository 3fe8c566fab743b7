use reqwest::{Method, StatusCode};

use serde_json::{json, Value};

use sqlx::PgPool;

use wiremock::matchers::*;
use wiremock::{Mock, ResponseTemplate};

use crate::helpers::{TestApp, TestOptions};

const MAX_TEXT_LEN: usize = 10_000;

async fn mount_translation(app: &TestApp, translated: &str) {
    Mock::given(path("/translate"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "translatedText": translated })))
        .mount(&app.translation_server)
        .await;
}

#[sqlx::test]
async fn translate_returns_provider_text(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;
    mount_translation(&app, "你好").await;

    let res = app
        .post_json("api/translate", &json!({ "text": "Hello" }))
        .await;
    assert_eq!(StatusCode::OK, res.status());

    let body: Value = res.json().await.unwrap();
    assert_eq!(true, body["success"]);
    assert_eq!("你好", body["translatedText"]);
    assert_eq!(5, body["originalLength"]);
    assert_eq!(2, body["translatedLength"]);

    let requests = app
        .translation_server
        .received_requests()
        .await
        .unwrap_or_default();
    let sent: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!("en", sent["source"]);
    assert_eq!("zh", sent["target"]);

    Ok(())
}

#[sqlx::test]
async fn text_length_limit_is_inclusive(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;
    mount_translation(&app, "好").await;

    let res = app
        .post_json("api/translate", &json!({ "text": "a".repeat(MAX_TEXT_LEN) }))
        .await;
    assert_eq!(StatusCode::OK, res.status());

    let res = app
        .post_json("api/translate", &json!({ "text": "a".repeat(MAX_TEXT_LEN + 1) }))
        .await;
    assert_eq!(StatusCode::BAD_REQUEST, res.status());

    let body: Value = res.json().await.unwrap();
    assert_eq!(
        "Text exceeds maximum length of 10,000 characters",
        body["error"]
    );

    Ok(())
}

#[sqlx::test]
async fn invalid_text_is_rejected(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;

    let test_cases = vec![
        ("missing text", json!({}), "Text is required"),
        ("empty text", json!({ "text": "" }), "Text is required"),
        ("blank text", json!({ "text": "   " }), "Text cannot be empty"),
        ("numeric text", json!({ "text": 42 }), "Text must be a string"),
    ];

    for (desc, body, message) in test_cases {
        let res = app.post_json("api/translate", &body).await;

        assert_eq!(
            StatusCode::BAD_REQUEST,
            res.status(),
            "request did not fail with {}",
            desc
        );
        let body: Value = res.json().await.unwrap();
        assert_eq!(message, body["error"], "{}", desc);
    }

    Ok(())
}

#[sqlx::test]
async fn provider_failure_is_reported_generically(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(500).set_body_string("quota exceeded"))
        .mount(&app.translation_server)
        .await;

    let res = app
        .post_json("api/translate", &json!({ "text": "Hello" }))
        .await;
    assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, res.status());

    let body: Value = res.json().await.unwrap();
    assert_eq!("Translation failed. Please try again.", body["error"]);

    Ok(())
}

#[sqlx::test]
async fn unconfigured_translation_is_unavailable(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn_without_translation(&pool).await;

    let status: Value = app.get("api/translate/status").await.json().await.unwrap();
    assert_eq!(false, status["available"]);

    let res = app
        .post_json("api/translate", &json!({ "text": "Hello" }))
        .await;
    assert_eq!(StatusCode::SERVICE_UNAVAILABLE, res.status());

    Ok(())
}

#[sqlx::test]
async fn translation_requests_are_rate_limited(pool: PgPool) -> sqlx::Result<()> {
    let options = TestOptions {
        translate_max: 2,
        ..TestOptions::default()
    };
    let app = TestApp::spawn_with(&pool, options).await;
    mount_translation(&app, "你好").await;

    for _ in 0..2 {
        let res = app
            .post_json("api/translate", &json!({ "text": "Hello" }))
            .await;
        assert_eq!(StatusCode::OK, res.status());
    }

    let res = app
        .post_json("api/translate", &json!({ "text": "Hello" }))
        .await;
    assert_eq!(StatusCode::TOO_MANY_REQUESTS, res.status());

    Ok(())
}

#[sqlx::test]
async fn anonymous_callers_are_limited_by_address(pool: PgPool) -> sqlx::Result<()> {
    let options = TestOptions {
        translate_max: 1,
        ..TestOptions::default()
    };
    let app = TestApp::spawn_with(&pool, options).await;

    let anonymous = || {
        app.request(Method::POST, "api/translate")
            .json(&json!({ "text": "Hello" }))
            .send()
    };

    let res = anonymous().await.expect("Failed to execute request");
    assert_eq!(StatusCode::UNAUTHORIZED, res.status());

    let res = anonymous().await.expect("Failed to execute request");
    assert_eq!(StatusCode::TOO_MANY_REQUESTS, res.status());

    // Signed-in staff are counted separately
    mount_translation(&app, "你好").await;
    let res = app
        .post_json("api/translate", &json!({ "text": "Hello" }))
        .await;
    assert_eq!(StatusCode::OK, res.status());

    Ok(())
}
