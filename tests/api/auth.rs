use reqwest::{Method, StatusCode};

use serde_json::Value;

use sqlx::PgPool;

use crate::helpers::{Credentials, TestApp};

#[sqlx::test]
async fn login_returns_a_token_for_valid_credentials(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;

    let res = app
        .login(&app.user.credentials())
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::OK, res.status());

    let body: Value = res.json().await.expect("Failed to parse response");
    assert!(body["token"].as_str().is_some());
    assert!(body["expires_at"].as_str().is_some());

    Ok(())
}

#[sqlx::test]
async fn login_rejects_bad_credentials(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;

    let test_cases = vec![
        (
            "wrong password",
            Credentials {
                email: app.user.email.clone(),
                password: "not the password".into(),
            },
        ),
        (
            "unknown email",
            Credentials {
                email: "nobody@mailroom.test".into(),
                password: app.user.password.clone(),
            },
        ),
    ];

    for (desc, credentials) in test_cases {
        let res = app
            .login(&credentials)
            .await
            .expect("Failed to execute request");

        assert_eq!(
            StatusCode::UNAUTHORIZED,
            res.status(),
            "login did not fail with {}",
            desc
        );

        let body: Value = res.json().await.expect("Failed to parse response");
        assert_eq!(false, body["success"]);
        assert_eq!("Invalid email or password", body["error"]);
    }

    Ok(())
}

#[sqlx::test]
async fn protected_routes_require_a_valid_token(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;

    let res = app
        .request(Method::GET, "api/contacts")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::UNAUTHORIZED, res.status());

    let res = app
        .request(Method::GET, "api/contacts")
        .bearer_auth("forged.token")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::UNAUTHORIZED, res.status());

    let body: Value = res.json().await.expect("Failed to parse response");
    assert_eq!(false, body["success"]);

    Ok(())
}
