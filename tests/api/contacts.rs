use reqwest::StatusCode;

use serde_json::{json, Value};

use sqlx::PgPool;

use crate::helpers::{fake_contact, field, TestApp};

#[sqlx::test]
async fn create_contact_derives_display_name(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;

    let contact = app
        .create_contact(json!({
            "contact_person": "Jane Doe",
            "company_name": "Acme Corp",
            "mailbox_number": "A12",
            "email": "jane@acme.test",
        }))
        .await;

    assert_eq!("Acme Corp - Jane Doe", contact["display_name"]);
    assert_eq!("active", contact["status"]);
    assert_eq!("en", contact["preferred_language"]);

    Ok(())
}

#[sqlx::test]
async fn create_contact_returns_bad_request_for_invalid_data(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;

    let test_cases = vec![
        (
            "missing names",
            json!({ "mailbox_number": "A1" }),
            Some("Either contact person or company name is required"),
        ),
        (
            "missing mailbox",
            json!({ "contact_person": "Jane Doe" }),
            Some("Mailbox number is required"),
        ),
        (
            "blank mailbox",
            json!({ "contact_person": "Jane Doe", "mailbox_number": "   " }),
            Some("Mailbox number is required"),
        ),
        (
            "malformed email",
            json!({ "contact_person": "Jane Doe", "mailbox_number": "A1", "email": "not an email" }),
            None,
        ),
    ];

    for (desc, body, message) in test_cases {
        let res = app.post_json("api/contacts", &body).await;

        assert_eq!(
            StatusCode::BAD_REQUEST,
            res.status(),
            "request did not fail with {}",
            desc
        );

        let body: Value = res.json().await.expect("Failed to parse response");
        assert_eq!(false, body["success"], "{}", desc);
        if let Some(message) = message {
            assert_eq!(message, body["error"], "{}", desc);
        }
    }

    Ok(())
}

#[sqlx::test]
async fn archived_contacts_are_hidden_from_the_directory(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;

    let kept = app.create_contact(fake_contact("B1")).await;
    let archived = app.create_contact(fake_contact("B2")).await;

    let res = app
        .delete(&format!("api/contacts/{}", field(&archived, "contact_id")))
        .await;
    assert_eq!(StatusCode::OK, res.status());

    let contacts: Vec<Value> = app.get("api/contacts").await.json().await.unwrap();
    assert_eq!(1, contacts.len());
    assert_eq!(kept["contact_id"], contacts[0]["contact_id"]);

    let contacts: Vec<Value> = app
        .get("api/contacts?status=archived")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(1, contacts.len());
    assert_eq!(archived["contact_id"], contacts[0]["contact_id"]);

    // Archived contacts can still be fetched directly
    let res = app
        .get(&format!("api/contacts/{}", field(&archived, "contact_id")))
        .await;
    assert_eq!(StatusCode::OK, res.status());

    Ok(())
}

#[sqlx::test]
async fn search_matches_mailbox_and_names(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;

    app.create_contact(json!({ "company_name": "Acme Corp", "mailbox_number": "C7" }))
        .await;
    app.create_contact(json!({ "contact_person": "Bob Stone", "mailbox_number": "D9" }))
        .await;

    let contacts: Vec<Value> = app.get("api/contacts?search=acme").await.json().await.unwrap();
    assert_eq!(1, contacts.len());
    assert_eq!("Acme Corp", contacts[0]["display_name"]);

    let contacts: Vec<Value> = app.get("api/contacts?search=d9").await.json().await.unwrap();
    assert_eq!(1, contacts.len());
    assert_eq!("Bob Stone", contacts[0]["display_name"]);

    Ok(())
}

#[sqlx::test]
async fn update_replaces_contact_fields(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;

    let contact = app.create_contact(fake_contact("E5")).await;
    let url = format!("api/contacts/{}", field(&contact, "contact_id"));

    let res = app
        .put_json(
            &url,
            &json!({
                "company_name": "Globex",
                "contact_person": "Hank Scorpio",
                "mailbox_number": "E5",
                "display_name_preference": "company",
            }),
        )
        .await;
    assert_eq!(StatusCode::OK, res.status());

    let updated: Value = res.json().await.unwrap();
    assert_eq!("Globex", updated["display_name"]);
    assert_eq!(Value::Null, updated["email"]);

    Ok(())
}

#[sqlx::test]
async fn unknown_contact_is_not_found(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;

    let url = format!("api/contacts/{}", uuid::Uuid::new_v4());
    let res = app.get(&url).await;

    assert_eq!(StatusCode::NOT_FOUND, res.status());

    let body: Value = res.json().await.unwrap();
    assert_eq!("Contact not found", body["error"]);

    Ok(())
}
