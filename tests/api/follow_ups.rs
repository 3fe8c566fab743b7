use chrono::{Duration, Utc};

use reqwest::StatusCode;

use serde_json::{json, Value};

use sqlx::PgPool;

use crate::helpers::{fake_contact, field, TestApp};

#[sqlx::test]
async fn follow_ups_rank_oldest_mail_first(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;

    let recent = app.create_contact(fake_contact("R1")).await;
    app.create_mail_item(field(&recent, "contact_id"), "Letter", Utc::now() - Duration::days(1))
        .await;

    let stale = app.create_contact(fake_contact("S1")).await;
    let stale_id = field(&stale, "contact_id");
    app.create_mail_item(stale_id, "Package", Utc::now() - Duration::days(40))
        .await;
    app.create_mail_item(stale_id, "Letter", Utc::now() - Duration::days(5))
        .await;

    let res = app.get("api/follow-ups").await;
    assert_eq!(StatusCode::OK, res.status());

    let body: Value = res.json().await.unwrap();
    let groups = body["groups"].as_array().unwrap();
    assert_eq!(2, groups.len());

    assert_eq!(stale["contact_id"], groups[0]["contact"]["contact_id"]);
    assert_eq!("abandoned_candidate", groups[0]["bucket"]);
    assert_eq!(1, groups[0]["packages"].as_array().unwrap().len());
    assert_eq!(1, groups[0]["letters"].as_array().unwrap().len());
    assert_eq!("Summary Notification (All Items)", groups[0]["suggestedTemplate"]);
    assert_eq!(false, groups[0]["notifiedToday"]);

    assert_eq!(recent["contact_id"], groups[1]["contact"]["contact_id"]);

    assert_eq!(2, body["summary"]["totalCustomers"]);
    assert_eq!(1, body["summary"]["abandonedCount"]);

    Ok(())
}

#[sqlx::test]
async fn mark_abandoned_moves_only_old_items(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;

    let contact = app.create_contact(fake_contact("S2")).await;
    let contact_id = field(&contact, "contact_id");
    let old = app
        .create_mail_item(contact_id, "Package", Utc::now() - Duration::days(35))
        .await;
    let fresh = app
        .create_mail_item(contact_id, "Package", Utc::now() - Duration::days(2))
        .await;

    let res = app
        .post_json(
            &format!("api/follow-ups/{}/mark-abandoned", contact_id),
            &json!({}),
        )
        .await;
    assert_eq!(StatusCode::OK, res.status());

    let body: Value = res.json().await.unwrap();
    assert_eq!(true, body["success"]);
    assert_eq!(1, body["updated"]);
    assert_eq!(old["mail_item_id"], body["items"][0]["mail_item_id"]);
    assert_eq!("Abandoned Package", body["items"][0]["status"]);

    let history: Vec<Value> = app
        .get(&format!("api/action-history/{}", field(&old, "mail_item_id")))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!("marked_abandoned", history[0]["action_type"]);

    let items: Vec<Value> = app
        .get(&format!("api/mail-items?contact_id={}", contact_id))
        .await
        .json()
        .await
        .unwrap();
    let fresh = items
        .iter()
        .find(|item| item["mail_item_id"] == fresh["mail_item_id"])
        .expect("Fresh item missing");
    assert_eq!("Received", fresh["status"]);

    Ok(())
}

#[sqlx::test]
async fn mark_abandoned_without_old_items_changes_nothing(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;

    let contact = app.create_contact(fake_contact("S3")).await;
    let contact_id = field(&contact, "contact_id");
    app.create_mail_item(contact_id, "Package", Utc::now() - Duration::days(25))
        .await;

    let body: Value = app
        .post_json(
            &format!("api/follow-ups/{}/mark-abandoned", contact_id),
            &json!({}),
        )
        .await
        .json()
        .await
        .unwrap();

    assert_eq!(false, body["success"]);
    assert_eq!(0, body["updated"]);
    assert_eq!("No items over 30 days old for this customer", body["message"]);

    Ok(())
}
