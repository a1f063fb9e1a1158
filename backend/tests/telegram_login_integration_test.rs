//! Integration tests for Telegram Mini App login and profiles

mod common;

use axum::http::StatusCode;
use common::{now, signed_init_data, unique_telegram_id, TestApp};
use serde_json::json;

async fn count_users(app: &TestApp, telegram_id: i64) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE telegram_id = $1")
        .bind(telegram_id)
        .fetch_one(&app.pool)
        .await
        .unwrap()
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_first_login_creates_user() {
    let app = TestApp::new().await;
    let telegram_id = unique_telegram_id();

    let (status, body) = app.login(&signed_init_data(telegram_id, "Ada", now())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["created"], true);
    assert_eq!(body["user"]["telegram_id"], telegram_id);
    assert_eq!(body["user"]["display_name"], "Ada");
    assert_eq!(body["user"]["language"], "de");
    assert_eq!(body["user"]["is_premium"], true);
    assert_eq!(body["tokens"]["token_type"], "Bearer");
    assert_eq!(count_users(&app, telegram_id).await, 1);

    app.remove_telegram_user(telegram_id).await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_relogin_updates_profile_but_keeps_identity() {
    let app = TestApp::new().await;
    let telegram_id = unique_telegram_id();

    let (_, first) = app.login(&signed_init_data(telegram_id, "Ada", now())).await;
    let (status, second) = app.login(&signed_init_data(telegram_id, "Ada Lovelace", now())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["created"], false);
    assert_eq!(second["user"]["id"], first["user"]["id"]);
    assert_eq!(second["user"]["created_at"], first["user"]["created_at"]);
    assert_eq!(second["user"]["display_name"], "Ada Lovelace");
    assert_eq!(count_users(&app, telegram_id).await, 1);

    app.remove_telegram_user(telegram_id).await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_concurrent_first_logins_create_one_user() {
    let app = TestApp::new().await;
    let telegram_id = unique_telegram_id();
    let init_data = signed_init_data(telegram_id, "Racer", now());

    let (a, b, c) = tokio::join!(
        app.login(&init_data),
        app.login(&init_data),
        app.login(&init_data)
    );

    for (status, _) in [&a, &b, &c] {
        assert_eq!(*status, StatusCode::OK);
    }
    assert_eq!(a.1["user"]["id"], b.1["user"]["id"]);
    assert_eq!(b.1["user"]["id"], c.1["user"]["id"]);
    assert_eq!(count_users(&app, telegram_id).await, 1);

    app.remove_telegram_user(telegram_id).await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_rejected_login_writes_nothing() {
    let app = TestApp::new().await;
    let telegram_id = unique_telegram_id();

    let stale = signed_init_data(telegram_id, "Late", now() - 3 * 86400);
    let (status, body) = app.login(&stale).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["message"], "Invalid authentication data");

    let tampered = signed_init_data(telegram_id, "Ada", now()).replace("Ada", "Eve");
    let (status, _) = app.login(&tampered).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert_eq!(count_users(&app, telegram_id).await, 0);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_profile_round_trip_with_login_token() {
    let app = TestApp::new().await;
    let telegram_id = unique_telegram_id();
    let (_, login) = app.login(&signed_init_data(telegram_id, "Ada", now())).await;
    let token = login["tokens"]["access_token"].as_str().unwrap().to_string();

    let (status, me) = app.get_authed("/api/v1/auth/me", &token).await;
    assert_eq!(status, StatusCode::OK);
    let me: serde_json::Value = serde_json::from_str(&me).unwrap();
    assert_eq!(me["telegram_id"], telegram_id);

    let update = json!({ "bio": "Builds things", "age": 36, "theme": "dark" });
    let (status, body) = app
        .patch_authed("/api/v1/profile", &update.to_string(), &token)
        .await;
    assert_eq!(status, StatusCode::OK);
    let profile: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(profile["bio"], "Builds things");
    assert_eq!(profile["age"], 36);
    assert_eq!(profile["theme"], "dark");

    // A later login refreshes Telegram fields but keeps the user's own edits
    app.login(&signed_init_data(telegram_id, "Ada L.", now())).await;
    let (_, body) = app.get_authed("/api/v1/profile", &token).await;
    let profile: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(profile["display_name"], "Ada L.");
    assert_eq!(profile["bio"], "Builds things");

    app.remove_telegram_user(telegram_id).await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_invalid_profile_update_is_rejected() {
    let app = TestApp::new().await;
    let telegram_id = unique_telegram_id();
    let (_, login) = app.login(&signed_init_data(telegram_id, "Ada", now())).await;
    let token = login["tokens"]["access_token"].as_str().unwrap().to_string();

    for update in [
        json!({ "age": 300 }),
        json!({ "email": "not-an-email" }),
        json!({ "theme": "neon" }),
        json!({}),
    ] {
        let (status, _) = app
            .patch_authed("/api/v1/profile", &update.to_string(), &token)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "update: {update}");
    }

    app.remove_telegram_user(telegram_id).await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_refresh_issues_new_tokens() {
    let app = TestApp::new().await;
    let telegram_id = unique_telegram_id();
    let (_, login) = app.login(&signed_init_data(telegram_id, "Ada", now())).await;

    let body = json!({ "refresh_token": login["tokens"]["refresh_token"] });
    let (status, response) = app.post("/api/v1/auth/refresh", &body.to_string()).await;
    assert_eq!(status, StatusCode::OK);
    let tokens: serde_json::Value = serde_json::from_str(&response).unwrap();
    assert!(!tokens["access_token"].as_str().unwrap().is_empty());

    // Access tokens are not refresh tokens
    let body = json!({ "refresh_token": login["tokens"]["access_token"] });
    let (status, _) = app.post("/api/v1/auth/refresh", &body.to_string()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    app.remove_telegram_user(telegram_id).await;
}
