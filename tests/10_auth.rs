mod common;

use anyhow::Result;
use reqwest::{header, StatusCode};
use serde_json::{json, Value};

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client.get(server.url("/health")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<Value>().await?;
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn root_reports_running() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let body = client.get(server.url("/")).send().await?.json::<Value>().await?;
    assert_eq!(body, json!({ "message": "Inventory API is running" }));
    Ok(())
}

#[tokio::test]
async fn register_same_username_twice() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let username = common::unique_username("alice");

    let user = common::register(server, &client, &username, "pw1").await?;
    assert_eq!(user["username"], username.as_str());
    assert!(user["id"].is_i64(), "missing id: {}", user);
    assert!(user.get("hashed_password").is_none(), "password hash leaked: {}", user);

    let res = client
        .post(server.url("/register"))
        .json(&json!({ "username": username, "password": "pw1" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = res.json::<Value>().await?;
    assert_eq!(body["detail"], "Username already registered");
    Ok(())
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let username = common::unique_username("bob");
    common::register(server, &client, &username, "pw1").await?;

    let res = client
        .post(server.url("/token"))
        .form(&[("username", username.as_str()), ("password", "nope")])
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(res.headers()[header::WWW_AUTHENTICATE], "Bearer");

    let body = res.json::<Value>().await?;
    assert_eq!(body["detail"], "Incorrect username or password");
    Ok(())
}

#[tokio::test]
async fn login_issues_bearer_token() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let username = common::unique_username("carol");
    common::register(server, &client, &username, "pw1").await?;

    let res = client
        .post(server.url("/token"))
        .form(&[("username", username.as_str()), ("password", "pw1")])
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<Value>().await?;
    assert_eq!(body["token_type"], "bearer");
    assert!(body["access_token"].as_str().map(|t| !t.is_empty()).unwrap_or(false));
    Ok(())
}
