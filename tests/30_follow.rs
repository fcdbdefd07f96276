mod common;

use anyhow::Result;
use common::TestServer;
use reqwest::StatusCode;
use serde_json::{json, Value};

async fn user_id(server: &TestServer, email: &str) -> Result<String> {
    let body: Value = server.login(email, "password123").await?.json().await?;
    Ok(body["data"]["userId"].as_str().unwrap_or_default().to_string())
}

#[tokio::test]
async fn cannot_follow_self() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.token_for("me@example.com").await?;
    let me = user_id(&server, "me@example.com").await?;

    let res = server.post("/follow", &token).json(&json!({ "userId": me })).send().await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    Ok(())
}

#[tokio::test]
async fn follow_twice_conflicts_and_unfollow_requires_edge() -> Result<()> {
    let server = TestServer::spawn().await?;
    let a = server.token_for("a@example.com").await?;
    server.token_for("b@example.com").await?;
    let b = user_id(&server, "b@example.com").await?;

    let res = server.post("/unfollow", &a).json(&json!({ "userId": b })).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = server.post("/follow", &a).json(&json!({ "userId": b })).send().await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = server.post("/follow", &a).json(&json!({ "userId": b })).send().await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = server.post("/unfollow", &a).json(&json!({ "userId": b })).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = server.post("/unfollow", &a).json(&json!({ "userId": b })).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn follow_unknown_user_is_not_found() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.token_for("lonely@example.com").await?;

    let res = server
        .post("/follow", &token)
        .json(&json!({ "userId": "00000000-0000-0000-0000-000000000001" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = server.post("/follow", &token).json(&json!({})).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    Ok(())
}
