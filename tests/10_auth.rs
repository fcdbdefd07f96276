mod common;

use anyhow::Result;
use common::TestServer;
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn health_and_root_are_public() -> Result<()> {
    let server = TestServer::spawn().await?;

    let res = server.client.get(format!("{}/health", server.base_url)).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["status"], "ok");

    let res = server.client.get(format!("{}/", server.base_url)).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["name"], "Logbook API");

    Ok(())
}

#[tokio::test]
async fn register_then_login_returns_token_header() -> Result<()> {
    let server = TestServer::spawn().await?;

    let res = server.register("Driver@Example.com", "password123").await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["email"], "driver@example.com");
    assert!(body["data"].get("password_hash").is_none(), "hash leaked: {}", body);
    let user_id = body["data"]["id"].as_str().unwrap_or_default().to_string();

    let res = server.login("driver@example.com", "password123").await?;
    assert_eq!(res.status(), StatusCode::OK);

    let token = res.headers().get("x-logbook-token").expect("token header");
    assert!(!token.is_empty());
    let exposed = res
        .headers()
        .get("access-control-expose-headers")
        .expect("expose header")
        .to_str()?
        .to_ascii_lowercase();
    assert!(exposed.contains("x-logbook-token"));

    let body: Value = res.json().await?;
    assert_eq!(body["data"]["userId"], user_id.as_str());

    Ok(())
}

#[tokio::test]
async fn duplicate_registration_conflicts() -> Result<()> {
    let server = TestServer::spawn().await?;

    assert_eq!(server.register("a@example.com", "password123").await?.status(), StatusCode::CREATED);
    let res = server.register("A@example.com", "password123").await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let body: Value = res.json().await?;
    assert_eq!(body["error"], true);
    assert_eq!(body["code"], "CONFLICT");

    Ok(())
}

#[tokio::test]
async fn registration_validates_input() -> Result<()> {
    let server = TestServer::spawn().await?;

    let res = server.register("not-an-email", "password123").await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = server.register("b@example.com", "pw").await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = server
        .client
        .post(server.url("/register"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn login_failures_share_one_message() -> Result<()> {
    let server = TestServer::spawn().await?;
    server.register("c@example.com", "password123").await?;

    let wrong_password = server.login("c@example.com", "nope-nope").await?;
    assert_eq!(wrong_password.status(), StatusCode::BAD_REQUEST);
    let wrong_password: Value = wrong_password.json().await?;

    let unknown = server.login("nobody@example.com", "password123").await?;
    assert_eq!(unknown.status(), StatusCode::BAD_REQUEST);
    let unknown: Value = unknown.json().await?;

    assert_eq!(wrong_password["message"], unknown["message"]);

    Ok(())
}

#[tokio::test]
async fn protected_routes_reject_missing_or_bad_tokens() -> Result<()> {
    let server = TestServer::spawn().await?;

    let res = server.client.get(server.url("/garage")).send().await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await?;
    assert_eq!(body["code"], "FORBIDDEN");

    let res = server.get("/garage", "not-a-token").send().await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = server
        .client
        .get(server.url("/garage"))
        .header("authorization", "Basic dXNlcjpwYXNz")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    Ok(())
}

#[tokio::test]
async fn token_of_deleted_user_is_rejected() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.token_for("gone@example.com").await?;

    let res = server.get("/garage", &token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let user = server
        .login("gone@example.com", "password123")
        .await?
        .json::<Value>()
        .await?["data"]["userId"]
        .as_str()
        .unwrap_or_default()
        .parse()?;
    server.store.remove_user(user).await;

    let res = server.get("/garage", &token).send().await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    Ok(())
}

#[tokio::test]
async fn raw_token_without_scheme_is_accepted() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.token_for("raw@example.com").await?;

    let res = server
        .client
        .get(server.url("/garage"))
        .header("authorization", token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    Ok(())
}
