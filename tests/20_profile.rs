mod common;

use anyhow::Result;
use common::{file_form, TestServer};
use reqwest::StatusCode;
use serde_json::{json, Value};

async fn user_id(server: &TestServer, email: &str) -> Result<String> {
    let body: Value = server.login(email, "password123").await?.json().await?;
    Ok(body["data"]["userId"].as_str().unwrap_or_default().to_string())
}

#[tokio::test]
async fn create_read_and_update_own_profile() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.token_for("p@example.com").await?;

    let res = server.get("/self", &token).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = server
        .post("/self", &token)
        .json(&json!({ "username": "petrolhead", "name": "Pat Driver" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = server
        .post("/self", &token)
        .json(&json!({ "username": "another", "name": "Pat Driver" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = server
        .put("/self", &token)
        .json(&json!({ "bio": "Fiesta fan", "name": "" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["bio"], "Fiesta fan");
    assert_eq!(body["data"]["name"], "Pat Driver");
    assert_eq!(body["data"]["username"], "petrolhead");

    Ok(())
}

#[tokio::test]
async fn username_must_be_unique() -> Result<()> {
    let server = TestServer::spawn().await?;
    let first = server.token_for("first@example.com").await?;
    let second = server.token_for("second@example.com").await?;

    let res = server
        .post("/self", &first)
        .json(&json!({ "username": "taken", "name": "First" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = server
        .post("/self", &second)
        .json(&json!({ "username": "taken", "name": "Second" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    Ok(())
}

#[tokio::test]
async fn private_profile_is_visible_to_followers_only() -> Result<()> {
    let server = TestServer::spawn().await?;
    let owner = server.token_for("owner@example.com").await?;
    let viewer = server.token_for("viewer@example.com").await?;
    let owner_id = user_id(&server, "owner@example.com").await?;

    server
        .post("/self", &owner)
        .json(&json!({ "username": "owner", "name": "Owner" }))
        .send()
        .await?;
    let res = server.put("/self", &owner).json(&json!({ "public": false })).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = server.get(&format!("/user/{}", owner_id), &viewer).send().await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = server.get(&format!("/user/{}", owner_id), &owner).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = server
        .post("/follow", &viewer)
        .json(&json!({ "userId": owner_id }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = server.get(&format!("/user/{}", owner_id), &viewer).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["followers"], 1);

    Ok(())
}

#[tokio::test]
async fn unknown_user_profile_is_not_found() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.token_for("lookup@example.com").await?;

    let res = server
        .get("/user/00000000-0000-0000-0000-000000000000", &token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = server.get("/user/not-a-uuid", &token).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn avatar_upload_updates_profile() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.token_for("avatar@example.com").await?;
    let id = user_id(&server, "avatar@example.com").await?;

    server
        .post("/self", &token)
        .json(&json!({ "username": "avatar", "name": "Ava Tar" }))
        .send()
        .await?;

    let res = server
        .post("/self/avatar", &token)
        .multipart(file_form("avatar", "me.jpg", b"jpeg-bytes")?)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    let location = body["data"]["avatar"].as_str().unwrap_or_default().to_string();
    assert!(location.ends_with(&format!("avatars/user/{}/me.jpg", id)), "{}", location);
    assert!(server.storage.contains(&format!("avatars/user/{}/me.jpg", id)).await);

    let body: Value = server.get("/self", &token).send().await?.json().await?;
    assert_eq!(body["data"]["avatar"], location.as_str());

    Ok(())
}
