mod common;

use anyhow::Result;
use common::{file_form, TestServer};
use logbook_api::config::{AppConfig, EmptyPatchPolicy};
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn register_login_add_vehicle_twice_conflicts() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.token_for("driver@example.com").await?;

    server.add_vehicle(&token, "AB12CDE").await?;

    let res = server
        .post("/garage/vehicle", &token)
        .json(&json!({ "registration": "ab12 cde", "make": "FORD" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let body: Value = server.get("/garage", &token).send().await?.json().await?;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));

    Ok(())
}

#[tokio::test]
async fn two_owners_can_hold_the_same_registration() -> Result<()> {
    let server = TestServer::spawn().await?;
    let first = server.token_for("first@example.com").await?;
    let second = server.token_for("second@example.com").await?;

    let a = server.add_vehicle(&first, "AB12CDE").await?;
    let b = server.add_vehicle(&second, "AB12CDE").await?;
    assert_ne!(a, b);

    let body: Value = server.get("/garage/vehicle/AB12CDE", &second).send().await?.json().await?;
    assert_eq!(body["data"]["id"], b.as_str());

    Ok(())
}

#[tokio::test]
async fn vehicles_are_scoped_to_their_owner() -> Result<()> {
    let server = TestServer::spawn().await?;
    let owner = server.token_for("owner@example.com").await?;
    let other = server.token_for("other@example.com").await?;
    server.add_vehicle(&owner, "AB12CDE").await?;

    let res = server.get("/garage/vehicle/AB12CDE", &other).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let body: Value = server.get("/garage/vehicle/AB12CDE/exists", &other).send().await?.json().await?;
    assert_eq!(body["data"], false);

    let body: Value = server.get("/garage/vehicle/ab12cde/exists", &owner).send().await?.json().await?;
    assert_eq!(body["data"], true);

    let res = server
        .patch("/garage/vehicle/AB12CDE", &other)
        .json(&json!({ "nickname": "Mine now" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let body: Value = server.get("/garage", &other).send().await?.json().await?;
    assert_eq!(body["data"], json!([]));

    Ok(())
}

#[tokio::test]
async fn nickname_only_patch_leaves_other_fields() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.token_for("patch@example.com").await?;
    server.add_vehicle(&token, "AB12CDE").await?;

    let before: Value = server.get("/garage/vehicle/AB12CDE", &token).send().await?.json().await?;

    let res = server
        .patch("/garage/vehicle/AB12CDE", &token)
        .json(&json!({ "nickname": "Rusty", "description": "" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let after: Value = res.json().await?;

    let mut expected = before["data"].clone();
    expected["nickname"] = json!("Rusty");
    assert_eq!(after["data"], expected);

    Ok(())
}

#[tokio::test]
async fn empty_patch_follows_configured_policy() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.token_for("reject@example.com").await?;
    server.add_vehicle(&token, "AB12CDE").await?;

    let res = server.patch("/garage/vehicle/AB12CDE", &token).json(&json!({})).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let mut config = AppConfig::development();
    config.garage.empty_patch = EmptyPatchPolicy::Ignore;
    let server = TestServer::spawn_with(config).await?;
    let token = server.token_for("ignore@example.com").await?;
    server.add_vehicle(&token, "AB12CDE").await?;

    let res = server
        .patch("/garage/vehicle/AB12CDE", &token)
        .json(&json!({ "mileage": 0, "nickname": "" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["nickname"], "Blue");
    assert_eq!(body["data"]["mileage"], 81000);

    Ok(())
}

#[tokio::test]
async fn vehicle_images_are_stored_and_aggregated() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.token_for("images@example.com").await?;
    let id = server.add_vehicle(&token, "AB12CDE").await?;

    let body: Value = server.get("/garage/vehicle/AB12CDE", &token).send().await?.json().await?;
    assert_eq!(body["data"]["media"], json!([]));

    for name in ["front.jpg", "side.jpg", "rear.jpg"] {
        let res = server
            .post(&format!("/garage/vehicle/{}/uploadImage", id), &token)
            .multipart(file_form("image", name, b"jpeg-bytes")?)
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = res.json().await?;
        assert_eq!(body["data"]["filename"], name);
        assert!(server.storage.contains(&format!("vehicles/{}/images/{}", id, name)).await);
    }

    let body: Value = server.get("/garage", &token).send().await?.json().await?;
    let vehicles = body["data"].as_array().cloned().unwrap_or_default();
    assert_eq!(vehicles.len(), 1);
    let names: Vec<&str> = vehicles[0]["media"]
        .as_array()
        .map(|m| m.iter().filter_map(|i| i["filename"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(names, ["front.jpg", "side.jpg", "rear.jpg"]);

    Ok(())
}

#[tokio::test]
async fn image_upload_requires_a_file() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.token_for("nofile@example.com").await?;
    let id = server.add_vehicle(&token, "AB12CDE").await?;

    let res = server
        .post(&format!("/garage/vehicle/{}/uploadImage", id), &token)
        .multipart(file_form("wrong-field", "x.jpg", b"jpeg-bytes")?)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = server
        .post("/garage/vehicle/00000000-0000-0000-0000-000000000000/uploadImage", &token)
        .multipart(file_form("image", "x.jpg", b"jpeg-bytes")?)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(server.storage.len().await, 0);

    Ok(())
}

#[tokio::test]
async fn registry_lookup_reconciles_both_sources() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.token_for("lookup@example.com").await?;

    let res = server.get("/vehicle/lookup/ab12cde", &token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["registration"], "AB12CDE");
    assert_eq!(body["data"]["model"], "FIESTA");
    assert_eq!(body["data"]["registered"], "2012-06-15");
    assert_eq!(body["data"]["mot_date"], "2025-06-14");
    assert_eq!(body["data"]["tax_date"], "2025-03-01");

    let res = server.get("/vehicle/lookup/ZZ99ZZZ", &token).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    Ok(())
}
