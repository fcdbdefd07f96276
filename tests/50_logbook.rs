mod common;

use anyhow::Result;
use common::{file_form, TestServer};
use reqwest::StatusCode;
use serde_json::{json, Value};

async fn add_log(server: &TestServer, token: &str, vehicle_id: &str, title: &str) -> Result<reqwest::Response> {
    Ok(server
        .post("/log", token)
        .json(&json!({
            "vehicle_id": vehicle_id,
            "category": "Service",
            "title": title,
            "date": "2024-05-01",
            "description": "Oil and filters",
            "cost": "120.50"
        }))
        .send()
        .await?)
}

#[tokio::test]
async fn logs_are_listed_newest_first() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.token_for("logs@example.com").await?;
    let vehicle = server.add_vehicle(&token, "AB12CDE").await?;

    for title in ["First service", "Second service"] {
        let res = add_log(&server, &token, &vehicle, title).await?;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = res.json().await?;
        assert!(body["data"]["id"].is_string());
    }

    let res = server.get(&format!("/log/{}", vehicle), &token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    let titles: Vec<&str> = body["data"]
        .as_array()
        .map(|logs| logs.iter().filter_map(|l| l["title"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(titles, ["Second service", "First service"]);
    assert_eq!(body["data"][0]["media"], json!([]));

    Ok(())
}

#[tokio::test]
async fn logging_against_another_users_vehicle_is_forbidden() -> Result<()> {
    let server = TestServer::spawn().await?;
    let owner = server.token_for("owner@example.com").await?;
    let intruder = server.token_for("intruder@example.com").await?;
    let vehicle = server.add_vehicle(&owner, "AB12CDE").await?;

    let res = add_log(&server, &intruder, &vehicle, "Not mine").await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = server.get(&format!("/log/{}", vehicle), &intruder).send().await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let body: Value = server.get(&format!("/log/{}", vehicle), &owner).send().await?.json().await?;
    assert_eq!(body["data"], json!([]));

    Ok(())
}

#[tokio::test]
async fn log_requires_known_vehicle_and_title() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.token_for("strict@example.com").await?;
    let vehicle = server.add_vehicle(&token, "AB12CDE").await?;

    let res = add_log(&server, &token, "00000000-0000-0000-0000-000000000000", "Ghost").await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = add_log(&server, &token, &vehicle, "   ").await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn log_media_is_attached_to_its_log() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.token_for("media@example.com").await?;
    let vehicle = server.add_vehicle(&token, "AB12CDE").await?;

    let body: Value = add_log(&server, &token, &vehicle, "MOT").await?.json().await?;
    let log = body["data"]["id"].as_str().unwrap_or_default().to_string();

    let res = server
        .post(&format!("/log/{}/media", log), &token)
        .multipart(file_form("media", "receipt.jpg", b"receipt-bytes")?)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await?;
    let location = body["data"]["location"].as_str().unwrap_or_default().to_string();
    assert!(location.ends_with(&format!("logbook/{}/media/receipt.jpg", log)), "{}", location);

    let body: Value = server.get(&format!("/log/{}", vehicle), &token).send().await?.json().await?;
    assert_eq!(body["data"][0]["media"][0]["location"], location.as_str());

    let res = server
        .post("/log/00000000-0000-0000-0000-000000000000/media", &token)
        .multipart(file_form("media", "receipt.jpg", b"receipt-bytes")?)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    Ok(())
}
