mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use common::{token_for, TestServer};

/// Builds LOC-1 > ST-1 > BOX-1 as `token` and returns the created item's id
async fn seed(server: &TestServer, token: &str) -> Result<String> {
    let (status, _) = server
        .post("/location", token, json!({ "code": "LOC 1", "name": "Main", "description": "Ground floor" }))
        .await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = server
        .post("/storage", token, json!({ "location_code": "LOC-1", "code": "ST-1", "name": "Shelf" }))
        .await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = server
        .post("/container", token, json!({ "storage_code": "ST-1", "code": "BOX-1", "name": "Bolts" }))
        .await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = server
        .post("/item", token, json!({ "container_code": "BOX-1", "name": "M6 bolt" }))
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    Ok(body["data"]["id"].as_str().unwrap_or_default().to_string())
}

#[tokio::test]
async fn owner_builds_and_reads_a_hierarchy() -> Result<()> {
    let server = TestServer::start().await?;
    let owner = token_for("user-owner", "owner");
    let item_id = seed(&server, &owner).await?;

    let (status, body) = server.get("/location/LOC-1", &owner).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["description"], "Ground floor");
    assert_eq!(body["data"]["storages"], json!([{ "code": "ST-1", "name": "Shelf", "description": null }]));

    let (status, body) = server.get("/location/LOC-1/storage/ST-1", &owner).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["containers"][0]["code"], "BOX-1");

    let (status, body) = server.get("/location/LOC-1/storage/ST-1/container/BOX-1", &owner).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["storage_code"], "ST-1");

    let (status, body) = server.get(&format!("/item/{}", item_id), &owner).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "M6 bolt");
    assert_eq!(body["data"]["has_picture"], false);

    let (status, body) = server.get("/location/LOC-1/export", &owner).await?;
    assert_eq!(status, StatusCode::OK);
    let items = &body["data"]["storages"][0]["containers"][0]["items"];
    assert_eq!(items[0]["id"], item_id.as_str());
    Ok(())
}

#[tokio::test]
async fn strangers_are_forbidden_and_missing_things_are_not_found() -> Result<()> {
    let server = TestServer::start().await?;
    let owner = token_for("user-owner", "owner");
    let stranger = token_for("user-stranger", "stranger");
    let item_id = seed(&server, &owner).await?;

    let (status, body) = server.get("/location/LOC-1", &stranger).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");

    let (status, _) = server.get(&format!("/item/{}", item_id), &stranger).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = server
        .post("/container", &stranger, json!({ "storage_code": "ST-1", "code": "BOX-2", "name": "Nuts" }))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = server.get("/location/LOC-9/storage/ST-1", &stranger).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Location not found");

    let (status, body) = server
        .post("/location", &stranger, json!({ "code": "LOC-1", "name": "Mine" }))
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Location already exists");
    Ok(())
}

#[tokio::test]
async fn pictures_upload_and_download() -> Result<()> {
    let server = TestServer::start().await?;
    let owner = token_for("user-owner", "owner");
    let item_id = seed(&server, &owner).await?;
    let picture_url = server.warehouse(&format!("/item/{}/picture", item_id));

    let res = server.client.get(&picture_url).bearer_auth(&owner).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    for payload in [&b"first"[..], &b"second"[..]] {
        let form = reqwest::multipart::Form::new().part(
            "picture",
            reqwest::multipart::Part::bytes(payload.to_vec())
                .file_name("picture.jpg")
                .mime_str("image/jpeg")?,
        );
        let res = server
            .client
            .patch(&picture_url)
            .bearer_auth(&owner)
            .multipart(form)
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::OK);
    }

    // No picture field: accepted, nothing changes
    let res = server
        .client
        .patch(&picture_url)
        .bearer_auth(&owner)
        .multipart(reqwest::multipart::Form::new().text("note", "none"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = server.client.get(&picture_url).bearer_auth(&owner).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()[reqwest::header::CONTENT_TYPE], "image/jpeg");
    assert_eq!(&res.bytes().await?[..], b"second");

    let (_, body) = server
        .get("/location/LOC-1/storage/ST-1/container/BOX-1/items", &owner)
        .await?;
    assert_eq!(body["data"][0]["has_picture"], true);
    Ok(())
}
