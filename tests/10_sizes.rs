mod common;

use anyhow::Result;
use common::TestServer;
use reqwest::StatusCode;
use serde_json::json;

async fn server_with_stores() -> Result<TestServer> {
    let server = TestServer::start().await?;
    server.datastore.seed_store("S1", "carol", "Carol's").await;
    server.datastore.seed_store("S2", "dave", "Dave's").await;
    Ok(server)
}

#[tokio::test]
async fn create_without_caller_is_unauthenticated() -> Result<()> {
    let server = server_with_stores().await?;

    for body in [r#"{"name":"Small","value":"S"}"#, "{}", "not json", ""] {
        let (status, text) = common::text(server.post("/api/S1/sizes").body(body)).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "body {:?}", body);
        assert_eq!(text, "Unauthenticated");
    }
    Ok(())
}

#[tokio::test]
async fn create_reports_each_missing_field_distinctly() -> Result<()> {
    let server = server_with_stores().await?;

    let missing_name = server.as_user(server.post("/api/S1/sizes"), "carol")?.json(&json!({"value": "S"}));
    assert_eq!(
        common::text(missing_name).await?,
        (StatusCode::BAD_REQUEST, "Name is required".to_string())
    );

    let missing_value = server.as_user(server.post("/api/S1/sizes"), "carol")?.json(&json!({"name": "Small"}));
    assert_eq!(
        common::text(missing_value).await?,
        (StatusCode::BAD_REQUEST, "Value is required".to_string())
    );

    let blank_value = server
        .as_user(server.post("/api/S1/sizes"), "carol")?
        .json(&json!({"name": "Small", "value": "   "}));
    assert_eq!(
        common::text(blank_value).await?,
        (StatusCode::BAD_REQUEST, "Value is required".to_string())
    );
    Ok(())
}

#[tokio::test]
async fn malformed_json_is_rejected() -> Result<()> {
    let server = server_with_stores().await?;

    let request = server.as_user(server.post("/api/S1/sizes"), "carol")?.body("{name:");
    assert_eq!(
        common::text(request).await?,
        (StatusCode::BAD_REQUEST, "Invalid JSON body".to_string())
    );
    Ok(())
}

#[tokio::test]
async fn create_on_someone_elses_store_is_forbidden() -> Result<()> {
    let server = server_with_stores().await?;

    let request = server
        .as_user(server.post("/api/S2/sizes"), "carol")?
        .json(&json!({"name": "Small", "value": "S"}));
    assert_eq!(
        common::text(request).await?,
        (StatusCode::FORBIDDEN, "Unauthorized".to_string())
    );

    let request = server
        .as_user(server.post("/api/missing/sizes"), "carol")?
        .json(&json!({"name": "Small", "value": "S"}));
    assert_eq!(common::text(request).await?.0, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn create_scopes_the_row_to_the_path_store() -> Result<()> {
    let server = server_with_stores().await?;

    let request = server
        .as_user(server.post("/api/S1/sizes"), "carol")?
        .json(&json!({"name": "Small", "value": "S", "storeId": "S2", "id": "chosen"}));
    let (status, body) = common::json(request).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["storeId"], "S1");
    assert_eq!(body["name"], "Small");
    assert_eq!(body["value"], "S");
    assert_ne!(body["id"], "chosen");
    assert!(body["createdAt"].is_string());
    Ok(())
}

#[tokio::test]
async fn session_cookie_identifies_the_caller() -> Result<()> {
    let server = server_with_stores().await?;
    let token = server.token("carol")?;

    let request = server
        .post("/api/S1/sizes")
        .header("cookie", format!("__session={}", token))
        .json(&json!({"name": "Medium", "value": "M"}));
    assert_eq!(common::json(request).await?.0, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn list_on_an_empty_store_is_an_empty_array() -> Result<()> {
    let server = server_with_stores().await?;

    let (status, body) = common::json(server.get("/api/S1/sizes")).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
    Ok(())
}

#[tokio::test]
async fn list_does_not_depend_on_the_caller() -> Result<()> {
    let server = server_with_stores().await?;
    let create = server
        .as_user(server.post("/api/S1/sizes"), "carol")?
        .json(&json!({"name": "Small", "value": "S"}));
    assert_eq!(common::json(create).await?.0, StatusCode::OK);

    let (_, anonymous) = common::json(server.get("/api/S1/sizes")).await?;
    let (_, owner) = common::json(server.as_user(server.get("/api/S1/sizes"), "carol")?).await?;
    let (_, stranger) = common::json(server.as_user(server.get("/api/S1/sizes"), "dave")?).await?;

    assert_eq!(anonymous.as_array().map(Vec::len), Some(1));
    assert_eq!(anonymous, owner);
    assert_eq!(anonymous, stranger);
    Ok(())
}

#[tokio::test]
async fn owner_creates_and_lists_while_strangers_are_refused() -> Result<()> {
    let server = server_with_stores().await?;

    let own = server
        .as_user(server.post("/api/S1/sizes"), "carol")?
        .json(&json!({"name": "Small", "value": "S"}));
    let (status, created) = common::json(own).await?;
    assert_eq!(status, StatusCode::OK);

    let other = server
        .as_user(server.post("/api/S2/sizes"), "carol")?
        .json(&json!({"name": "Small", "value": "S"}));
    assert_eq!(common::text(other).await?.0, StatusCode::FORBIDDEN);

    let (status, listed) = common::json(server.get("/api/S1/sizes")).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed, json!([created]));

    let (_, other_store) = common::json(server.get("/api/S2/sizes")).await?;
    assert_eq!(other_store, json!([]));
    Ok(())
}
