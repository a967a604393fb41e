mod common;

use anyhow::Result;
use common::TestServer;
use reqwest::StatusCode;
use serde_json::json;
use store_admin::config::AppConfig;

async fn server_with_store() -> Result<TestServer> {
    let server = TestServer::start().await?;
    server.datastore.seed_store("S1", "carol", "Carol's").await;
    server.datastore.seed_store("S2", "dave", "Dave's").await;
    Ok(server)
}

#[tokio::test]
async fn other_entities_name_their_own_fields() -> Result<()> {
    let server = server_with_store().await?;

    let cases = [
        ("/api/S1/billboards", "Label is required\nImage URL is required"),
        ("/api/S1/categories", "Name is required\nBillboard ID is required"),
        ("/api/S1/colors", "Name is required\nValue is required"),
        (
            "/api/S1/products",
            "Name is required\nPrice is required\nCategory ID is required\nSize ID is required\nColor ID is required",
        ),
    ];

    for (path, expected) in cases {
        let request = server.as_user(server.post(path), "carol")?.json(&json!({}));
        assert_eq!(
            common::text(request).await?,
            (StatusCode::BAD_REQUEST, expected.to_string()),
            "{}",
            path
        );
    }
    Ok(())
}

/// POST as `user_id` and return the created row's id
async fn create_row(server: &TestServer, user_id: &str, path: &str, body: serde_json::Value) -> Result<String> {
    let (status, row) = common::json(server.as_user(server.post(path), user_id)?.json(&body)).await?;
    assert_eq!(status, StatusCode::OK, "{} {}", path, row);
    Ok(row["id"].as_str().unwrap_or_default().to_string())
}

#[tokio::test]
async fn products_carry_numbers_and_flags() -> Result<()> {
    let server = server_with_store().await?;
    let billboard = create_row(
        &server,
        "carol",
        "/api/S1/billboards",
        json!({"label": "Summer", "imageUrl": "https://img/summer.png"}),
    )
    .await?;
    let category = create_row(&server, "carol", "/api/S1/categories", json!({"name": "Tees", "billboardId": billboard})).await?;
    let size = create_row(&server, "carol", "/api/S1/sizes", json!({"name": "Medium", "value": "M"})).await?;
    let color = create_row(&server, "carol", "/api/S1/colors", json!({"name": "Navy", "value": "#001f3f"})).await?;

    let request = server.as_user(server.post("/api/S1/products"), "carol")?.json(&json!({
        "name": "Tee",
        "price": 19.5,
        "categoryId": category,
        "sizeId": size,
        "colorId": color,
        "isFeatured": true
    }));
    let (status, product) = common::json(request).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(product["price"], 19.5);
    assert_eq!(product["isFeatured"], true);
    assert_eq!(product["isArchived"], false);
    assert_eq!(product["categoryId"], category.as_str());

    let wrong_kind = server.as_user(server.post("/api/S1/products"), "carol")?.json(&json!({
        "name": "Tee",
        "price": "cheap",
        "categoryId": category,
        "sizeId": size,
        "colorId": color
    }));
    let (status, message) = common::text(wrong_kind).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(message, "Price must be a number");
    Ok(())
}

#[tokio::test]
async fn references_into_another_store_are_rejected() -> Result<()> {
    let server = server_with_store().await?;
    let foreign = create_row(
        &server,
        "dave",
        "/api/S2/billboards",
        json!({"label": "Dave's", "imageUrl": "https://img/dave.png"}),
    )
    .await?;

    let request = server
        .as_user(server.post("/api/S1/categories"), "carol")?
        .json(&json!({"name": "Mine", "billboardId": foreign}));
    assert_eq!(
        common::text(request).await?,
        (StatusCode::BAD_REQUEST, "Billboard ID does not belong to this store".to_string())
    );

    let own = create_row(
        &server,
        "carol",
        "/api/S1/billboards",
        json!({"label": "Carol's", "imageUrl": "https://img/carol.png"}),
    )
    .await?;
    let category = create_row(&server, "carol", "/api/S1/categories", json!({"name": "Mine", "billboardId": own})).await?;

    let relink = server
        .as_user(server.patch(&format!("/api/S1/categories/{}", category)), "carol")?
        .json(&json!({"name": "Mine", "billboardId": foreign}));
    assert_eq!(common::text(relink).await?.0, StatusCode::BAD_REQUEST);

    let (_, shown) = common::json(server.get(&format!("/api/S1/categories/{}", category))).await?;
    assert_eq!(shown["billboardId"], own.as_str());
    Ok(())
}

#[tokio::test]
async fn dangling_references_are_rejected() -> Result<()> {
    let server = server_with_store().await?;

    let request = server.as_user(server.post("/api/S1/products"), "carol")?.json(&json!({
        "name": "Tee",
        "price": 10,
        "categoryId": "c1",
        "sizeId": "s1",
        "colorId": "k1"
    }));
    assert_eq!(
        common::text(request).await?,
        (
            StatusCode::BAD_REQUEST,
            "Category ID does not belong to this store\nSize ID does not belong to this store\nColor ID does not belong to this store"
                .to_string()
        )
    );

    let request = server
        .as_user(server.post("/api/S1/categories"), "carol")?
        .json(&json!({"name": "Ghost", "billboardId": "does-not-exist"}));
    assert_eq!(common::text(request).await?.0, StatusCode::BAD_REQUEST);

    let (_, categories) = common::json(server.get("/api/S1/categories")).await?;
    assert_eq!(categories, json!([]));
    Ok(())
}

#[tokio::test]
async fn rows_still_referenced_cannot_be_deleted() -> Result<()> {
    let server = server_with_store().await?;
    let billboard = create_row(
        &server,
        "carol",
        "/api/S1/billboards",
        json!({"label": "Summer", "imageUrl": "https://img/summer.png"}),
    )
    .await?;
    let category = create_row(&server, "carol", "/api/S1/categories", json!({"name": "Tees", "billboardId": billboard})).await?;

    let billboard_path = format!("/api/S1/billboards/{}", billboard);
    let (status, _) = common::text(server.as_user(server.delete(&billboard_path), "carol")?).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(common::json(server.get(&billboard_path)).await?.0, StatusCode::OK);

    let category_path = format!("/api/S1/categories/{}", category);
    assert_eq!(common::json(server.as_user(server.delete(&category_path), "carol")?).await?.0, StatusCode::OK);
    assert_eq!(common::json(server.as_user(server.delete(&billboard_path), "carol")?).await?.0, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn show_update_and_delete_a_size() -> Result<()> {
    let server = server_with_store().await?;

    let create = server
        .as_user(server.post("/api/S1/sizes"), "carol")?
        .json(&json!({"name": "Small", "value": "S"}));
    let (_, size) = common::json(create).await?;
    let path = format!("/api/S1/sizes/{}", size["id"].as_str().unwrap_or_default());

    let (status, shown) = common::json(server.get(&path)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(shown, size);

    let stranger = server
        .as_user(server.patch(&path), "dave")?
        .json(&json!({"name": "Tiny", "value": "XS"}));
    assert_eq!(common::text(stranger).await?.0, StatusCode::FORBIDDEN);

    let incomplete = server.as_user(server.patch(&path), "carol")?.json(&json!({"name": "Tiny"}));
    assert_eq!(
        common::text(incomplete).await?,
        (StatusCode::BAD_REQUEST, "Value is required".to_string())
    );

    let update = server
        .as_user(server.patch(&path), "carol")?
        .json(&json!({"name": "Tiny", "value": "XS"}));
    let (status, updated) = common::json(update).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Tiny");
    assert_eq!(updated["id"], size["id"]);

    let (status, removed) = common::json(server.as_user(server.delete(&path), "carol")?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(removed["value"], "XS");

    assert_eq!(
        common::text(server.get(&path)).await?,
        (StatusCode::NOT_FOUND, "Size not found".to_string())
    );
    assert_eq!(
        common::text(server.as_user(server.delete(&path), "carol")?).await?,
        (StatusCode::NOT_FOUND, "Size not found".to_string())
    );
    Ok(())
}

#[tokio::test]
async fn records_are_invisible_through_another_store() -> Result<()> {
    let server = server_with_store().await?;

    let create = server
        .as_user(server.post("/api/S1/colors"), "carol")?
        .json(&json!({"name": "Red", "value": "#f00"}));
    let (_, color) = common::json(create).await?;
    let id = color["id"].as_str().unwrap_or_default();

    let (status, message) = common::text(server.get(&format!("/api/S2/colors/{}", id))).await?;
    assert_eq!((status, message.as_str()), (StatusCode::NOT_FOUND, "Color not found"));

    let delete = server.as_user(server.delete(&format!("/api/S2/colors/{}", id)), "dave")?;
    assert_eq!(common::text(delete).await?.0, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn closed_catalog_reads_require_the_owner() -> Result<()> {
    let mut config = AppConfig::development();
    config.security.public_catalog_reads = false;
    let server = TestServer::start_with(config).await?;
    server.datastore.seed_store("S1", "carol", "Carol's").await;

    assert_eq!(
        common::text(server.get("/api/S1/sizes")).await?,
        (StatusCode::UNAUTHORIZED, "Unauthenticated".to_string())
    );
    assert_eq!(
        common::text(server.as_user(server.get("/api/S1/sizes"), "dave")?).await?.0,
        StatusCode::FORBIDDEN
    );
    let (status, body) = common::json(server.as_user(server.get("/api/S1/sizes"), "carol")?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
    Ok(())
}

#[tokio::test]
async fn service_endpoints_use_the_envelope() -> Result<()> {
    let server = server_with_store().await?;

    let (status, health) = common::json(server.get("/health")).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["success"], true);
    assert_eq!(health["data"]["database"], "ok");

    let (status, info) = common::json(server.get("/api")).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(info["data"]["name"], "Store Admin");
    Ok(())
}
