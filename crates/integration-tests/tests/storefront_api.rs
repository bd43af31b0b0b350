//! HTTP surface of the storefront, driven in-process on local storage.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use eclat_catalog::CatalogContext;
use eclat_core::{NewBrand, NewProduct, Price};
use eclat_integration_tests::{ADMIN_TOKEN, offline_catalog, storefront};
use serde_json::{Value, json};
use tower::ServiceExt;

const CUSTOMER_TOKEN: &str = "client-42";

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, value)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None, None).await
}

async fn seeded_catalog(dir: &tempfile::TempDir) -> CatalogContext {
    let catalog = offline_catalog(dir).await;
    let brand = catalog
        .brands()
        .create(NewBrand { name: "Extra Clean".to_string() })
        .await
        .unwrap();
    for (name, price) in [("Nettoyant Vitres", 1350), ("Savon Noir", 450)] {
        catalog
            .products()
            .create(NewProduct {
                name: name.to_string(),
                description: None,
                price: Price::from_minor_units(price).unwrap(),
                image_url: None,
                category_id: None,
                brand_id: Some(brand.id.clone()),
            })
            .await
            .unwrap();
    }
    catalog
}

#[tokio::test]
async fn test_health_endpoints() {
    let dir = tempfile::tempdir().unwrap();
    let app = storefront(offline_catalog(&dir).await);

    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");

    let (status, body) = get(&app, "/health/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mode"], "offline");
}

#[tokio::test]
async fn test_product_listing_resolves_labels() {
    let dir = tempfile::tempdir().unwrap();
    let app = storefront(seeded_catalog(&dir).await);

    let (status, body) = get(&app, "/api/products").await;
    assert_eq!(status, StatusCode::OK);
    let products = body.as_array().unwrap();
    assert_eq!(products.len(), 2);
    assert_eq!(products[0]["name"], "Nettoyant Vitres");
    assert_eq!(products[0]["brand_name"], "Extra Clean");
    assert_eq!(products[0]["price"], 1350);
    assert_eq!(products[0]["category_name"], Value::Null);

    let (status, body) = get(&app, "/api/products?sort=price_asc&limit=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["name"], "Savon Noir");

    let (status, body) = get(&app, "/api/products?q=vitres").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_deleted_brand_shows_unknown_label() {
    let dir = tempfile::tempdir().unwrap();
    let app = storefront(seeded_catalog(&dir).await);

    let (_, brands) = get(&app, "/api/brands").await;
    let brand_id = brands[0]["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/admin/brands/{brand_id}"),
        Some(ADMIN_TOKEN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, brands) = get(&app, "/api/brands").await;
    assert!(brands.as_array().unwrap().is_empty());

    let (_, products) = get(&app, "/api/products").await;
    assert_eq!(products.as_array().unwrap().len(), 2);
    assert_eq!(products[0]["brand_id"], brand_id.as_str());
    assert_eq!(products[0]["brand_name"], "Inconnu");
}

#[tokio::test]
async fn test_admin_create_is_visible_immediately() {
    let dir = tempfile::tempdir().unwrap();
    let app = storefront(offline_catalog(&dir).await);

    let (_, brands) = get(&app, "/api/brands").await;
    assert!(brands.as_array().unwrap().is_empty());

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/admin/brands",
        Some(ADMIN_TOKEN),
        Some(json!({ "name": "Javel Plus" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "Javel Plus");

    let (_, brands) = get(&app, "/api/brands").await;
    assert_eq!(brands[0]["id"], created["id"]);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/admin/brands",
        Some(ADMIN_TOKEN),
        Some(json!({ "name": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_admin_routes_require_role() {
    let dir = tempfile::tempdir().unwrap();
    let app = storefront(offline_catalog(&dir).await);
    let brand = json!({ "name": "Extra Clean" });

    let (status, _) = send(&app, Method::POST, "/api/admin/brands", None, Some(brand.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/admin/brands",
        Some("pas un jeton"),
        Some(brand.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/admin/brands",
        Some(CUSTOMER_TOKEN),
        Some(brand),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_delete_of_unknown_id_is_no_content() {
    let dir = tempfile::tempdir().unwrap();
    let app = storefront(offline_catalog(&dir).await);

    for uri in ["/api/admin/products/missing", "/api/admin/brands/missing"] {
        let (status, _) = send(&app, Method::DELETE, uri, Some(ADMIN_TOKEN), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT, "{uri}");
    }
}

#[tokio::test]
async fn test_product_detail_and_missing_product() {
    let dir = tempfile::tempdir().unwrap();
    let app = storefront(seeded_catalog(&dir).await);

    let (_, products) = get(&app, "/api/products").await;
    let id = products[0]["id"].as_str().unwrap();

    let (status, body) = get(&app, &format!("/api/products/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["image_url"], "/placeholder.svg");
    assert_eq!(body["brand_name"], "Extra Clean");

    let (status, body) = get(&app, "/api/products/missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_listing_limit_is_capped() {
    let dir = tempfile::tempdir().unwrap();
    let app = storefront(offline_catalog(&dir).await);

    let (status, _) = get(&app, "/api/products?limit=101").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(&app, "/api/products?limit=100").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_favorites_flow() {
    let dir = tempfile::tempdir().unwrap();
    let app = storefront(offline_catalog(&dir).await);

    let (status, _) = get(&app, "/api/favorites").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let favorites = |method: Method, uri: &'static str| {
        let app = app.clone();
        async move { send(&app, method, uri, Some(CUSTOMER_TOKEN), None).await }
    };

    let (status, body) = favorites(Method::POST, "/api/favorites/p-1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["favorited"], true);

    let (_, body) = favorites(Method::PUT, "/api/favorites/p-2").await;
    assert_eq!(body["favorited"], true);

    let (_, body) = favorites(Method::GET, "/api/favorites").await;
    assert_eq!(body, json!(["p-1", "p-2"]));

    let (_, body) = favorites(Method::POST, "/api/favorites/p-1").await;
    assert_eq!(body["favorited"], false);

    let (status, _) = favorites(Method::DELETE, "/api/favorites/p-2").await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = favorites(Method::GET, "/api/favorites").await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_search_history_flow() {
    let dir = tempfile::tempdir().unwrap();
    let app = storefront(offline_catalog(&dir).await);
    let uri = "/api/search-history";

    for query in ["javel", "vitres"] {
        let (status, _) = send(
            &app,
            Method::POST,
            uri,
            Some(CUSTOMER_TOKEN),
            Some(json!({ "query": query })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, body) = send(&app, Method::GET, uri, Some(CUSTOMER_TOKEN), None).await;
    let queries: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["query"].as_str().unwrap())
        .collect();
    assert_eq!(queries, ["vitres", "javel"]);

    // Histories are per user
    let (_, body) = send(&app, Method::GET, uri, Some(ADMIN_TOKEN), None).await;
    assert_eq!(body, json!([]));

    let (status, _) = send(&app, Method::DELETE, uri, Some(CUSTOMER_TOKEN), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, body) = send(&app, Method::GET, uri, Some(CUSTOMER_TOKEN), None).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_image_upload_via_multipart() {
    let dir = tempfile::tempdir().unwrap();
    let app = storefront(seeded_catalog(&dir).await);

    let (_, products) = get(&app, "/api/products").await;
    let id = products[0]["id"].as_str().unwrap().to_string();

    let boundary = "eclat-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"flacon.png\"\r\nContent-Type: image/png\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(&[1, 2, 3]);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri(format!("/api/admin/products/{id}/image"))
        .header(header::AUTHORIZATION, format!("Bearer {ADMIN_TOKEN}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (_, detail) = get(&app, &format!("/api/products/{id}")).await;
    assert_eq!(detail["image_url"], "data:image/png;base64,AQID");
}
