use crate::common;
use axum::http::StatusCode;
use serde_json::json;

async fn admin_token(state: &wms_api::ApiState) -> String {
    let admin = common::db::create_admin(&state.pool)
        .await
        .expect("Failed to create admin");
    common::jwt::create_test_token(&admin, &state.jwt_secret)
}

#[tokio::test]
async fn test_create_product_with_attributes() {
    let (state, client) = common::setup().await;
    let token = admin_token(&state).await;

    let sku = common::test_data::unique_code("TSHIRT");
    let response = client
        .post_json_with_auth(
            "/products",
            &json!({
                "sku": sku,
                "name": "T-shirt",
                "price": "150000.00",
                "cost_price": "90000.00",
                "attributes": [
                    { "name": "color", "value": "red" },
                    { "name": "size", "value": "M" },
                ],
            }),
            &token,
        )
        .await;

    response.assert_status(StatusCode::CREATED);
    let product: serde_json::Value = response.json();
    assert_eq!(product["sku"], sku.as_str());
    assert_eq!(product["unit"], "pcs");
    assert_eq!(product["price"], "150000.00");
    assert_eq!(product["is_active"], true);
    assert_eq!(product["stock_quantity"], 0);
    assert_eq!(product["attributes"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_duplicate_attribute_names_are_rejected() {
    let (state, client) = common::setup().await;
    let token = admin_token(&state).await;

    let response = client
        .post_json_with_auth(
            "/products",
            &json!({
                "sku": common::test_data::unique_code("SKU"),
                "name": "Dup attrs",
                "price": "1.00",
                "attributes": [
                    { "name": "Color", "value": "red" },
                    { "name": " color ", "value": "blue" },
                ],
            }),
            &token,
        )
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_negative_price_is_rejected() {
    let (state, client) = common::setup().await;
    let token = admin_token(&state).await;

    let response = client
        .post_json_with_auth(
            "/products",
            &json!({
                "sku": common::test_data::unique_code("SKU"),
                "name": "Negative",
                "price": "-1.00",
            }),
            &token,
        )
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_sub_cent_price_is_rejected() {
    let (state, client) = common::setup().await;
    let token = admin_token(&state).await;

    for (price, cost_price) in [("9.999", "1.00"), ("10.00", "0.125")] {
        client
            .post_json_with_auth(
                "/products",
                &json!({
                    "sku": common::test_data::unique_code("SKU"),
                    "name": "Fractional",
                    "price": price,
                    "cost_price": cost_price,
                }),
                &token,
            )
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    let response = client
        .post_json_with_auth(
            "/products",
            &json!({
                "sku": common::test_data::unique_code("SKU"),
                "name": "Round",
                "price": "7",
            }),
            &token,
        )
        .await;
    response.assert_status(StatusCode::CREATED);
    let product: serde_json::Value = response.json();
    assert_eq!(product["price"], "7.00");
    assert!(product["cost_price"].is_null());
}

#[tokio::test]
async fn test_duplicate_sku() {
    let (state, client) = common::setup().await;
    let token = admin_token(&state).await;

    let body = json!({
        "sku": common::test_data::unique_code("SKU"),
        "name": "Original",
        "price": "1.00",
    });

    client
        .post_json_with_auth("/products", &body, &token)
        .await
        .assert_status(StatusCode::CREATED);

    let response = client.post_json_with_auth("/products", &body, &token).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let error: serde_json::Value = response.json();
    assert_eq!(error["error"], "Product SKU already exists");
}

#[tokio::test]
async fn test_replace_attributes() {
    let (state, client) = common::setup().await;
    let token = admin_token(&state).await;

    let id = common::test_data::create_product(&client, &token, "5.00").await;

    let response = client
        .put_json_with_auth(
            &format!("/products/{id}/attributes"),
            &json!([{ "name": "material", "value": "cotton" }]),
            &token,
        )
        .await;
    response.assert_status(StatusCode::OK);
    let attributes: serde_json::Value = response.json();
    assert_eq!(attributes.as_array().unwrap().len(), 1);
    assert_eq!(attributes[0]["name"], "material");

    let response = client
        .put_json_with_auth(&format!("/products/{id}/attributes"), &json!([]), &token)
        .await;
    response.assert_status(StatusCode::OK);
    let attributes: serde_json::Value = response.json();
    assert!(attributes.as_array().unwrap().is_empty());

    client
        .put_json_with_auth(
            &format!("/products/{}/attributes", uuid::Uuid::new_v4()),
            &json!([]),
            &token,
        )
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_product_and_filter_inactive() {
    let (state, client) = common::setup().await;
    let token = admin_token(&state).await;

    let tag = uuid::Uuid::new_v4().simple().to_string()[..8].to_string();
    let response = client
        .post_json_with_auth(
            "/products",
            &json!({
                "sku": common::test_data::unique_code("SKU"),
                "name": format!("Cà phê sữa {tag}"),
                "price": "25000.00",
            }),
            &token,
        )
        .await;
    let product: serde_json::Value = response.json();
    let id = product["id"].as_str().unwrap();

    let response = client
        .patch_json_with_auth(
            &format!("/products/{id}"),
            &json!({ "is_active": false, "price": "30000.00" }),
            &token,
        )
        .await;
    response.assert_status(StatusCode::OK);
    let product: serde_json::Value = response.json();
    assert_eq!(product["is_active"], false);
    assert_eq!(product["price"], "30000.00");

    let active: serde_json::Value = client
        .get_with_auth(&format!("/products?search=ca%20phe%20{tag}&active=true"), &token)
        .await
        .json();
    assert_eq!(active["total"], 0);

    let inactive: serde_json::Value = client
        .get_with_auth(&format!("/products?search=ca%20phe%20{tag}&active=false"), &token)
        .await
        .json();
    assert_eq!(inactive["total"], 1);
}

#[tokio::test]
async fn test_product_with_stock_cannot_be_deleted() {
    let (state, client) = common::setup().await;
    let token = admin_token(&state).await;

    let product_id = common::test_data::create_product(&client, &token, "10.00").await;
    let warehouse_id = common::test_data::create_warehouse(&client, &token).await;
    common::test_data::receive(&client, &token, product_id, warehouse_id, 3).await;

    let response = client
        .delete_with_auth(&format!("/products/{product_id}"), &token)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    // An emptied slot still keeps its movement history
    let response = client
        .post_json_with_auth(
            "/inventory/adjust",
            &json!({ "product_id": product_id, "warehouse_id": warehouse_id, "quantity": 0 }),
            &token,
        )
        .await;
    response.assert_status(StatusCode::OK);

    let response = client
        .delete_with_auth(&format!("/products/{product_id}"), &token)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let error: serde_json::Value = response.json();
    assert!(error["error"].as_str().unwrap().contains("stock history"));

    let history: serde_json::Value = client
        .get_with_auth(
            &format!("/inventory/transactions?product_id={product_id}"),
            &token,
        )
        .await
        .json();
    assert_eq!(history["total"], 2);

    // A product that never moved can be deleted
    let unused_id = common::test_data::create_product(&client, &token, "10.00").await;
    client
        .delete_with_auth(&format!("/products/{unused_id}"), &token)
        .await
        .assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_product_export_csv() {
    let (state, client) = common::setup().await;
    let token = admin_token(&state).await;

    let sku = common::test_data::unique_code("CSV");
    client
        .post_json_with_auth(
            "/products",
            &json!({ "sku": sku, "name": "Exported", "price": "12.50", "unit": "box" }),
            &token,
        )
        .await
        .assert_status(StatusCode::CREATED);

    let response = client
        .get_with_auth(&format!("/products/export?search={}", sku.to_lowercase()), &token)
        .await;

    response.assert_status(StatusCode::OK);
    let body = response.text();
    let mut lines = body.lines();
    assert_eq!(
        lines.next(),
        Some("sku,name,unit,price,cost_price,stock,active,created_at")
    );
    let row = lines.next().expect("exported row");
    assert!(row.starts_with(&format!("{sku},Exported,box,12.50,,0,true,")));
}
