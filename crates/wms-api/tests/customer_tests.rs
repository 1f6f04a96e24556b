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
async fn test_customer_group_lifecycle() {
    let (state, client) = common::setup().await;
    let token = admin_token(&state).await;

    let code = common::test_data::unique_code("VIP");
    let response = client
        .post_json_with_auth(
            "/customer-groups",
            &json!({ "code": code, "name": "VIP customers" }),
            &token,
        )
        .await;
    response.assert_status(StatusCode::CREATED);
    let group: serde_json::Value = response.json();
    let group_id = group["id"].as_str().unwrap().to_string();
    assert_eq!(group["customer_count"], 0);

    // Same code again
    client
        .post_json_with_auth(
            "/customer-groups",
            &json!({ "code": code, "name": "Duplicate" }),
            &token,
        )
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let response = client
        .patch_json_with_auth(
            &format!("/customer-groups/{group_id}"),
            &json!({ "name": "Gold customers" }),
            &token,
        )
        .await;
    response.assert_status(StatusCode::OK);
    let group: serde_json::Value = response.json();
    assert_eq!(group["name"], "Gold customers");
    assert_eq!(group["code"], code.as_str());

    let response = client
        .delete_with_auth(&format!("/customer-groups/{group_id}"), &token)
        .await;
    response.assert_status(StatusCode::OK);

    client
        .get_with_auth(&format!("/customer-groups/{group_id}"), &token)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_group_with_customers_cannot_be_deleted() {
    let (state, client) = common::setup().await;
    let token = admin_token(&state).await;

    let group: serde_json::Value = client
        .post_json_with_auth(
            "/customer-groups",
            &json!({ "code": common::test_data::unique_code("G"), "name": "Retail" }),
            &token,
        )
        .await
        .json();
    let group_id = group["id"].as_str().unwrap().to_string();

    let response = client
        .post_json_with_auth(
            "/customers",
            &json!({
                "code": common::test_data::unique_code("C"),
                "name": "Grouped customer",
                "group_id": group_id,
            }),
            &token,
        )
        .await;
    response.assert_status(StatusCode::CREATED);
    let customer: serde_json::Value = response.json();
    assert_eq!(customer["group_name"], "Retail");

    let group: serde_json::Value = client
        .get_with_auth(&format!("/customer-groups/{group_id}"), &token)
        .await
        .json();
    assert_eq!(group["customer_count"], 1);

    client
        .delete_with_auth(&format!("/customer-groups/{group_id}"), &token)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_customer_with_unknown_group() {
    let (state, client) = common::setup().await;
    let token = admin_token(&state).await;

    let response = client
        .post_json_with_auth(
            "/customers",
            &json!({
                "code": common::test_data::unique_code("C"),
                "name": "Lost customer",
                "group_id": uuid::Uuid::new_v4(),
            }),
            &token,
        )
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_customer_validation() {
    let (state, client) = common::setup().await;
    let token = admin_token(&state).await;

    let cases = [
        json!({ "code": "", "name": "No code" }),
        json!({ "code": "HAS SPACE", "name": "Bad code" }),
        json!({ "code": common::test_data::unique_code("C"), "name": "" }),
        json!({ "code": common::test_data::unique_code("C"), "name": "Bad email", "email": "nope" }),
    ];

    for body in cases {
        let response = client.post_json_with_auth("/customers", &body, &token).await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_duplicate_customer_code() {
    let (state, client) = common::setup().await;
    let token = admin_token(&state).await;

    let code = common::test_data::unique_code("C");
    let body = json!({ "code": code, "name": "First" });

    client
        .post_json_with_auth("/customers", &body, &token)
        .await
        .assert_status(StatusCode::CREATED);

    let response = client.post_json_with_auth("/customers", &body, &token).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let error: serde_json::Value = response.json();
    assert_eq!(error["error"], "Customer code already exists");
}

#[tokio::test]
async fn test_customer_search_ignores_accents_and_case() {
    let (state, client) = common::setup().await;
    let token = admin_token(&state).await;

    let tag = uuid::Uuid::new_v4().simple().to_string()[..8].to_string();
    let response = client
        .post_json_with_auth(
            "/customers",
            &json!({
                "code": common::test_data::unique_code("C"),
                "name": format!("Nguyễn Văn Đức {tag}"),
                "phone": "0901234567",
            }),
            &token,
        )
        .await;
    response.assert_status(StatusCode::CREATED);

    let response = client
        .get_with_auth(
            &format!("/customers?search=NGUYEN%20van%20duc%20{tag}"),
            &token,
        )
        .await;
    response.assert_status(StatusCode::OK);
    let page: serde_json::Value = response.json();
    assert_eq!(page["total"], 1);
    assert_eq!(page["page"], 1);
    assert_eq!(page["limit"], 20);
    assert_eq!(page["data"][0]["phone"], "0901234567");
}

#[tokio::test]
async fn test_customer_pagination_bounds() {
    let (state, client) = common::setup().await;
    let token = admin_token(&state).await;

    client
        .get_with_auth("/customers?page=0", &token)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    client
        .get_with_auth("/customers?limit=101", &token)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    client
        .get_with_auth("/customers?page=2&limit=5", &token)
        .await
        .assert_status(StatusCode::OK);

    // Offset would not fit in an i64
    client
        .get_with_auth("/customers?page=9223372036854775807&limit=100", &token)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    client
        .get_with_auth("/products?page=92233720368547760&limit=100", &token)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_customer_search_matches_every_word() {
    let (state, client) = common::setup().await;
    let token = admin_token(&state).await;

    let tag = uuid::Uuid::new_v4().simple().to_string()[..8].to_string();
    for name in [format!("Tran Thi Mai {tag}"), format!("Tran_Mai {tag}")] {
        client
            .post_json_with_auth(
                "/customers",
                &json!({ "code": common::test_data::unique_code("C"), "name": name }),
                &token,
            )
            .await
            .assert_status(StatusCode::CREATED);
    }

    // Words match in any order, even with text between them
    let page: serde_json::Value = client
        .get_with_auth(&format!("/customers?search={tag}%20mai%20tran"), &token)
        .await
        .json();
    assert_eq!(page["total"], 2);

    let page: serde_json::Value = client
        .get_with_auth(&format!("/customers?search=thi%20{tag}"), &token)
        .await
        .json();
    assert_eq!(page["total"], 1);

    // `_` is an ordinary character, not a wildcard
    let page: serde_json::Value = client
        .get_with_auth(&format!("/customers?search=tran_mai%20{tag}"), &token)
        .await
        .json();
    assert_eq!(page["total"], 1);
    assert_eq!(page["data"][0]["name"], format!("Tran_Mai {tag}"));

    let page: serde_json::Value = client
        .get_with_auth(&format!("/customers?search=tran_thi%20{tag}"), &token)
        .await
        .json();
    assert_eq!(page["total"], 0);
}

#[tokio::test]
async fn test_update_customer_clears_optional_fields() {
    let (state, client) = common::setup().await;
    let token = admin_token(&state).await;

    let response = client
        .post_json_with_auth(
            "/customers",
            &json!({
                "code": common::test_data::unique_code("C"),
                "name": "Has phone",
                "phone": "0900000000",
                "address": "1 Main St",
            }),
            &token,
        )
        .await;
    let customer: serde_json::Value = response.json();
    let id = customer["id"].as_str().unwrap();

    let response = client
        .patch_json_with_auth(
            &format!("/customers/{id}"),
            &json!({ "phone": "", "name": "Renamed" }),
            &token,
        )
        .await;
    response.assert_status(StatusCode::OK);
    let customer: serde_json::Value = response.json();
    assert!(customer["phone"].is_null());
    assert_eq!(customer["name"], "Renamed");
    assert_eq!(customer["address"], "1 Main St");

    client
        .patch_json_with_auth(&format!("/customers/{id}"), &json!({}), &token)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_customer() {
    let (state, client) = common::setup().await;
    let token = admin_token(&state).await;

    let id = common::test_data::create_customer(&client, &token).await;

    let response = client
        .delete_with_auth(&format!("/customers/{id}"), &token)
        .await;
    response.assert_status(StatusCode::OK);

    client
        .get_with_auth(&format!("/customers/{id}"), &token)
        .await
        .assert_status(StatusCode::NOT_FOUND);
    client
        .delete_with_auth(&format!("/customers/{id}"), &token)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_customer_export_csv() {
    let (state, client) = common::setup().await;
    let token = admin_token(&state).await;

    let tag = uuid::Uuid::new_v4().simple().to_string()[..8].to_string();
    let code = common::test_data::unique_code("C");
    client
        .post_json_with_auth(
            "/customers",
            &json!({ "code": code, "name": format!("Acme, Ltd {tag}") }),
            &token,
        )
        .await
        .assert_status(StatusCode::CREATED);

    let response = client
        .get_with_auth(&format!("/customers/export?search={tag}"), &token)
        .await;

    response.assert_status(StatusCode::OK);
    assert_eq!(
        response.header("content-type"),
        Some("text/csv; charset=utf-8")
    );
    let body = response.text();
    let mut lines = body.lines();
    assert_eq!(
        lines.next(),
        Some("code,name,phone,email,address,group,created_at")
    );
    let row = lines.next().expect("exported row");
    assert!(row.starts_with(&format!("{code},\"Acme, Ltd {tag}\",")));
    assert_eq!(lines.next(), None);
}
