use crate::common;
use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_missing_permission_is_forbidden() {
    let (state, client) = common::setup().await;

    let user = common::db::create_user_with_permissions(&state.pool, &["customers.read"])
        .await
        .expect("Failed to create user");
    let token = common::jwt::create_test_token(&user, &state.jwt_secret);

    let allowed = client.get_with_auth("/customers", &token).await;
    allowed.assert_status(StatusCode::OK);

    let denied = client.get_with_auth("/products", &token).await;
    denied.assert_status(StatusCode::FORBIDDEN);
    let body: serde_json::Value = denied.json();
    assert!(body["error"].as_str().unwrap().contains("products.read"));
}

#[tokio::test]
async fn test_user_without_role_has_no_permissions() {
    let (state, client) = common::setup().await;

    let user = common::db::create_user_without_role(&state.pool)
        .await
        .expect("Failed to create user");
    let token = common::jwt::create_test_token(&user, &state.jwt_secret);

    let response = client.get_with_auth("/customers", &token).await;

    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_additional_roles_extend_permissions() {
    let (state, client) = common::setup().await;

    let admin = common::db::create_admin(&state.pool)
        .await
        .expect("Failed to create admin");
    let admin_token = common::jwt::create_test_token(&admin, &state.jwt_secret);

    let user = common::db::create_user_with_permissions(&state.pool, &["customers.read"])
        .await
        .expect("Failed to create user");
    let token = common::jwt::create_test_token(&user, &state.jwt_secret);

    let extra_role = common::db::create_role(&state.pool, &["products.read"])
        .await
        .expect("Failed to create role");

    client
        .get_with_auth("/products", &token)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let response = client
        .put_json_with_auth(
            &format!("/users/{}/roles", user.id),
            &json!({ "role_ids": [extra_role] }),
            &admin_token,
        )
        .await;
    response.assert_status(StatusCode::OK);

    client
        .get_with_auth("/products", &token)
        .await
        .assert_status(StatusCode::OK);

    let me: serde_json::Value = client.get_with_auth("/auth/me", &token).await.json();
    assert_eq!(me["permissions"], json!(["customers.read", "products.read"]));
}

#[tokio::test]
async fn test_role_crud_and_permission_replacement() {
    let (state, client) = common::setup().await;

    let admin = common::db::create_admin(&state.pool)
        .await
        .expect("Failed to create admin");
    let token = common::jwt::create_test_token(&admin, &state.jwt_secret);

    let name = common::test_data::unique_code("clerk");
    let response = client
        .post_json_with_auth(
            "/roles",
            &json!({ "name": name, "permission_codes": ["inventory.read", "inventory.create"] }),
            &token,
        )
        .await;
    response.assert_status(StatusCode::CREATED);
    let role: serde_json::Value = response.json();
    let role_id = role["id"].as_str().unwrap().to_string();
    assert_eq!(role["permissions"].as_array().unwrap().len(), 2);

    let response = client
        .put_json_with_auth(
            &format!("/roles/{role_id}/permissions"),
            &json!({ "permission_codes": ["invoices.read"] }),
            &token,
        )
        .await;
    response.assert_status(StatusCode::OK);
    let role: serde_json::Value = response.json();
    assert_eq!(role["permissions"][0]["code"], "invoices.read");
    assert_eq!(role["permissions"].as_array().unwrap().len(), 1);

    let response = client
        .put_json_with_auth(
            &format!("/roles/{role_id}/permissions"),
            &json!({ "permission_codes": ["invoices.fly"] }),
            &token,
        )
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = client
        .delete_with_auth(&format!("/roles/{role_id}"), &token)
        .await;
    response.assert_status(StatusCode::OK);

    let response = client
        .get_with_auth(&format!("/roles/{role_id}"), &token)
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_role_cannot_be_deleted() {
    let (state, client) = common::setup().await;

    let admin = common::db::create_admin(&state.pool)
        .await
        .expect("Failed to create admin");
    let token = common::jwt::create_test_token(&admin, &state.jwt_secret);

    let roles: serde_json::Value = client.get_with_auth("/roles", &token).await.json();
    let admin_role = roles
        .as_array()
        .unwrap()
        .iter()
        .find(|role| role["name"] == "admin")
        .expect("admin role should be seeded");

    let response = client
        .delete_with_auth(
            &format!("/roles/{}", admin_role["id"].as_str().unwrap()),
            &token,
        )
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_role_in_use_cannot_be_deleted() {
    let (state, client) = common::setup().await;

    let admin = common::db::create_admin(&state.pool)
        .await
        .expect("Failed to create admin");
    let token = common::jwt::create_test_token(&admin, &state.jwt_secret);

    let role_id = common::db::create_role(&state.pool, &["customers.read"])
        .await
        .expect("Failed to create role");
    let user = common::db::create_user_without_role(&state.pool)
        .await
        .expect("Failed to create user");
    sqlx::query("UPDATE users SET role_id = $1 WHERE id = $2")
        .bind(role_id)
        .bind(user.id)
        .execute(&state.pool)
        .await
        .expect("Failed to assign role");

    let response = client
        .delete_with_auth(&format!("/roles/{role_id}"), &token)
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_permission_catalogue_is_listed() {
    let (state, client) = common::setup().await;

    let admin = common::db::create_admin(&state.pool)
        .await
        .expect("Failed to create admin");
    let token = common::jwt::create_test_token(&admin, &state.jwt_secret);

    let response = client.get_with_auth("/permissions", &token).await;

    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    let codes = body
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|p| p["code"].as_str())
        .collect::<Vec<_>>();
    assert!(codes.contains(&"inventory.adjust"));
    assert!(codes.contains(&"facebook.sync"));
}
