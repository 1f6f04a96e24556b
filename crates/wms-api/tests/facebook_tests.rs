use crate::common;
use axum::http::StatusCode;
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

fn unique_fb_id() -> String {
    uuid::Uuid::new_v4().as_u128().to_string()[..15].to_string()
}

async fn admin_token(state: &wms_api::ApiState) -> String {
    let admin = common::db::create_admin(&state.pool)
        .await
        .expect("Failed to create admin");
    common::jwt::create_test_token(&admin, &state.jwt_secret)
}

/// One page with a two-message conversation and a post with two comments
struct GraphFixture {
    server: MockServer,
    page_fb_id: String,
    customer_fb_id: String,
}

async fn mock_graph() -> GraphFixture {
    let server = MockServer::start().await;
    let page_fb_id = unique_fb_id();
    let customer_fb_id = unique_fb_id();
    let commenter_fb_id = unique_fb_id();

    Mock::given(method("GET"))
        .and(path("/v19.0/me/accounts"))
        .and(query_param("access_token", "user-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "id": page_fb_id,
                "name": "Shop page",
                "category": "Retail",
                "access_token": "page-token",
            }],
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/v19.0/{page_fb_id}/conversations")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "id": format!("t_{page_fb_id}"),
                "participants": { "data": [
                    { "id": customer_fb_id, "name": "Lan Pham", "email": "lan@example.com" },
                    { "id": page_fb_id, "name": "Shop page" },
                ]},
                "messages": { "data": [
                    {
                        "id": format!("m_{customer_fb_id}_1"),
                        "message": "Is the red shirt in stock?",
                        "from": { "id": customer_fb_id, "name": "Lan Pham" },
                        "created_time": "2024-03-01T08:00:00+0000",
                    },
                    {
                        "id": format!("m_{customer_fb_id}_2"),
                        "message": "Yes, size M and L",
                        "from": { "id": page_fb_id, "name": "Shop page" },
                        "created_time": "2024-03-01T08:05:00+0000",
                    },
                ]},
            }],
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/v19.0/{page_fb_id}/posts")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "id": format!("{page_fb_id}_post1"),
                "message": "New arrivals",
                "created_time": "2024-02-28T10:00:00+0000",
                "comments": { "data": [
                    {
                        "id": format!("c_{commenter_fb_id}_1"),
                        "message": "Price?",
                        "from": { "id": commenter_fb_id, "name": "Minh" },
                        "created_time": "2024-02-28T11:00:00+0000",
                    },
                    {
                        "id": format!("c_{commenter_fb_id}_2"),
                        "message": "Sent you a message",
                        "from": { "id": page_fb_id, "name": "Shop page" },
                        "created_time": "2024-02-28T11:10:00+0000",
                        "parent": { "id": format!("c_{commenter_fb_id}_1") },
                    },
                ]},
            }],
        })))
        .mount(&server)
        .await;

    GraphFixture {
        server,
        page_fb_id,
        customer_fb_id,
    }
}

async fn stored_page_id(
    client: &common::TestClient,
    token: &str,
    page_fb_id: &str,
) -> String {
    let pages: serde_json::Value = client.get_with_auth("/facebook/pages", token).await.json();
    pages
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["page_id"] == page_fb_id)
        .and_then(|p| p["id"].as_str())
        .expect("synced page is listed")
        .to_string()
}

#[tokio::test]
async fn test_sync_stores_pages_messages_and_comments() {
    let graph = mock_graph().await;
    let (state, client) = common::setup_with(
        common::TestStateBuilder::new()
            .with_graph_url(graph.server.uri())
            .with_facebook_token("user-token"),
    )
    .await;
    let token = admin_token(&state).await;

    let response = client.post_with_auth("/facebook/sync", &token).await;
    response.assert_status(StatusCode::OK);
    let summary: serde_json::Value = response.json();
    assert_eq!(summary["pages"], 1);
    assert_eq!(summary["synced_pages"], 1);
    assert_eq!(summary["failed_pages"], 0);
    assert_eq!(summary["users"], 2);
    assert_eq!(summary["messages"], 2);
    assert_eq!(summary["comments"], 2);

    let page_id = stored_page_id(&client, &token, &graph.page_fb_id).await;
    let pages: serde_json::Value = client.get_with_auth("/facebook/pages", &token).await.json();
    let page = pages
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["id"] == page_id.as_str())
        .unwrap();
    assert_eq!(page["name"], "Shop page");
    assert!(!page["last_synced_at"].is_null());
    assert!(page.get("access_token").is_none());

    let messages: serde_json::Value = client
        .get_with_auth(&format!("/facebook/pages/{page_id}/messages"), &token)
        .await
        .json();
    assert_eq!(messages["total"], 2);
    let senders: Vec<&str> = messages["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|m| m["sender_fb_id"].as_str())
        .collect();
    assert!(senders.contains(&graph.customer_fb_id.as_str()));

    let comments: serde_json::Value = client
        .get_with_auth(&format!("/facebook/pages/{page_id}/comments"), &token)
        .await
        .json();
    assert_eq!(comments["total"], 2);
    assert!(
        comments["data"]
            .as_array()
            .unwrap()
            .iter()
            .any(|c| !c["parent_comment_id"].is_null())
    );
}

#[tokio::test]
async fn test_resync_does_not_duplicate() {
    let graph = mock_graph().await;
    let (state, client) = common::setup_with(
        common::TestStateBuilder::new()
            .with_graph_url(graph.server.uri())
            .with_facebook_token("user-token"),
    )
    .await;
    let token = admin_token(&state).await;

    client
        .post_with_auth("/facebook/sync", &token)
        .await
        .assert_status(StatusCode::OK);

    let page_id = stored_page_id(&client, &token, &graph.page_fb_id).await;
    let response = client
        .post_with_auth(&format!("/facebook/pages/{page_id}/sync"), &token)
        .await;
    response.assert_status(StatusCode::OK);
    let counts: serde_json::Value = response.json();
    assert_eq!(counts, json!({ "users": 0, "messages": 0, "comments": 0 }));

    let messages: serde_json::Value = client
        .get_with_auth(&format!("/facebook/pages/{page_id}/messages"), &token)
        .await
        .json();
    assert_eq!(messages["total"], 2);

    let logs: serde_json::Value = client
        .get_with_auth(
            &format!("/facebook/activity-logs?page_id={page_id}"),
            &token,
        )
        .await
        .json();
    assert_eq!(logs["total"], 2);
    assert!(
        logs["data"]
            .as_array()
            .unwrap()
            .iter()
            .all(|log| log["action"] == "sync_page" && log["status"] == "success")
    );
}

#[tokio::test]
async fn test_sync_follows_nested_paging() {
    let server = MockServer::start().await;
    let page_fb_id = unique_fb_id();
    let fan_fb_id = unique_fb_id();
    let post_id = format!("{page_fb_id}_post1");
    let conversation_id = format!("t_{page_fb_id}");

    let comment = |n: usize| {
        json!({
            "id": format!("c_{fan_fb_id}_{n}"),
            "message": format!("Comment {n}"),
            "from": { "id": fan_fb_id, "name": "Hoa" },
            "created_time": "2024-02-28T11:00:00+0000",
        })
    };
    let message = |n: usize| {
        json!({
            "id": format!("m_{fan_fb_id}_{n}"),
            "message": format!("Message {n}"),
            "from": { "id": fan_fb_id, "name": "Hoa" },
            "created_time": "2024-03-01T08:00:00+0000",
        })
    };

    Mock::given(method("GET"))
        .and(path("/v19.0/me/accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "id": page_fb_id, "name": "Busy page", "access_token": "page-token" }],
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/v19.0/{page_fb_id}/conversations")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "id": conversation_id,
                "messages": {
                    "data": (1..=25).map(message).collect::<Vec<_>>(),
                    "paging": { "next": format!("{}/v19.0/{conversation_id}/messages?after=m25", server.uri()) },
                },
            }],
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/v19.0/{conversation_id}/messages")))
        .and(query_param("after", "m25"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": (26..=30).map(message).collect::<Vec<_>>(),
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/v19.0/{page_fb_id}/posts")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "id": post_id,
                "message": "Flash sale",
                "comments": {
                    "data": (1..=25).map(comment).collect::<Vec<_>>(),
                    "paging": { "next": format!("{}/v19.0/{post_id}/comments?after=c25", server.uri()) },
                },
            }],
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/v19.0/{post_id}/comments")))
        .and(query_param("after", "c25"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": (26..=27).map(comment).collect::<Vec<_>>(),
        })))
        .mount(&server)
        .await;

    let (state, client) = common::setup_with(
        common::TestStateBuilder::new()
            .with_graph_url(server.uri())
            .with_facebook_token("user-token"),
    )
    .await;
    let token = admin_token(&state).await;

    let response = client.post_with_auth("/facebook/sync", &token).await;
    response.assert_status(StatusCode::OK);
    let summary: serde_json::Value = response.json();
    assert_eq!(summary["synced_pages"], 1);
    assert_eq!(summary["users"], 1);
    assert_eq!(summary["messages"], 30);
    assert_eq!(summary["comments"], 27);

    let page_id = stored_page_id(&client, &token, &page_fb_id).await;
    let comments: serde_json::Value = client
        .get_with_auth(&format!("/facebook/pages/{page_id}/comments"), &token)
        .await
        .json();
    assert_eq!(comments["total"], 27);
}

#[tokio::test]
async fn test_sync_without_user_token() {
    let (state, client) = common::setup().await;
    let token = admin_token(&state).await;

    let response = client.post_with_auth("/facebook/sync", &token).await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_sync_unknown_page() {
    let (state, client) = common::setup().await;
    let token = admin_token(&state).await;

    client
        .post_with_auth(
            &format!("/facebook/pages/{}/sync", uuid::Uuid::new_v4()),
            &token,
        )
        .await
        .assert_status(StatusCode::NOT_FOUND);
    client
        .get_with_auth(
            &format!("/facebook/pages/{}/messages", uuid::Uuid::new_v4()),
            &token,
        )
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_graph_error_fails_the_sync() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v19.0/me/accounts"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "message": "Invalid OAuth access token.",
                "type": "OAuthException",
                "code": 190,
            },
        })))
        .mount(&server)
        .await;

    let (state, client) = common::setup_with(
        common::TestStateBuilder::new()
            .with_graph_url(server.uri())
            .with_facebook_token("expired"),
    )
    .await;
    let token = admin_token(&state).await;

    let response = client.post_with_auth("/facebook/sync", &token).await;

    response.assert_status(StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_failing_page_is_counted_and_logged() {
    let server = MockServer::start().await;
    let page_fb_id = unique_fb_id();

    Mock::given(method("GET"))
        .and(path("/v19.0/me/accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "id": page_fb_id, "name": "Broken page", "access_token": "page-token" }],
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/v19.0/{page_fb_id}/conversations")))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let (state, client) = common::setup_with(
        common::TestStateBuilder::new()
            .with_graph_url(server.uri())
            .with_facebook_token("user-token"),
    )
    .await;
    let token = admin_token(&state).await;

    let response = client.post_with_auth("/facebook/sync", &token).await;
    response.assert_status(StatusCode::OK);
    let summary: serde_json::Value = response.json();
    assert_eq!(summary["pages"], 1);
    assert_eq!(summary["synced_pages"], 0);
    assert_eq!(summary["failed_pages"], 1);

    let page_id = stored_page_id(&client, &token, &page_fb_id).await;
    let logs: serde_json::Value = client
        .get_with_auth(
            &format!("/facebook/activity-logs?page_id={page_id}"),
            &token,
        )
        .await
        .json();
    assert_eq!(logs["total"], 1);
    assert_eq!(logs["data"][0]["status"], "error");
    assert!(logs["data"][0]["message"].as_str().is_some());
}

#[tokio::test]
async fn test_facebook_routes_need_permissions() {
    let (state, client) = common::setup().await;

    let reader = common::db::create_user_with_permissions(&state.pool, &["facebook.read"])
        .await
        .expect("Failed to create user");
    let token = common::jwt::create_test_token(&reader, &state.jwt_secret);

    client
        .get_with_auth("/facebook/pages", &token)
        .await
        .assert_status(StatusCode::OK);
    client
        .get_with_auth("/facebook/users", &token)
        .await
        .assert_status(StatusCode::OK);
    client
        .post_with_auth("/facebook/sync", &token)
        .await
        .assert_status(StatusCode::FORBIDDEN);
}
