use std::sync::Arc;

use axum::http::StatusCode;
use domains::{ActionKind, DomainError, MockActionLog};
use integration_tests::{call, TestBoard};
use mockall::predicate::{always, eq};
use serde_json::json;
use services::RateLimitPolicy;

const ALICE: (&str, &str) = ("x-client-id", "alice");

#[tokio::test]
async fn create_list_like_and_delete_round_trip() {
    let app = TestBoard::new().router();

    let (status, created) = call(
        &app,
        "POST",
        "/api/wishes",
        &[ALICE],
        Some(json!({ "content": "  may the harvest be kind ", "name": "Ana", "tag": "aspiration" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["content"], "may the harvest be kind");
    assert_eq!(created["name"], "Ana");
    assert_eq!(created["tag"], "aspiration");
    assert_eq!(created["likes"], 0);
    assert_eq!(created["is_owner"], true);
    assert!(created.get("client_id").is_none());
    let id = created["id"].as_i64().unwrap();

    let (status, page) = call(&app, "GET", "/api/wishes", &[("x-client-id", "bob")], None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 1);
    assert_eq!(page["wishes"][0]["is_owner"], false);

    let (status, liked) = call(&app, "POST", &format!("/api/wishes/{id}/like"), &[], None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(liked["success"], true);
    assert_eq!(liked["likes"], 1);

    let (status, _) = call(
        &app,
        "DELETE",
        &format!("/api/wishes/{id}"),
        &[("x-client-id", "bob")],
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = call(&app, "DELETE", &format!("/api/wishes/{id}"), &[ALICE], None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (_, page) = call(&app, "GET", "/api/wishes", &[], None).await;
    assert_eq!(page["total"], 0);
}

#[tokio::test]
async fn payload_client_id_takes_precedence_over_the_header() {
    let app = TestBoard::new().router();

    let (_, created) = call(
        &app,
        "POST",
        "/api/wishes",
        &[("x-client-id", "header-id")],
        Some(json!({ "content": "hi", "client_id": "payload-id" })),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let (status, _) = call(
        &app,
        "DELETE",
        &format!("/api/wishes/{id}"),
        &[("x-client-id", "header-id")],
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(
        &app,
        "DELETE",
        &format!("/api/wishes/{id}"),
        &[("x-client-id", "payload-id")],
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn ownership_compares_client_ids_exactly() {
    let app = TestBoard::new().router();

    let (_, created) = call(
        &app,
        "POST",
        "/api/wishes",
        &[],
        Some(json!({ "content": "hi", "client_id": " alice " })),
    )
    .await;
    let uri = format!("/api/wishes/{}", created["id"]);

    let (status, _) = call(&app, "DELETE", &uri, &[ALICE], None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(&app, "DELETE", &uri, &[("x-client-id", " alice ")], None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn invalid_input_is_unprocessable() {
    let app = TestBoard::new().router();

    let (status, body) = call(&app, "POST", "/api/wishes", &[], Some(json!({ "content": "   " }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].as_str().unwrap().contains("content"));

    let too_long = "x".repeat(501);
    let (status, _) = call(&app, "POST", "/api/wishes", &[], Some(json!({ "content": too_long }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = call(&app, "GET", "/api/wishes?limit=0", &[], None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let long_client = "c".repeat(65);
    let (status, _) = call(&app, "GET", "/api/wishes", &[("x-client-id", long_client.as_str())], None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn malformed_requests_get_json_details() {
    let app = TestBoard::new().router();

    let (status, body) = call(&app, "POST", "/api/wishes", &[], Some(json!({}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].as_str().unwrap().contains("content"));

    let (status, body) = call(&app, "POST", "/api/wishes/abc/like", &[], None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].is_string());

    let (status, body) = call(&app, "DELETE", "/api/wishes/abc", &[ALICE], None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].is_string());

    let (status, body) = call(&app, "GET", "/api/wishes?skip=-1", &[], None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn throttled_create_is_429_and_counted() {
    let app = TestBoard::builder()
        .policy(RateLimitPolicy {
            create_limit: 1,
            ..RateLimitPolicy::default()
        })
        .build()
        .router();

    let body = json!({ "content": "again" });
    let (status, _) = call(&app, "POST", "/api/wishes", &[ALICE], Some(body.clone())).await;
    assert_eq!(status, StatusCode::OK);

    let (status, error) = call(&app, "POST", "/api/wishes", &[ALICE], Some(body)).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert!(error["detail"].is_string());

    let (status, exposition) = call(&app, "GET", "/metrics", &[], None).await;
    assert_eq!(status, StatusCode::OK);
    let text = exposition.as_str().unwrap();
    assert!(text.contains("wishboard_wishes_created_total 1"));
    assert!(text.contains(r#"wishboard_rate_limited_total{action="create"} 1"#));
}

#[tokio::test]
async fn throttled_like_is_reported_in_the_body() {
    let app = TestBoard::builder()
        .policy(RateLimitPolicy {
            like_limit: 1,
            ..RateLimitPolicy::default()
        })
        .build()
        .router();

    let (_, created) = call(&app, "POST", "/api/wishes", &[], Some(json!({ "content": "hi" }))).await;
    let uri = format!("/api/wishes/{}/like", created["id"]);

    let (_, first) = call(&app, "POST", &uri, &[ALICE], None).await;
    assert_eq!(first["success"], true);

    let (status, second) = call(&app, "POST", &uri, &[ALICE], None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["success"], false);
    assert_eq!(second["likes"], 1);
}

#[tokio::test]
async fn unknown_wishes_are_404() {
    let app = TestBoard::new().router();

    let (status, body) = call(&app, "POST", "/api/wishes/999/like", &[ALICE], None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["detail"].is_string());

    let (status, _) = call(&app, "DELETE", "/api/wishes/999", &[ALICE], None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn storage_failures_are_500_without_details() {
    let mut log = MockActionLog::new();
    log.expect_count_since()
        .with(always(), eq(ActionKind::Create), always())
        .returning(|_, _, _| Err(DomainError::Storage("disk on fire".into())));

    let app = TestBoard::builder().action_log(Arc::new(log)).build().router();

    let (status, body) = call(&app, "POST", "/api/wishes", &[ALICE], Some(json!({ "content": "hi" }))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["detail"], "internal server error");
}

#[tokio::test]
async fn health_reports_healthy() {
    let app = TestBoard::new().router();
    let (status, body) = call(&app, "GET", "/health", &[], None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "healthy" }));
}
