use crate::common::test_helpers::send;
use crate::config::test_helpers::setup_test_app;
use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_get_default_settings() {
    let app = setup_test_app().await;

    let (status, body) = send(&app, "GET", "/api/settings", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"HTTP_PORT": 5000, "AUTO_START_HTTP": true}));
}

#[tokio::test]
async fn test_update_settings() {
    let app = setup_test_app().await;

    let (status, body) = send(
        &app,
        "PUT",
        "/api/settings",
        Some(json!({"HTTP_PORT": 8080})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "Failed to update settings: {body}");
    assert_eq!(body["updated_settings"]["HTTP_PORT"], 8080);
    assert_eq!(body["updated_settings"]["AUTO_START_HTTP"], true);
    assert!(body["message"].as_str().unwrap().contains("Restart"));

    let (status, body) = send(
        &app,
        "PUT",
        "/api/settings",
        Some(json!({"AUTO_START_HTTP": false})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updated_settings"]["HTTP_PORT"], 8080);

    let (_, body) = send(&app, "GET", "/api/settings", None).await;
    assert_eq!(body, json!({"HTTP_PORT": 8080, "AUTO_START_HTTP": false}));
}

#[tokio::test]
async fn test_invalid_settings_are_rejected() {
    let app = setup_test_app().await;

    for payload in [
        json!({"HTTP_PORT": 80}),
        json!({"HTTP_PORT": 65536}),
        json!({"AUTO_START_HTTP": "true"}),
        json!({"UNKNOWN": 1}),
    ] {
        let (status, body) = send(&app, "PUT", "/api/settings", Some(payload.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{payload} should be rejected");
        assert_eq!(body["error"]["type"], "ValidationError");
    }

    let (_, body) = send(&app, "GET", "/api/settings", None).await;
    assert_eq!(body["HTTP_PORT"], 5000);
}
