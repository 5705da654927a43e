//! Request helpers shared by the HTTP-level tests
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

/// Extract response body as JSON for testing
pub async fn extract_response_body(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    let body: Value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            json!({"error": String::from_utf8_lossy(&bytes).to_string()})
        })
    };
    (status, body)
}

/// Send a request with an optional JSON body and return status and JSON response
pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    extract_response_body(response).await
}

/// Create a tray over HTTP and return its id with the ids of its locations in order
pub async fn create_test_tray(app: &Router, name: &str, location_count: i64) -> (i64, Vec<i64>) {
    let (status, body) = send(
        app,
        "POST",
        "/api/trays",
        Some(json!({"name": name, "location_count": location_count})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "Failed to create tray: {body}");
    let tray_id = body["id"].as_i64().unwrap();

    let (status, locations) = send(app, "GET", &format!("/api/trays/{tray_id}/locations"), None).await;
    assert_eq!(status, StatusCode::OK);
    let location_ids = locations
        .as_array()
        .unwrap()
        .iter()
        .map(|location| location["id"].as_i64().unwrap())
        .collect();

    (tray_id, location_ids)
}

/// Place a sample over HTTP; `location_id` of `None` auto-assigns
pub async fn place_test_sample(
    app: &Router,
    sample_id_str: &str,
    tray_id: i64,
    location_id: Option<i64>,
) -> (StatusCode, Value) {
    let mut payload = json!({"sample_id_str": sample_id_str, "tray_id": tray_id});
    if let Some(location_id) = location_id {
        payload["location_id"] = json!(location_id);
    }
    send(app, "POST", "/api/samples/place", Some(payload)).await
}
