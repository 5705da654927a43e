use super::models::{Settings, SettingsStore, SettingsUpdate, SettingsUpdated};
use crate::common::errors::InventoryError;
use crate::common::state::AppState;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use std::sync::Arc;
use utoipa_axum::{router::OpenApiRouter, routes};

pub fn router(state: &AppState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(get_settings, update_settings))
        .with_state(state.settings.clone())
}

#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Current runtime settings", body = Settings)),
    tag = "settings",
    summary = "Get settings"
)]
pub async fn get_settings(State(store): State<Arc<SettingsStore>>) -> Json<Settings> {
    Json(store.current().await)
}

#[utoipa::path(
    put,
    path = "/",
    request_body = SettingsUpdate,
    responses(
        (status = 200, description = "Settings saved", body = SettingsUpdated),
        (status = 400, description = "Invalid or missing setting"),
        (status = 500, description = "Settings file could not be written")
    ),
    tag = "settings",
    summary = "Update settings",
    description = "Merge and persist the provided settings. A new port applies after a restart."
)]
pub async fn update_settings(
    State(store): State<Arc<SettingsStore>>,
    payload: Result<Json<SettingsUpdate>, JsonRejection>,
) -> Result<Json<SettingsUpdated>, InventoryError> {
    let Json(update) = payload?;
    let previous = store.current().await;

    let updated = store.update(&update).await.inspect_err(|err| {
        tracing::warn!("Settings update rejected: {err}");
    })?;

    tracing::info!(
        "Settings updated: HTTP_PORT {} -> {}, AUTO_START_HTTP {} -> {}",
        previous.http_port,
        updated.http_port,
        previous.auto_start_http,
        updated.auto_start_http
    );

    let message = if updated.http_port == previous.http_port {
        "Settings updated successfully.".to_string()
    } else {
        format!(
            "Settings updated successfully. Restart the server to listen on port {}.",
            updated.http_port
        )
    };

    Ok(Json(SettingsUpdated {
        message,
        updated_settings: updated,
    }))
}
