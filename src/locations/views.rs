use super::models::{Location, LocationCleared};
use super::services;
use crate::common::errors::InventoryError;
use crate::common::state::AppState;
use axum::Json;
use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use sea_orm::DatabaseConnection;
use utoipa_axum::{router::OpenApiRouter, routes};

pub fn router(state: &AppState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(enable_location))
        .routes(routes!(disable_location))
        .routes(routes!(clear_location))
        .with_state(state.db.clone())
}

#[utoipa::path(
    put,
    path = "/{location_id}/enable",
    params(("location_id" = i32, Path, description = "Location ID")),
    responses(
        (status = 200, description = "Location enabled; already enabled is a no-op", body = Location),
        (status = 404, description = "Location not found")
    ),
    tag = "locations",
    summary = "Enable location"
)]
pub async fn enable_location(
    State(db): State<DatabaseConnection>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<Location>, InventoryError> {
    let Path(location_id) = path?;
    Ok(Json(services::enable_location(&db, location_id).await?))
}

#[utoipa::path(
    put,
    path = "/{location_id}/disable",
    params(("location_id" = i32, Path, description = "Location ID")),
    responses(
        (status = 200, description = "Location disabled; already disabled is a no-op", body = Location),
        (status = 400, description = "Location holds a sample"),
        (status = 404, description = "Location not found")
    ),
    tag = "locations",
    summary = "Disable location",
    description = "A disabled location is skipped by auto-assignment and refuses explicit placements"
)]
pub async fn disable_location(
    State(db): State<DatabaseConnection>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<Location>, InventoryError> {
    let Path(location_id) = path?;
    Ok(Json(services::disable_location(&db, location_id).await?))
}

#[utoipa::path(
    delete,
    path = "/{location_id}/clear",
    params(("location_id" = i32, Path, description = "Location ID")),
    responses(
        (status = 200, description = "Sample removed and its record deleted", body = LocationCleared),
        (status = 404, description = "Location not found")
    ),
    tag = "locations",
    summary = "Clear location"
)]
pub async fn clear_location(
    State(db): State<DatabaseConnection>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<LocationCleared>, InventoryError> {
    let Path(location_id) = path?;
    Ok(Json(services::clear_location(&db, location_id).await?))
}
