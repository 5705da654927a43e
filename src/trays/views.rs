use super::models::{Tray, TrayCleared, TrayCreate, TrayDeleted, TrayDetail, TrayUpdate};
use super::services;
use crate::common::errors::InventoryError;
use crate::common::state::AppState;
use crate::locations::models::Location;
use crate::locations::services as location_services;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::{Json, http::StatusCode};
use sea_orm::DatabaseConnection;
use utoipa_axum::{router::OpenApiRouter, routes};

pub fn router(state: &AppState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_trays, create_tray))
        .routes(routes!(get_tray, update_tray, delete_tray))
        .routes(routes!(get_tray_locations))
        .routes(routes!(find_empty_location))
        .routes(routes!(clear_all_on_tray))
        .with_state(state.db.clone())
}

#[utoipa::path(
    post,
    path = "/",
    request_body = TrayCreate,
    responses(
        (status = 201, description = "Tray created with all its locations", body = Tray),
        (status = 400, description = "Invalid name or location count"),
        (status = 409, description = "A tray with this name already exists")
    ),
    tag = "trays",
    summary = "Create tray",
    description = "Create a tray and its `Pos1..PosN` locations, all enabled and empty"
)]
pub async fn create_tray(
    State(db): State<DatabaseConnection>,
    payload: Result<Json<TrayCreate>, JsonRejection>,
) -> Result<(StatusCode, Json<Tray>), InventoryError> {
    let Json(data) = payload?;
    let tray = services::create_tray(&db, data).await?;
    Ok((StatusCode::CREATED, Json(tray)))
}

#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "All trays by id", body = Vec<Tray>)),
    tag = "trays",
    summary = "List trays"
)]
pub async fn list_trays(
    State(db): State<DatabaseConnection>,
) -> Result<Json<Vec<Tray>>, InventoryError> {
    Ok(Json(services::list_trays(&db).await?))
}

#[utoipa::path(
    get,
    path = "/{tray_id}",
    params(("tray_id" = i32, Path, description = "Tray ID")),
    responses(
        (status = 200, description = "Tray with its locations", body = TrayDetail),
        (status = 404, description = "Tray not found")
    ),
    tag = "trays",
    summary = "Get tray"
)]
pub async fn get_tray(
    State(db): State<DatabaseConnection>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<TrayDetail>, InventoryError> {
    let Path(tray_id) = path?;
    Ok(Json(services::get_tray(&db, tray_id).await?))
}

#[utoipa::path(
    put,
    path = "/{tray_id}",
    params(("tray_id" = i32, Path, description = "Tray ID")),
    request_body = TrayUpdate,
    responses(
        (status = 200, description = "Tray renamed", body = Tray),
        (status = 400, description = "Empty body, blank name or changed location count"),
        (status = 404, description = "Tray not found"),
        (status = 409, description = "Another tray already has this name")
    ),
    tag = "trays",
    summary = "Rename tray",
    description = "Only the name can change; `location_count` is accepted when it matches the current value"
)]
pub async fn update_tray(
    State(db): State<DatabaseConnection>,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<TrayUpdate>, JsonRejection>,
) -> Result<Json<Tray>, InventoryError> {
    let Path(tray_id) = path?;
    let Json(data) = payload?;
    Ok(Json(services::update_tray(&db, tray_id, data).await?))
}

#[utoipa::path(
    delete,
    path = "/{tray_id}",
    params(("tray_id" = i32, Path, description = "Tray ID")),
    responses(
        (status = 200, description = "Tray and its locations deleted", body = TrayDeleted),
        (status = 404, description = "Tray not found")
    ),
    tag = "trays",
    summary = "Delete tray",
    description = "Samples still on the tray keep their records but lose their location"
)]
pub async fn delete_tray(
    State(db): State<DatabaseConnection>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<TrayDeleted>, InventoryError> {
    let Path(tray_id) = path?;
    Ok(Json(services::delete_tray(&db, tray_id).await?))
}

#[utoipa::path(
    get,
    path = "/{tray_id}/locations",
    params(("tray_id" = i32, Path, description = "Tray ID")),
    responses(
        (status = 200, description = "Locations of the tray by id", body = Vec<Location>),
        (status = 404, description = "Tray not found")
    ),
    tag = "trays",
    summary = "List tray locations"
)]
pub async fn get_tray_locations(
    State(db): State<DatabaseConnection>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<Vec<Location>>, InventoryError> {
    let Path(tray_id) = path?;
    Ok(Json(location_services::get_tray_locations(&db, tray_id).await?))
}

#[utoipa::path(
    get,
    path = "/{tray_id}/empty_location",
    params(("tray_id" = i32, Path, description = "Tray ID")),
    responses(
        (status = 200, description = "Lowest-id enabled and empty location", body = Location),
        (status = 404, description = "Tray not found or no empty and enabled location")
    ),
    tag = "trays",
    summary = "Find empty location"
)]
pub async fn find_empty_location(
    State(db): State<DatabaseConnection>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<Location>, InventoryError> {
    let Path(tray_id) = path?;
    Ok(Json(location_services::find_empty_location(&db, tray_id).await?))
}

#[utoipa::path(
    post,
    path = "/{tray_id}/clear_all",
    params(("tray_id" = i32, Path, description = "Tray ID")),
    responses(
        (status = 200, description = "Every sample on the tray removed", body = TrayCleared),
        (status = 404, description = "Tray not found")
    ),
    tag = "trays",
    summary = "Clear all locations on tray"
)]
pub async fn clear_all_on_tray(
    State(db): State<DatabaseConnection>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<TrayCleared>, InventoryError> {
    let Path(tray_id) = path?;
    Ok(Json(location_services::clear_all_on_tray(&db, tray_id).await?))
}
