use super::models::{PlaceSample, Placement, SampleLocation};
use super::services;
use crate::common::errors::InventoryError;
use crate::common::state::AppState;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, http::StatusCode};
use sea_orm::DatabaseConnection;
use utoipa_axum::{router::OpenApiRouter, routes};

pub fn router(state: &AppState) -> OpenApiRouter {
    // Sample ids may contain `/`, so the lookup captures the rest of the path. The
    // static `/place` route shadows the capture for the id `place` itself.
    OpenApiRouter::new()
        .routes(routes!(place_sample))
        .route("/place", get(get_sample_named_place))
        .route("/{*sample_id_str}", get(get_sample_location))
        .with_state(state.db.clone())
}

#[utoipa::path(
    post,
    path = "/place",
    request_body = PlaceSample,
    responses(
        (status = 201, description = "Sample recorded and linked to a location", body = Placement),
        (status = 400, description = "Blank sample id, or target location disabled or occupied"),
        (status = 404, description = "Tray or location not found, or no empty and enabled location"),
        (status = 409, description = "Sample id already exists")
    ),
    tag = "samples",
    summary = "Place sample",
    description = "Place into `location_id` when given, otherwise into the lowest-id enabled and empty location of the tray"
)]
pub async fn place_sample(
    State(db): State<DatabaseConnection>,
    payload: Result<Json<PlaceSample>, JsonRejection>,
) -> Result<(StatusCode, Json<Placement>), InventoryError> {
    let Json(data) = payload?;
    let placement = services::place_sample(&db, data).await?;
    Ok((StatusCode::CREATED, Json(placement)))
}

/// Look up the tray and location currently holding a sample
pub async fn get_sample_location(
    State(db): State<DatabaseConnection>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<SampleLocation>, InventoryError> {
    let Path(sample_id_str) = path?;
    Ok(Json(
        services::get_sample_location(&db, &sample_id_str).await?,
    ))
}

/// `GET /place` is the lookup of the sample whose id is `place`
pub async fn get_sample_named_place(
    State(db): State<DatabaseConnection>,
) -> Result<Json<SampleLocation>, InventoryError> {
    Ok(Json(services::get_sample_location(&db, "place").await?))
}
