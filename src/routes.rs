use crate::common::state::AppState;
use crate::config::Config;
use crate::settings::models::SettingsStore;
use crate::{locations, samples, settings, trays};
use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable};

pub fn build_router(
    db: &DatabaseConnection,
    config: &Config,
    settings_store: Arc<SettingsStore>,
) -> Router {
    #[derive(OpenApi)]
    #[openapi(info(
        title = "Tray inventory API",
        description = "Tracks which sample occupies which location of which tray"
    ))]
    struct ApiDoc;

    let app_state: AppState = AppState::new(db.clone(), config.clone(), settings_store);

    // Build the router with OpenAPI documentation
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(crate::common::views::router(&app_state)) // Root routes
        .nest("/api/trays", trays::views::router(&app_state))
        .nest("/api/locations", locations::views::router(&app_state))
        .nest("/api/samples", samples::views::router(&app_state))
        .nest("/api/settings", settings::views::router(&app_state))
        .split_for_parts();

    router.merge(Scalar::with_url("/api/docs", api))
}
