use crate::config::Config;
use crate::settings::models::SettingsStore;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Config,
    pub settings: Arc<SettingsStore>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: Config, settings: Arc<SettingsStore>) -> Self {
        Self {
            db,
            config,
            settings,
        }
    }
}
