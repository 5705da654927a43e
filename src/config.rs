use dotenvy::dotenv;
use sea_orm::ConnectOptions;
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub db_url: String,
    pub app_name: String,
    pub deployment: String,
    pub bind_host: String,
    pub settings_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok(); // Load from .env file if available
        let db_url = env::var("DB_URL").ok().or_else(Self::db_url_from_parts).unwrap_or_else(|| {
            "sqlite://tray_inventory.db?mode=rwc".to_string()
        });

        Config {
            app_name: env::var("APP_NAME").unwrap_or_else(|_| "tray-inventory".to_string()),
            deployment: env::var("DEPLOYMENT").unwrap_or_else(|_| "local".to_string()),
            bind_host: env::var("BIND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            settings_path: env::var("SETTINGS_PATH")
                .map_or_else(|_| PathBuf::from("instance/settings.json"), PathBuf::from),
            db_url,
        }
    }

    pub fn is_sqlite(&self) -> bool {
        self.db_url.starts_with("sqlite:")
    }

    /// Pool options for `db_url`.
    ///
    /// SQLite gets a single pooled connection. Its deferred transactions read before they
    /// write, and a second connection upgrading to a writer fails with `SQLITE_BUSY`
    /// instead of waiting.
    pub fn connect_options(&self) -> ConnectOptions {
        let mut options = ConnectOptions::new(self.db_url.clone());
        if self.is_sqlite() {
            options.max_connections(1).min_connections(1);
        }
        options
    }

    /// Assemble a connection URL from `DB_*` parts, only when a host is configured
    fn db_url_from_parts() -> Option<String> {
        let host = env::var("DB_HOST").ok()?;
        Some(format!(
            "{}://{}:{}@{}:{}/{}",
            env::var("DB_PREFIX").unwrap_or_else(|_| "postgresql".to_string()),
            env::var("DB_USER").unwrap_or_else(|_| "postgres".to_string()),
            env::var("DB_PASSWORD").unwrap_or_default(),
            host,
            env::var("DB_PORT").unwrap_or_else(|_| "5432".to_string()),
            env::var("DB_NAME").unwrap_or_else(|_| "tray_inventory".to_string()),
        ))
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Config {
            db_url: "sqlite::memory:".to_string(),
            app_name: "tray-inventory-test".to_string(),
            deployment: "test".to_string(),
            bind_host: "127.0.0.1".to_string(),
            settings_path: env::temp_dir().join(format!(
                "tray-inventory-settings-{}.json",
                uuid::Uuid::new_v4()
            )),
        }
    }
}
