use crate::common::errors::InventoryResult;
use crate::validation_error;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use tokio::sync::RwLock;
use utoipa::ToSchema;

pub const DEFAULT_HTTP_PORT: u16 = 5000;
const ALLOWED_HTTP_PORTS: RangeInclusive<i64> = 1024..=65535;

/// Runtime settings persisted next to the database
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct Settings {
    /// Port the HTTP listener binds on the next start
    pub http_port: u16,
    /// Read by deployment scripts deciding whether to launch the server
    pub auto_start_http: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            http_port: DEFAULT_HTTP_PORT,
            auto_start_http: true,
        }
    }
}

/// Partial update; every key is optional but at least one must be present
#[derive(ToSchema, Deserialize, Debug, Clone, Default)]
pub struct SettingsUpdate {
    #[serde(rename = "HTTP_PORT")]
    #[schema(value_type = Option<i64>)]
    pub http_port: Option<Value>,
    #[serde(rename = "AUTO_START_HTTP")]
    #[schema(value_type = Option<bool>)]
    pub auto_start_http: Option<Value>,
}

impl SettingsUpdate {
    /// Validate every provided field and merge it over `current`
    pub fn apply_to(&self, current: Settings) -> InventoryResult<Settings> {
        if self.http_port.is_none() && self.auto_start_http.is_none() {
            return Err(validation_error!("body", "No recognised settings provided"));
        }

        let mut merged = current;
        if let Some(port) = &self.http_port {
            merged.http_port = parse_port(port)?;
        }
        if let Some(auto_start) = &self.auto_start_http {
            merged.auto_start_http = auto_start.as_bool().ok_or_else(|| {
                validation_error!("AUTO_START_HTTP", "AUTO_START_HTTP must be a boolean")
            })?;
        }
        Ok(merged)
    }
}

/// Integers and integer strings are accepted
fn parse_port(value: &Value) -> InventoryResult<u16> {
    let port = match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    }
    .ok_or_else(|| validation_error!("HTTP_PORT", "HTTP_PORT must be an integer"))?;

    if !ALLOWED_HTTP_PORTS.contains(&port) {
        return Err(validation_error!(
            "HTTP_PORT",
            "Port must be between 1024 and 65535"
        ));
    }
    u16::try_from(port)
        .map_err(|_| validation_error!("HTTP_PORT", "Port must be between 1024 and 65535"))
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone)]
pub struct SettingsUpdated {
    pub message: String,
    pub updated_settings: Settings,
}

/// The settings file and its in-memory copy
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    current: RwLock<Settings>,
}

impl SettingsStore {
    /// Read the settings file once; a missing or unreadable file yields defaults
    pub fn load(path: PathBuf) -> Self {
        let mut settings: Settings = match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
                tracing::warn!(
                    "Settings file {} is not valid JSON ({err}); using defaults",
                    path.display()
                );
                Settings::default()
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(
                    "No settings file at {}; using defaults",
                    path.display()
                );
                Settings::default()
            }
            Err(err) => {
                tracing::warn!(
                    "Could not read settings file {} ({err}); using defaults",
                    path.display()
                );
                Settings::default()
            }
        };

        if !ALLOWED_HTTP_PORTS.contains(&i64::from(settings.http_port)) {
            tracing::warn!(
                "Settings file {} has HTTP_PORT {} outside {}..={}; using {DEFAULT_HTTP_PORT}",
                path.display(),
                settings.http_port,
                ALLOWED_HTTP_PORTS.start(),
                ALLOWED_HTTP_PORTS.end()
            );
            settings.http_port = DEFAULT_HTTP_PORT;
        }

        Self {
            path,
            current: RwLock::new(settings),
        }
    }

    pub async fn current(&self) -> Settings {
        *self.current.read().await
    }

    /// Validate, persist, then publish the merged settings
    pub async fn update(&self, update: &SettingsUpdate) -> InventoryResult<Settings> {
        let mut current = self.current.write().await;
        let merged = update.apply_to(*current)?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let contents = serde_json::to_vec_pretty(&merged).map_err(std::io::Error::from)?;
        let staging = self.path.with_extension("json.tmp");
        tokio::fs::write(&staging, contents).await?;
        tokio::fs::rename(&staging, &self.path).await?;

        *current = merged;
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::errors::InventoryError;
    use serde_json::json;
    use tempfile::tempdir;

    fn update(body: Value) -> SettingsUpdate {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let store = SettingsStore::load(dir.path().join("settings.json"));
        assert_eq!(*store.current.blocking_read(), Settings::default());
    }

    #[test]
    fn test_corrupt_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = SettingsStore::load(path);
        assert_eq!(*store.current.blocking_read(), Settings::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"HTTP_PORT": 8080}"#).unwrap();
        let store = SettingsStore::load(path);
        let settings = *store.current.blocking_read();
        assert_eq!(settings.http_port, 8080);
        assert!(settings.auto_start_http);
    }

    #[test]
    fn test_out_of_range_port_in_file_falls_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"HTTP_PORT": 80, "AUTO_START_HTTP": false}"#).unwrap();
        let store = SettingsStore::load(path);
        let settings = *store.current.blocking_read();
        assert_eq!(settings.http_port, DEFAULT_HTTP_PORT);
        assert!(!settings.auto_start_http);
    }

    #[test]
    fn test_apply_validates_each_field() {
        let current = Settings::default();

        let merged = update(json!({"HTTP_PORT": "8081"})).apply_to(current).unwrap();
        assert_eq!(merged.http_port, 8081);
        assert!(merged.auto_start_http);

        for body in [
            json!({}),
            json!({"HTTP_PORT": 80}),
            json!({"HTTP_PORT": 70000}),
            json!({"HTTP_PORT": "eighty"}),
            json!({"AUTO_START_HTTP": "yes"}),
        ] {
            let err = update(body.clone()).apply_to(current).unwrap_err();
            assert!(
                matches!(err, InventoryError::Validation { .. }),
                "{body} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn test_update_persists_and_reloads() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let store = SettingsStore::load(path.clone());

        let saved = store
            .update(&update(json!({"HTTP_PORT": 6000, "AUTO_START_HTTP": false})))
            .await
            .unwrap();
        assert_eq!(store.current().await, saved);

        let reloaded = SettingsStore::load(path);
        assert_eq!(reloaded.current().await, saved);
    }

    #[tokio::test]
    async fn test_rejected_update_keeps_current() {
        let dir = tempdir().unwrap();
        let store = SettingsStore::load(dir.path().join("settings.json"));

        store
            .update(&update(json!({"HTTP_PORT": 1})))
            .await
            .unwrap_err();
        assert_eq!(store.current().await, Settings::default());
        assert!(!dir.path().join("settings.json").exists());
    }
}
