use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use serde_json::json;
use utoipa::ToSchema;

/// Which storage-level uniqueness rule a write collided with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UniqueRule {
    /// Two trays share a name
    TrayName,
    /// Two locations of one tray share a position identifier
    TrayPosition,
    /// A sample id already has a live record
    SampleId,
    /// A sample record is already linked to another location
    LocationOccupant,
}

impl UniqueRule {
    /// Classify a unique-violation message from Postgres or SQLite.
    ///
    /// Postgres names the index (`idx_sample_records_sample_id_str_unique`), SQLite
    /// names the columns (`sample_records.sample_id_str`). Both carry the column name.
    fn from_violation_message(msg: &str) -> Option<Self> {
        if msg.contains("sample_id_str") {
            Some(Self::SampleId)
        } else if msg.contains("sample_record") {
            Some(Self::LocationOccupant)
        } else if msg.contains("position") {
            Some(Self::TrayPosition)
        } else if msg.contains("trays") || msg.contains("name") {
            Some(Self::TrayName)
        } else {
            None
        }
    }

    fn default_message(self) -> &'static str {
        match self {
            Self::TrayName => "A tray with this name already exists",
            Self::TrayPosition => "This position already exists on the tray",
            Self::SampleId => "This sample id was created by another request",
            Self::LocationOccupant => "This sample is already linked to a location",
        }
    }
}

/// Failures of inventory operations, mapped one-to-one onto response codes
#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    /// Malformed or out-of-range input (400 Bad Request)
    #[error("Validation failed for field '{field}': {message}")]
    Validation { field: String, message: String },
    /// Referenced tray, location or sample is absent (404 Not Found)
    #[error("{message}")]
    NotFound {
        resource: &'static str,
        message: String,
    },
    /// A uniqueness rule was violated (409 Conflict)
    #[error("{message}")]
    Conflict { rule: UniqueRule, message: String },
    /// Operation not permitted in the location's current state (400 Bad Request)
    #[error("{message}")]
    InvalidState { message: String },
    /// Stored data breaks an occupancy invariant (500 Internal Server Error)
    #[error("Data inconsistency: {message}")]
    Inconsistency { message: String },
    /// Anything else the database reported (500 Internal Server Error)
    #[error("Database error: {0}")]
    Database(DbErr),
    /// Reading or writing the settings file failed (500 Internal Server Error)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<DbErr> for InventoryError {
    fn from(err: DbErr) -> Self {
        if let Some(SqlErr::UniqueConstraintViolation(msg)) = err.sql_err() {
            if let Some(rule) = UniqueRule::from_violation_message(&msg) {
                return Self::Conflict {
                    rule,
                    message: rule.default_message().to_string(),
                };
            }
        }
        Self::Database(err)
    }
}

/// Unreadable or mistyped request bodies are reported as validation failures
impl From<JsonRejection> for InventoryError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation {
            field: "body".to_string(),
            message: rejection.body_text(),
        }
    }
}

/// Ids that do not parse as integers are reported as validation failures
impl From<PathRejection> for InventoryError {
    fn from(rejection: PathRejection) -> Self {
        Self::Validation {
            field: "path".to_string(),
            message: rejection.body_text(),
        }
    }
}

impl InventoryError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Validation { .. } => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            Self::NotFound { .. } => (StatusCode::NOT_FOUND, "RESOURCE_NOT_FOUND"),
            Self::Conflict { .. } => (StatusCode::CONFLICT, "CONFLICT"),
            Self::InvalidState { .. } => (StatusCode::BAD_REQUEST, "INVALID_STATE"),
            Self::Inconsistency { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "INCONSISTENCY"),
            Self::Database(_) | Self::Io(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "ValidationError",
            Self::NotFound { .. } => "NotFoundError",
            Self::Conflict { .. } => "ConflictError",
            Self::InvalidState { .. } => "InvalidStateError",
            Self::Inconsistency { .. } => "InconsistencyError",
            Self::Database(_) | Self::Io(_) => "InternalError",
        }
    }
}

/// Convert `InventoryError` to HTTP responses
impl IntoResponse for InventoryError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::Database(err) => {
                tracing::error!("Unexpected database error: {err}");
                "An unexpected error occurred".to_string()
            }
            Self::Io(err) => {
                tracing::error!("Unexpected I/O error: {err}");
                "An unexpected error occurred".to_string()
            }
            Self::Inconsistency { message } => {
                tracing::error!("Data inconsistency surfaced to caller: {message}");
                self.to_string()
            }
            _ => self.to_string(),
        };

        let mut error = json!({
            "code": code,
            "message": message,
            "type": self.type_name(),
        });
        if let Self::Conflict { rule, .. } = &self {
            error["rule"] = json!(rule);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

/// Convenience macros for creating inventory errors
#[macro_export]
macro_rules! validation_error {
    ($field:expr, $message:expr) => {
        $crate::common::errors::InventoryError::Validation {
            field: $field.to_string(),
            message: $message.to_string(),
        }
    };
}

#[macro_export]
macro_rules! not_found {
    ($resource:expr, $message:expr) => {
        $crate::common::errors::InventoryError::NotFound {
            resource: $resource,
            message: $message.to_string(),
        }
    };
}

#[macro_export]
macro_rules! invalid_state {
    ($message:expr) => {
        $crate::common::errors::InventoryError::InvalidState {
            message: $message.to_string(),
        }
    };
}

/// Result type alias for inventory operations
pub type InventoryResult<T> = Result<T, InventoryError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_of(err: InventoryError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_rule_from_sqlite_messages() {
        assert_eq!(
            UniqueRule::from_violation_message("UNIQUE constraint failed: trays.name"),
            Some(UniqueRule::TrayName)
        );
        assert_eq!(
            UniqueRule::from_violation_message(
                "UNIQUE constraint failed: sample_records.sample_id_str"
            ),
            Some(UniqueRule::SampleId)
        );
        assert_eq!(
            UniqueRule::from_violation_message(
                "UNIQUE constraint failed: locations.tray_id, locations.position_identifier"
            ),
            Some(UniqueRule::TrayPosition)
        );
        assert_eq!(
            UniqueRule::from_violation_message("UNIQUE constraint failed: locations.sample_record_id"),
            Some(UniqueRule::LocationOccupant)
        );
    }

    #[test]
    fn test_rule_from_postgres_messages() {
        assert_eq!(
            UniqueRule::from_violation_message(
                "duplicate key value violates unique constraint \"idx_trays_name_unique\""
            ),
            Some(UniqueRule::TrayName)
        );
        assert_eq!(
            UniqueRule::from_violation_message(
                "duplicate key value violates unique constraint \"idx_sample_records_sample_id_str_unique\""
            ),
            Some(UniqueRule::SampleId)
        );
    }

    #[test]
    fn test_non_unique_db_error_is_internal() {
        let err: InventoryError = DbErr::Custom("connection reset".to_string()).into();
        assert!(matches!(err, InventoryError::Database(_)));
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let (status, body) = body_of(crate::validation_error!("location_count", "must be positive")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["type"], "ValidationError");

        let (status, _) = body_of(crate::not_found!("Tray", "Tray ID 9 not found")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = body_of(InventoryError::Conflict {
            rule: UniqueRule::SampleId,
            message: "dup".to_string(),
        })
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["rule"], "sample_id");

        let (status, _) = body_of(crate::invalid_state!("Location is disabled")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = body_of(InventoryError::Inconsistency {
            message: "orphan".to_string(),
        })
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "INCONSISTENCY");
    }

    #[tokio::test]
    async fn test_database_detail_is_not_leaked() {
        let (status, body) = body_of(InventoryError::Database(DbErr::Custom(
            "secret connection string".to_string(),
        )))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body["error"]["message"].as_str().unwrap().contains("secret"));
    }
}
