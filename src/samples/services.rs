use super::models::{self as samples, PlaceSample, Placement, SampleLocation};
use crate::common::errors::{InventoryError, InventoryResult, UniqueRule};
use crate::locations::models as locations;
use crate::locations::services::{find_location, next_empty_location};
use crate::trays::services::find_tray;
use crate::{invalid_state, not_found, validation_error};
use chrono::{SubsecRound, Utc};
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    TransactionTrait,
};

fn duplicate_sample(sample_id_str: &str) -> InventoryError {
    InventoryError::Conflict {
        rule: UniqueRule::SampleId,
        message: format!("Sample ID \"{sample_id_str}\" already exists in the system"),
    }
}

async fn find_sample<C: ConnectionTrait>(
    conn: &C,
    sample_id_str: &str,
) -> InventoryResult<Option<samples::Model>> {
    Ok(samples::Entity::find()
        .filter(samples::Column::SampleIdStr.eq(sample_id_str))
        .one(conn)
        .await?)
}

/// The location a placement should claim, checked against the tray and its state
async fn target_location<C: ConnectionTrait>(
    conn: &C,
    tray_id: i32,
    location_id: Option<i32>,
    sample_id_str: &str,
) -> InventoryResult<locations::Model> {
    let Some(location_id) = location_id else {
        return next_empty_location(conn, tray_id).await.inspect_err(|_| {
            tracing::warn!(
                "No empty location on Tray ID {tray_id} for sample '{sample_id_str}'"
            );
        });
    };

    let location = find_location(conn, location_id).await?;
    if location.tray_id != tray_id {
        return Err(not_found!(
            "Location",
            format!("Location ID {location_id} not found on Tray ID {tray_id}")
        ));
    }
    if !location.accepts_sample() {
        let reason = if location.is_enabled {
            "is already occupied"
        } else {
            "is disabled"
        };
        return Err(invalid_state!(format!(
            "Location {} (ID: {location_id}) {reason}",
            location.position_identifier
        )));
    }

    Ok(location)
}

/// Insert the record for a new placement.
///
/// A record committed for the same id since the duplicate check is caught by the
/// unique index and reported as the same conflict.
async fn insert_record<C: ConnectionTrait>(
    conn: &C,
    sample_id_str: &str,
) -> InventoryResult<samples::Model> {
    samples::ActiveModel {
        id: NotSet,
        sample_id_str: Set(sample_id_str.to_string()),
        timestamp: Set(Utc::now().trunc_subsecs(6)),
    }
    .insert(conn)
    .await
    .map_err(|err| match InventoryError::from(err) {
        InventoryError::Conflict { .. } => {
            tracing::warn!("Sample '{sample_id_str}' was placed concurrently");
            duplicate_sample(sample_id_str)
        }
        other => other,
    })
}

/// Link `record` to `target` only if the location is still enabled and empty
async fn claim_location<C: ConnectionTrait>(
    conn: &C,
    target: &locations::Model,
    record: &samples::Model,
) -> InventoryResult<()> {
    let claimed = locations::Entity::update_many()
        .col_expr(locations::Column::SampleRecordId, Expr::value(record.id))
        .filter(locations::Column::Id.eq(target.id))
        .filter(locations::Column::SampleRecordId.is_null())
        .filter(locations::Column::IsEnabled.eq(true))
        .exec(conn)
        .await?;

    if claimed.rows_affected == 0 {
        tracing::warn!(
            "Location ID {} was claimed concurrently; placement of '{}' rolled back",
            target.id,
            record.sample_id_str
        );
        return Err(invalid_state!(format!(
            "Location {} (ID: {}) is no longer available",
            target.position_identifier, target.id
        )));
    }
    Ok(())
}

/// Create a sample record and link it to an enabled, empty location of the tray
pub async fn place_sample(db: &DatabaseConnection, data: PlaceSample) -> InventoryResult<Placement> {
    let sample_id_str = data.sample_id_str;
    if sample_id_str.trim().is_empty() {
        return Err(validation_error!("sample_id_str", "Sample ID cannot be empty"));
    }

    let txn = db.begin().await?;

    if let Some(existing) = find_sample(&txn, &sample_id_str).await? {
        let linked = locations::Entity::find()
            .filter(locations::Column::SampleRecordId.eq(existing.id))
            .one(&txn)
            .await?;
        if linked.is_none() {
            tracing::warn!(
                "Sample '{sample_id_str}' (SampleRecord ID {}) exists without a location",
                existing.id
            );
        }
        tracing::warn!("Attempt to place duplicate sample '{sample_id_str}'");
        return Err(duplicate_sample(&sample_id_str));
    }

    find_tray(&txn, data.tray_id).await?;
    let target = target_location(&txn, data.tray_id, data.location_id, &sample_id_str).await?;

    let record = insert_record(&txn, &sample_id_str).await?;
    claim_location(&txn, &target, &record).await?;

    txn.commit().await?;

    tracing::info!(
        "Sample '{}' placed in Tray ID {}, Location {} (ID: {})",
        record.sample_id_str,
        target.tray_id,
        target.position_identifier,
        target.id
    );

    Ok(Placement {
        sample_id_str: record.sample_id_str,
        tray_id: target.tray_id,
        location_id: target.id,
        position_identifier: target.position_identifier,
        timestamp: record.timestamp,
    })
}

/// Where a sample currently sits
pub async fn get_sample_location(
    db: &DatabaseConnection,
    sample_id_str: &str,
) -> InventoryResult<SampleLocation> {
    let (sample, location) = samples::Entity::find()
        .filter(samples::Column::SampleIdStr.eq(sample_id_str))
        .find_also_related(locations::Entity)
        .one(db)
        .await?
        .ok_or_else(|| not_found!("Sample", format!("Sample ID '{sample_id_str}' not found")))?;

    let Some(location) = location else {
        tracing::error!(
            "Data inconsistency: SampleRecord ID {} ('{sample_id_str}') is not linked to any location",
            sample.id
        );
        return Err(InventoryError::Inconsistency {
            message: format!("Sample '{sample_id_str}' has a record but no location"),
        });
    };

    let tray = find_tray(db, location.tray_id).await?;

    Ok(SampleLocation {
        sample_id_str: sample.sample_id_str,
        tray_id: tray.id,
        tray_name: tray.name,
        location_id: location.id,
        position_identifier: location.position_identifier,
        timestamp: sample.timestamp,
    })
}
