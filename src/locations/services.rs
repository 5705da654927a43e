use super::models::{self as locations, Location, LocationCleared};
use crate::common::errors::InventoryResult;
use crate::samples::models as samples;
use crate::trays::models::TrayCleared;
use crate::trays::services::find_tray;
use crate::{invalid_state, not_found};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};

pub(crate) async fn find_location<C: ConnectionTrait>(
    conn: &C,
    location_id: i32,
) -> InventoryResult<locations::Model> {
    locations::Entity::find_by_id(location_id)
        .one(conn)
        .await?
        .ok_or_else(|| not_found!("Location", format!("Location ID {location_id} not found")))
}

/// A location together with the id string of the sample it holds
async fn load_location<C: ConnectionTrait>(conn: &C, location_id: i32) -> InventoryResult<Location> {
    let (location, sample) = locations::Entity::find_by_id(location_id)
        .find_also_related(samples::Entity)
        .one(conn)
        .await?
        .ok_or_else(|| not_found!("Location", format!("Location ID {location_id} not found")))?;

    Ok(Location::from_parts(location, sample))
}

/// Locations of a tray in creation order, without checking that the tray exists
pub(crate) async fn list_tray_locations<C: ConnectionTrait>(
    conn: &C,
    tray_id: i32,
) -> InventoryResult<Vec<Location>> {
    let rows = locations::Entity::find()
        .filter(locations::Column::TrayId.eq(tray_id))
        .find_also_related(samples::Entity)
        .order_by_asc(locations::Column::Id)
        .all(conn)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(location, sample)| Location::from_parts(location, sample))
        .collect())
}

pub async fn get_tray_locations(
    db: &DatabaseConnection,
    tray_id: i32,
) -> InventoryResult<Vec<Location>> {
    find_tray(db, tray_id).await?;
    list_tray_locations(db, tray_id).await
}

/// The lowest-id location on the tray that is enabled and empty
pub(crate) async fn next_empty_location<C: ConnectionTrait>(
    conn: &C,
    tray_id: i32,
) -> InventoryResult<locations::Model> {
    locations::Entity::find()
        .filter(locations::Column::TrayId.eq(tray_id))
        .filter(locations::Column::IsEnabled.eq(true))
        .filter(locations::Column::SampleRecordId.is_null())
        .order_by_asc(locations::Column::Id)
        .one(conn)
        .await?
        .ok_or_else(|| {
            not_found!(
                "Location",
                format!("No empty and enabled location found on Tray ID {tray_id}")
            )
        })
}

pub async fn find_empty_location(
    db: &DatabaseConnection,
    tray_id: i32,
) -> InventoryResult<Location> {
    find_tray(db, tray_id).await?;
    let location = next_empty_location(db, tray_id).await?;
    Ok(Location::from_parts(location, None))
}

/// `Disabled+* -> Enabled+*`; already enabled is a no-op
pub async fn enable_location(db: &DatabaseConnection, location_id: i32) -> InventoryResult<Location> {
    let txn = db.begin().await?;
    let location = find_location(&txn, location_id).await?;

    if location.is_enabled {
        tracing::debug!("Location ID {location_id} is already enabled");
    } else {
        locations::Entity::update_many()
            .col_expr(locations::Column::IsEnabled, Expr::value(true))
            .filter(locations::Column::Id.eq(location_id))
            .exec(&txn)
            .await?;
        tracing::info!("Location ID {location_id} enabled");
    }

    let updated = load_location(&txn, location_id).await?;
    txn.commit().await?;
    Ok(updated)
}

/// `Enabled+Empty -> Disabled+Empty`; already disabled is a no-op, occupied is refused
pub async fn disable_location(
    db: &DatabaseConnection,
    location_id: i32,
) -> InventoryResult<Location> {
    let txn = db.begin().await?;
    let location = find_location(&txn, location_id).await?;

    if !location.is_enabled {
        tracing::debug!("Location ID {location_id} is already disabled");
        let current = load_location(&txn, location_id).await?;
        txn.commit().await?;
        return Ok(current);
    }

    if location.is_occupied() {
        tracing::warn!("Attempt to disable occupied Location ID {location_id} denied");
        return Err(invalid_state!(
            "Cannot disable occupied location. Clear sample first."
        ));
    }

    // Guarded so a placement committed since the read above wins
    let disabled = locations::Entity::update_many()
        .col_expr(locations::Column::IsEnabled, Expr::value(false))
        .filter(locations::Column::Id.eq(location_id))
        .filter(locations::Column::SampleRecordId.is_null())
        .exec(&txn)
        .await?;
    if disabled.rows_affected == 0 {
        tracing::warn!("Location ID {location_id} was occupied concurrently; disable denied");
        return Err(invalid_state!(
            "Cannot disable occupied location. Clear sample first."
        ));
    }

    let updated = load_location(&txn, location_id).await?;
    txn.commit().await?;

    tracing::info!("Location ID {location_id} disabled");
    Ok(updated)
}

/// Unlink the sample from the location and delete its record
pub async fn clear_location(
    db: &DatabaseConnection,
    location_id: i32,
) -> InventoryResult<LocationCleared> {
    let txn = db.begin().await?;
    let location = find_location(&txn, location_id).await?;

    let Some(sample_record_id) = location.sample_record_id else {
        return Ok(LocationCleared {
            location_id,
            position_identifier: location.position_identifier,
            cleared_sample_id_str: None,
        });
    };

    let sample = samples::Entity::find_by_id(sample_record_id).one(&txn).await?;

    let unlinked = locations::Entity::update_many()
        .col_expr(
            locations::Column::SampleRecordId,
            Expr::value(Option::<i32>::None),
        )
        .filter(locations::Column::Id.eq(location_id))
        .filter(locations::Column::SampleRecordId.eq(sample_record_id))
        .exec(&txn)
        .await?;
    if unlinked.rows_affected == 0 {
        // Cleared by someone else in the meantime
        return Ok(LocationCleared {
            location_id,
            position_identifier: location.position_identifier,
            cleared_sample_id_str: None,
        });
    }

    samples::Entity::delete_by_id(sample_record_id)
        .exec(&txn)
        .await?;

    txn.commit().await?;

    tracing::info!(
        "Sample cleared from Location ID {location_id}. SampleRecord ID {sample_record_id} deleted"
    );

    Ok(LocationCleared {
        location_id,
        position_identifier: location.position_identifier,
        cleared_sample_id_str: sample.map(|s| s.sample_id_str),
    })
}

/// Clear every occupied location of a tray in one transaction
pub async fn clear_all_on_tray(db: &DatabaseConnection, tray_id: i32) -> InventoryResult<TrayCleared> {
    let txn = db.begin().await?;
    find_tray(&txn, tray_id).await?;

    let occupied = locations::Entity::find()
        .filter(locations::Column::TrayId.eq(tray_id))
        .filter(locations::Column::SampleRecordId.is_not_null())
        .all(&txn)
        .await?;

    if occupied.is_empty() {
        tracing::info!("All locations on Tray ID {tray_id} are already empty");
        return Ok(TrayCleared {
            tray_id,
            cleared_count: 0,
        });
    }

    let sample_record_ids: Vec<i32> = occupied
        .iter()
        .filter_map(|location| location.sample_record_id)
        .collect();

    let unlinked = locations::Entity::update_many()
        .col_expr(
            locations::Column::SampleRecordId,
            Expr::value(Option::<i32>::None),
        )
        .filter(locations::Column::TrayId.eq(tray_id))
        .filter(locations::Column::SampleRecordId.is_in(sample_record_ids.clone()))
        .exec(&txn)
        .await?;

    samples::Entity::delete_many()
        .filter(samples::Column::Id.is_in(sample_record_ids))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    tracing::info!(
        "Cleared {} sample(s) from Tray ID {tray_id}",
        unlinked.rows_affected
    );

    Ok(TrayCleared {
        tray_id,
        cleared_count: unlinked.rows_affected,
    })
}
