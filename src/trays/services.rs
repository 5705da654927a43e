use super::models::{self as trays, Tray, TrayCreate, TrayDeleted, TrayDetail, TrayUpdate};
use crate::common::errors::{InventoryError, InventoryResult, UniqueRule};
use crate::locations::models::{self as locations, position_identifier};
use crate::locations::services::list_tray_locations;
use crate::{not_found, validation_error};
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};

/// Locations are inserted in batches to stay under the bind-parameter limit of both backends
const LOCATION_INSERT_BATCH: usize = 1000;

pub(crate) async fn find_tray<C: ConnectionTrait>(conn: &C, tray_id: i32) -> InventoryResult<trays::Model> {
    trays::Entity::find_by_id(tray_id)
        .one(conn)
        .await?
        .ok_or_else(|| not_found!("Tray", format!("Tray ID {tray_id} not found")))
}

fn validate_tray_name(name: &str) -> InventoryResult<()> {
    if name.trim().is_empty() {
        return Err(validation_error!("name", "Tray name cannot be empty"));
    }
    Ok(())
}

fn validate_location_count(location_count: i64) -> InventoryResult<i32> {
    match i32::try_from(location_count) {
        Ok(count) if count > 0 => Ok(count),
        _ => Err(validation_error!(
            "location_count",
            "location_count must be a positive integer"
        )),
    }
}

fn duplicate_tray_name(name: &str) -> InventoryError {
    InventoryError::Conflict {
        rule: UniqueRule::TrayName,
        message: format!("Tray with name \"{name}\" already exists"),
    }
}

fn new_location(tray_id: i32, index: i32) -> locations::ActiveModel {
    locations::ActiveModel {
        id: NotSet,
        tray_id: Set(tray_id),
        position_identifier: Set(position_identifier(index)),
        is_enabled: Set(true),
        sample_record_id: Set(None),
    }
}

/// Create a tray and its `Pos1..PosN` locations in one transaction
pub async fn create_tray(db: &DatabaseConnection, data: TrayCreate) -> InventoryResult<Tray> {
    validate_tray_name(&data.name)?;
    let location_count = validate_location_count(data.location_count)?;

    let txn = db.begin().await?;

    if trays::Entity::find()
        .filter(trays::Column::Name.eq(&data.name))
        .one(&txn)
        .await?
        .is_some()
    {
        return Err(duplicate_tray_name(&data.name));
    }

    // A concurrent create with the same name is caught by the unique index here
    let tray = trays::ActiveModel {
        id: NotSet,
        name: Set(data.name),
        location_count: Set(location_count),
    }
    .insert(&txn)
    .await?;

    let positions: Vec<i32> = (1..=location_count).collect();
    for batch in positions.chunks(LOCATION_INSERT_BATCH) {
        locations::Entity::insert_many(batch.iter().map(|&index| new_location(tray.id, index)))
            .exec(&txn)
            .await?;
    }

    txn.commit().await?;

    tracing::info!(
        "Tray '{}' (ID: {}) created with {} locations",
        tray.name,
        tray.id,
        location_count
    );

    Ok(tray.into())
}

pub async fn list_trays(db: &DatabaseConnection) -> InventoryResult<Vec<Tray>> {
    let models = trays::Entity::find()
        .order_by_asc(trays::Column::Id)
        .all(db)
        .await?;

    Ok(models.into_iter().map(Into::into).collect())
}

pub async fn get_tray(db: &DatabaseConnection, tray_id: i32) -> InventoryResult<TrayDetail> {
    let tray = find_tray(db, tray_id).await?;
    let locations = list_tray_locations(db, tray.id).await?;

    Ok(TrayDetail {
        id: tray.id,
        name: tray.name,
        location_count: tray.location_count,
        locations,
    })
}

/// Rename a tray. The location count is immutable.
pub async fn update_tray(
    db: &DatabaseConnection,
    tray_id: i32,
    data: TrayUpdate,
) -> InventoryResult<Tray> {
    if data.name.is_none() && data.location_count.is_none() {
        return Err(validation_error!("body", "No data provided for update"));
    }

    let txn = db.begin().await?;
    let tray = find_tray(&txn, tray_id).await?;

    if let Some(name) = &data.name {
        validate_tray_name(name)?;
        let taken = trays::Entity::find()
            .filter(trays::Column::Id.ne(tray_id))
            .filter(trays::Column::Name.eq(name))
            .one(&txn)
            .await?;
        if taken.is_some() {
            return Err(InventoryError::Conflict {
                rule: UniqueRule::TrayName,
                message: format!("Another tray with name \"{name}\" already exists"),
            });
        }
    }

    if let Some(location_count) = data.location_count {
        if location_count != i64::from(tray.location_count) {
            return Err(validation_error!(
                "location_count",
                "Modifying location_count is not supported; delete and recreate the tray"
            ));
        }
    }

    let Some(name) = data.name else {
        return Ok(tray.into());
    };

    let previous_name = tray.name.clone();
    let mut active: trays::ActiveModel = tray.into();
    active.name = Set(name);
    let updated = active.update(&txn).await?;

    txn.commit().await?;

    tracing::info!(
        "Tray ID {} renamed from '{}' to '{}'",
        updated.id,
        previous_name,
        updated.name
    );

    Ok(updated.into())
}

/// Delete a tray and its locations.
///
/// Samples held by the tray are detached first and their records are kept, so they
/// survive as records linked to no location. Lookups by sample id report them as
/// inconsistent.
pub async fn delete_tray(db: &DatabaseConnection, tray_id: i32) -> InventoryResult<TrayDeleted> {
    let txn = db.begin().await?;
    let tray = find_tray(&txn, tray_id).await?;

    let detached = locations::Entity::update_many()
        .col_expr(
            locations::Column::SampleRecordId,
            Expr::value(Option::<i32>::None),
        )
        .filter(locations::Column::TrayId.eq(tray_id))
        .filter(locations::Column::SampleRecordId.is_not_null())
        .exec(&txn)
        .await?
        .rows_affected;

    locations::Entity::delete_many()
        .filter(locations::Column::TrayId.eq(tray_id))
        .exec(&txn)
        .await?;

    trays::Entity::delete_by_id(tray_id).exec(&txn).await?;

    txn.commit().await?;

    tracing::info!("Tray ID {} ('{}') and its locations deleted", tray.id, tray.name);
    if detached > 0 {
        tracing::warn!(
            "{detached} sample record(s) from tray ID {} are no longer assigned to a location",
            tray.id
        );
    }

    Ok(TrayDeleted {
        id: tray.id,
        name: tray.name,
        detached_sample_count: detached,
    })
}
