use crate::locations::models::Location;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "trays")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    /// Fixed at creation
    pub location_count: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "crate::locations::models::Entity")]
    Locations,
}

impl Related<crate::locations::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Locations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// A fixed-capacity container of locations
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Tray {
    pub id: i32,
    pub name: String,
    pub location_count: i32,
}

impl From<Model> for Tray {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            location_count: model.location_count,
        }
    }
}

/// A tray together with its locations in creation order
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone)]
pub struct TrayDetail {
    pub id: i32,
    pub name: String,
    pub location_count: i32,
    pub locations: Vec<Location>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone)]
pub struct TrayCreate {
    pub name: String,
    /// Accepted as a wide integer so that negative or oversized counts are
    /// rejected with a validation error rather than a parse error
    pub location_count: i64,
}

/// Only `name` may change; sending a different `location_count` is rejected
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, Default)]
pub struct TrayUpdate {
    pub name: Option<String>,
    pub location_count: Option<i64>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TrayDeleted {
    pub id: i32,
    pub name: String,
    /// Samples that were in the tray and are now linked to no location
    pub detached_sample_count: u64,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TrayCleared {
    pub tray_id: i32,
    pub cleared_count: u64,
}
