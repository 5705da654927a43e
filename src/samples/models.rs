use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A sample currently occupying a location. Deleted, not archived, when cleared.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sample_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub sample_id_str: String,
    /// Placement time
    pub timestamp: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "crate::locations::models::Entity")]
    Locations,
}

impl Related<crate::locations::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Locations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone)]
pub struct PlaceSample {
    pub sample_id_str: String,
    pub tray_id: i32,
    /// Explicit target; the lowest-id enabled and empty location is used when absent
    #[serde(default)]
    pub location_id: Option<i32>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub sample_id_str: String,
    pub tray_id: i32,
    pub location_id: i32,
    pub position_identifier: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SampleLocation {
    pub sample_id_str: String,
    pub tray_id: i32,
    pub tray_name: String,
    pub location_id: i32,
    pub position_identifier: String,
    pub timestamp: DateTime<Utc>,
}
