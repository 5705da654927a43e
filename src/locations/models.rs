use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "locations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub tray_id: i32,
    /// `Pos<N>`, 1-indexed, unique within the tray and never renumbered
    pub position_identifier: String,
    pub is_enabled: bool,
    /// Owning side of the location/sample link
    #[sea_orm(unique)]
    pub sample_record_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::trays::models::Entity",
        from = "Column::TrayId",
        to = "crate::trays::models::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Trays,
    #[sea_orm(
        belongs_to = "crate::samples::models::Entity",
        from = "Column::SampleRecordId",
        to = "crate::samples::models::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    SampleRecords,
}

impl Related<crate::trays::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Trays.def()
    }
}

impl Related<crate::samples::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SampleRecords.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Enable flag crossed with occupancy
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LocationState {
    EnabledEmpty,
    EnabledOccupied,
    DisabledEmpty,
    DisabledOccupied,
}

impl Model {
    pub fn is_occupied(&self) -> bool {
        self.sample_record_id.is_some()
    }

    pub fn state(&self) -> LocationState {
        match (self.is_enabled, self.is_occupied()) {
            (true, false) => LocationState::EnabledEmpty,
            (true, true) => LocationState::EnabledOccupied,
            (false, false) => LocationState::DisabledEmpty,
            (false, true) => LocationState::DisabledOccupied,
        }
    }

    /// Only enabled and empty locations may receive a sample
    pub fn accepts_sample(&self) -> bool {
        self.state() == LocationState::EnabledEmpty
    }
}

pub fn position_identifier(index: i32) -> String {
    format!("Pos{index}")
}

/// One addressable slot within a tray
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub id: i32,
    pub tray_id: i32,
    pub position_identifier: String,
    pub is_enabled: bool,
    pub state: LocationState,
    pub sample_record_id: Option<i32>,
    pub sample_id_str: Option<String>,
}

impl Location {
    pub fn from_parts(model: Model, sample: Option<crate::samples::models::Model>) -> Self {
        Self {
            state: model.state(),
            id: model.id,
            tray_id: model.tray_id,
            position_identifier: model.position_identifier,
            is_enabled: model.is_enabled,
            sample_record_id: model.sample_record_id,
            sample_id_str: sample.map(|s| s.sample_id_str),
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LocationCleared {
    pub location_id: i32,
    pub position_identifier: String,
    /// `None` when the location was already empty
    pub cleared_sample_id_str: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(is_enabled: bool, sample_record_id: Option<i32>) -> Model {
        Model {
            id: 1,
            tray_id: 1,
            position_identifier: position_identifier(1),
            is_enabled,
            sample_record_id,
        }
    }

    #[test]
    fn test_four_states() {
        assert_eq!(location(true, None).state(), LocationState::EnabledEmpty);
        assert_eq!(location(true, Some(3)).state(), LocationState::EnabledOccupied);
        assert_eq!(location(false, None).state(), LocationState::DisabledEmpty);
        assert_eq!(location(false, Some(3)).state(), LocationState::DisabledOccupied);
    }

    #[test]
    fn test_only_enabled_empty_accepts_sample() {
        assert!(location(true, None).accepts_sample());
        assert!(!location(true, Some(3)).accepts_sample());
        assert!(!location(false, None).accepts_sample());
        assert!(!location(false, Some(3)).accepts_sample());
    }

    #[test]
    fn test_position_identifier_is_one_indexed() {
        assert_eq!(position_identifier(1), "Pos1");
        assert_eq!(position_identifier(12), "Pos12");
    }
}
