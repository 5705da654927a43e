use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    #[allow(clippy::too_many_lines)]
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create trays table
        manager
            .create_table(
                Table::create()
                    .table(Trays::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Trays::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Trays::Name).string().not_null())
                    .col(ColumnDef::new(Trays::LocationCount).integer().not_null())
                    .to_owned(),
            )
            .await?;

        // Create sample_records table
        manager
            .create_table(
                Table::create()
                    .table(SampleRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SampleRecords::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SampleRecords::SampleIdStr).string().not_null())
                    .col(
                        ColumnDef::new(SampleRecords::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Create locations table. A location is the owning side of the sample link.
        manager
            .create_table(
                Table::create()
                    .table(Locations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Locations::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Locations::TrayId).integer().not_null())
                    .col(ColumnDef::new(Locations::PositionIdentifier).string().not_null())
                    .col(
                        ColumnDef::new(Locations::IsEnabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Locations::SampleRecordId).integer().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_locations_tray_id")
                            .from(Locations::Table, Locations::TrayId)
                            .to(Trays::Table, Trays::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_locations_sample_record_id")
                            .from(Locations::Table, Locations::SampleRecordId)
                            .to(SampleRecords::Table, SampleRecords::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        // Uniqueness rules. Conflict classification in the API matches on these names.
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_trays_name_unique")
                    .table(Trays::Table)
                    .col(Trays::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_sample_records_sample_id_str_unique")
                    .table(SampleRecords::Table)
                    .col(SampleRecords::SampleIdStr)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_locations_tray_position_unique")
                    .table(Locations::Table)
                    .col(Locations::TrayId)
                    .col(Locations::PositionIdentifier)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // NULLs never collide, so only occupied locations are constrained
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_locations_sample_record_unique")
                    .table(Locations::Table)
                    .col(Locations::SampleRecordId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Speeds up find-empty-location scans
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_locations_tray_enabled")
                    .table(Locations::Table)
                    .col(Locations::TrayId)
                    .col(Locations::IsEnabled)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Locations::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SampleRecords::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Trays::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Trays {
    Table,
    Id,
    Name,
    LocationCount,
}

#[derive(DeriveIden)]
enum SampleRecords {
    Table,
    Id,
    SampleIdStr,
    Timestamp,
}

#[derive(DeriveIden)]
enum Locations {
    Table,
    Id,
    TrayId,
    PositionIdentifier,
    IsEnabled,
    SampleRecordId,
}
