use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TeamLeaders::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TeamLeaders::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TeamLeaders::UserId).uuid().not_null())
                    .col(ColumnDef::new(TeamLeaders::RegionId).uuid().null())
                    .col(ColumnDef::new(TeamLeaders::MonthlyTarget).double().null())
                    .col(
                        ColumnDef::new(TeamLeaders::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_team_leaders_region")
                            .from(TeamLeaders::Table, TeamLeaders::RegionId)
                            .to(Regions::Table, Regions::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TeamLeaders::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum TeamLeaders {
    Table,
    Id,
    UserId,
    RegionId,
    MonthlyTarget,
    CreatedAt,
}

#[derive(Iden)]
enum Regions {
    Table,
    Id,
}
