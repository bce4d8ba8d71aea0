use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ── teams ────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Teams::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Teams::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Teams::TlId).uuid().not_null())
                    .col(ColumnDef::new(Teams::Name).string().not_null())
                    .col(
                        ColumnDef::new(Teams::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_teams_team_leader")
                            .from(Teams::Table, Teams::TlId)
                            .to(TeamLeaders::Table, TeamLeaders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ── dsrs ─────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Dsrs::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Dsrs::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Dsrs::UserId).uuid().null())
                    .col(ColumnDef::new(Dsrs::TlId).uuid().null())
                    .col(
                        ColumnDef::new(Dsrs::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_dsrs_team_leader")
                            .from(Dsrs::Table, Dsrs::TlId)
                            .to(TeamLeaders::Table, TeamLeaders::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // ── sales ────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Sales::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Sales::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Sales::TlId).uuid().null())
                    .col(ColumnDef::new(Sales::RegionId).uuid().null())
                    .col(ColumnDef::new(Sales::SaleType).string().not_null())
                    .col(
                        ColumnDef::new(Sales::PaymentStatus)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Sales::AdminApproved)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Sales::SalePrice).double().null())
                    .col(
                        ColumnDef::new(Sales::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // ── stock ────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Stock::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Stock::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Stock::StockType).string().not_null())
                    .col(
                        ColumnDef::new(Stock::Status)
                            .string()
                            .not_null()
                            .default("in_stock"),
                    )
                    .col(
                        ColumnDef::new(Stock::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Grouped per-team-leader counts scan these.
        manager
            .create_index(
                Index::create()
                    .name("idx_teams_tl_id")
                    .table(Teams::Table)
                    .col(Teams::TlId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_dsrs_tl_id")
                    .table(Dsrs::Table)
                    .col(Dsrs::TlId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_sales_tl_id")
                    .table(Sales::Table)
                    .col(Sales::TlId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Stock::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Sales::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Dsrs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Teams::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Teams {
    Table,
    Id,
    TlId,
    Name,
    CreatedAt,
}

#[derive(Iden)]
enum Dsrs {
    Table,
    Id,
    UserId,
    TlId,
    CreatedAt,
}

#[derive(Iden)]
enum Sales {
    Table,
    Id,
    TlId,
    RegionId,
    SaleType,
    PaymentStatus,
    AdminApproved,
    SalePrice,
    CreatedAt,
}

#[derive(Iden)]
enum Stock {
    Table,
    Id,
    StockType,
    Status,
    CreatedAt,
}

#[derive(Iden)]
enum TeamLeaders {
    Table,
    Id,
}
