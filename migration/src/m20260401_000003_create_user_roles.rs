use sea_orm_migration::prelude::*;

/// Every token the store accepts. The admin UI only offers a subset of these
/// for editing; `de` is assigned by the distribution-executive onboarding flow.
const ROLE_TOKENS: [&str; 5] = ["admin", "manager", "tl", "de", "dsr"];

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // No FK to profiles: the role row belongs to the auth identity, and
        // deleting a user removes the role first, then the profile.
        manager
            .create_table(
                Table::create()
                    .table(UserRoles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserRoles::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(UserRoles::UserId)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(UserRoles::Role)
                            .string()
                            .not_null()
                            .default("dsr")
                            .check(Expr::col(UserRoles::Role).is_in(ROLE_TOKENS)),
                    )
                    .col(
                        ColumnDef::new(UserRoles::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserRoles::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum UserRoles {
    Table,
    Id,
    UserId,
    Role,
    CreatedAt,
}
