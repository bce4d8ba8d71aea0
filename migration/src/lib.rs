pub use sea_orm_migration::prelude::*;

mod m20260401_000001_create_regions;
mod m20260401_000002_create_profiles;
mod m20260401_000003_create_user_roles;
mod m20260402_000004_create_team_leaders;
mod m20260402_000005_create_field_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260401_000001_create_regions::Migration),
            Box::new(m20260401_000002_create_profiles::Migration),
            Box::new(m20260401_000003_create_user_roles::Migration),
            Box::new(m20260402_000004_create_team_leaders::Migration),
            Box::new(m20260402_000005_create_field_tables::Migration),
        ]
    }
}
