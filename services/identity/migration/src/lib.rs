use sea_orm_migration::prelude::*;

mod m20261001_000001_create_members;
mod m20261001_000002_create_invite_codes;
mod m20261001_000003_add_invite_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_create_members::Migration),
            Box::new(m20261001_000002_create_invite_codes::Migration),
            Box::new(m20261001_000003_add_invite_indexes::Migration),
        ]
    }
}
