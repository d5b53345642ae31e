pub use sea_orm_migration::prelude::*;

mod m20260712_000001_members;
mod m20260712_000002_transactions;
mod m20260715_000001_receipts;
mod m20260715_000002_settings;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260712_000001_members::Migration),
            Box::new(m20260712_000002_transactions::Migration),
            Box::new(m20260715_000001_receipts::Migration),
            Box::new(m20260715_000002_settings::Migration),
        ]
    }
}
