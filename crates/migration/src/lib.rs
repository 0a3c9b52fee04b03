pub use sea_orm_migration::prelude::*;

mod m20261019_100000_categories;
mod m20261019_100100_transactions;
mod m20261019_100200_user_balances;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261019_100000_categories::Migration),
            Box::new(m20261019_100100_transactions::Migration),
            Box::new(m20261019_100200_user_balances::Migration),
        ]
    }
}
