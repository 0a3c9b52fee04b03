use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserBalances::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserBalances::UserUid)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(UserBalances::TotalBalanceMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(UserBalances::TotalIncomeMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(UserBalances::TotalExpenseMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(UserBalances::LastTransactionAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(UserBalances::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserBalances::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum UserBalances {
    Table,
    UserUid,
    TotalBalanceMinor,
    TotalIncomeMinor,
    TotalExpenseMinor,
    LastTransactionAt,
    UpdatedAt,
}
