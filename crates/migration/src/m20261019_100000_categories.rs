use chrono::Utc;
use sea_orm::ConnectionTrait;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Default categories: `(name, kind, icon)`.
const DEFAULT_CATEGORIES: &[(&str, &str, &str)] = &[
    ("Salary", "income", "💼"),
    ("Freelance", "income", "💻"),
    ("Gifts", "income", "🎁"),
    ("Investments", "income", "📈"),
    ("Food", "expense", "🍔"),
    ("Transport", "expense", "🚌"),
    ("Housing", "expense", "🏠"),
    ("Utilities", "expense", "💡"),
    ("Health", "expense", "💊"),
    ("Entertainment", "expense", "🎬"),
    ("Shopping", "expense", "🛍️"),
    ("Other", "expense", "📦"),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categories::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Categories::Name).string().not_null())
                    .col(ColumnDef::new(Categories::Kind).string().not_null())
                    .col(
                        ColumnDef::new(Categories::Icon)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Categories::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-categories-kind-name-unique")
                    .table(Categories::Table)
                    .col(Categories::Kind)
                    .col(Categories::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        seed_categories(manager).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await
    }
}

async fn seed_categories(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    let db = manager.get_connection();
    let backend = db.get_database_backend();

    let now = Utc::now();

    let mut stmt = Query::insert();
    stmt.into_table(Categories::Table)
        .columns([
            Categories::Name,
            Categories::Kind,
            Categories::Icon,
            Categories::CreatedAt,
        ])
        .on_conflict(
            OnConflict::columns([Categories::Kind, Categories::Name])
                .do_nothing()
                .to_owned(),
        );
    for (name, kind, icon) in DEFAULT_CATEGORIES {
        stmt.values_panic([(*name).into(), (*kind).into(), (*icon).into(), now.into()]);
    }

    db.execute(backend.build(&stmt)).await?;
    Ok(())
}

/// Learn more at https://docs.rs/sea-query#iden
#[derive(Iden)]
pub enum Categories {
    Table,
    Id,
    Name,
    Kind,
    Icon,
    CreatedAt,
}
