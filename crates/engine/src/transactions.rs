//! Transaction primitives.
//!
//! A `Transaction` is one income or expense record owned by a user. Its
//! effect on the owner's [`UserBalance`](crate::UserBalance) is maintained by
//! the store in the same database transaction as the row itself.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{Category, EngineError, MoneyCents, ResultEngine, categories};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(EngineError::InvalidArgument(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub user_uid: String,
    pub category_id: i32,
    /// Stored independently from the category kind; the two may disagree.
    pub kind: TransactionKind,
    pub amount: MoneyCents,
    pub title: String,
    pub description: String,
    pub transaction_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Hydrated from the category catalog; absent when the lookup failed.
    pub category: Option<Category>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_uid: String,
    pub category_id: i32,
    pub kind: String,
    pub amount_minor: i64,
    pub title: String,
    pub description: String,
    pub transaction_date: Date,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Category,
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<(Model, Option<categories::Model>)> for Transaction {
    type Error = EngineError;

    fn try_from((model, category): (Model, Option<categories::Model>)) -> ResultEngine<Self> {
        let category = category.map(Category::try_from).transpose()?;
        Ok(Self {
            id: model.id,
            user_uid: model.user_uid,
            category_id: model.category_id,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            amount: MoneyCents::new(model.amount_minor),
            title: model.title,
            description: model.description,
            transaction_date: model.transaction_date,
            created_at: model.created_at,
            updated_at: model.updated_at,
            category,
        })
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Self::try_from((model, None))
    }
}
