//! Per-user running balance.
//!
//! One row per user, created lazily by the first ledger write and then kept in
//! lock-step with every create/update/delete through relative deltas.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::MoneyCents;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserBalance {
    pub user_uid: String,
    pub total_balance: MoneyCents,
    pub total_income: MoneyCents,
    pub total_expense: MoneyCents,
    pub last_transaction_at: Option<DateTime<Utc>>,
    /// `None` only for the zero value of a user that never wrote anything.
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserBalance {
    /// Zero value returned for users without a balance row.
    pub fn zero(user_uid: impl Into<String>) -> Self {
        Self {
            user_uid: user_uid.into(),
            total_balance: MoneyCents::ZERO,
            total_income: MoneyCents::ZERO,
            total_expense: MoneyCents::ZERO,
            last_transaction_at: None,
            updated_at: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "user_balances")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_uid: String,
    pub total_balance_minor: i64,
    pub total_income_minor: i64,
    pub total_expense_minor: i64,
    pub last_transaction_at: Option<DateTimeUtc>,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for UserBalance {
    fn from(model: Model) -> Self {
        Self {
            user_uid: model.user_uid,
            total_balance: MoneyCents::new(model.total_balance_minor),
            total_income: MoneyCents::new(model.total_income_minor),
            total_expense: MoneyCents::new(model.total_expense_minor),
            last_transaction_at: model.last_transaction_at,
            updated_at: Some(model.updated_at),
        }
    }
}
