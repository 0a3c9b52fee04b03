//! Command structs for ledger write operations.
//!
//! `CreateTransactionCmd`/`UpdateTransactionCmd` are what callers hand to the
//! service: the date is still the raw `YYYY-MM-DD` string received from the
//! outside. The service validates them into `NewTransaction` /
//! `TransactionChanges`, which is all the store ever sees.

use chrono::NaiveDate;

use crate::{MoneyCents, TransactionKind};

/// Create a transaction for `user_uid`.
#[derive(Clone, Debug)]
pub struct CreateTransactionCmd {
    pub user_uid: String,
    pub category_id: i32,
    pub kind: TransactionKind,
    pub amount: MoneyCents,
    pub title: String,
    pub description: String,
    pub transaction_date: String,
}

impl CreateTransactionCmd {
    #[must_use]
    pub fn new(
        user_uid: impl Into<String>,
        category_id: i32,
        kind: TransactionKind,
        amount: MoneyCents,
        transaction_date: impl Into<String>,
    ) -> Self {
        Self {
            user_uid: user_uid.into(),
            category_id,
            kind,
            amount,
            title: String::new(),
            description: String::new(),
            transaction_date: transaction_date.into(),
        }
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Replace every mutable field of transaction `id`, on behalf of `user_uid`.
///
/// There is no partial patch: omitted text fields become empty.
#[derive(Clone, Debug)]
pub struct UpdateTransactionCmd {
    pub id: i64,
    pub user_uid: String,
    pub category_id: i32,
    pub kind: TransactionKind,
    pub amount: MoneyCents,
    pub title: String,
    pub description: String,
    pub transaction_date: String,
}

impl UpdateTransactionCmd {
    #[must_use]
    pub fn new(
        id: i64,
        user_uid: impl Into<String>,
        category_id: i32,
        kind: TransactionKind,
        amount: MoneyCents,
        transaction_date: impl Into<String>,
    ) -> Self {
        Self {
            id,
            user_uid: user_uid.into(),
            category_id,
            kind,
            amount,
            title: String::new(),
            description: String::new(),
            transaction_date: transaction_date.into(),
        }
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Validated insert input for the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewTransaction {
    pub user_uid: String,
    pub category_id: i32,
    pub kind: TransactionKind,
    pub amount: MoneyCents,
    pub title: String,
    pub description: String,
    pub transaction_date: NaiveDate,
}

/// Validated full-replace input for the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionChanges {
    pub id: i64,
    pub user_uid: String,
    pub category_id: i32,
    pub kind: TransactionKind,
    pub amount: MoneyCents,
    pub title: String,
    pub description: String,
    pub transaction_date: NaiveDate,
}
