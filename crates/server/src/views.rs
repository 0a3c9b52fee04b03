//! Engine to wire type conversions.

use api_types::{
    TransactionKind as ApiKind, balance::BalanceView, category::CategoryView,
    transaction::TransactionView,
};
use engine::{Category, MoneyCents, Transaction, TransactionKind, UserBalance};

use crate::ServerError;

pub(crate) fn map_kind(kind: TransactionKind) -> ApiKind {
    match kind {
        TransactionKind::Income => ApiKind::Income,
        TransactionKind::Expense => ApiKind::Expense,
    }
}

pub(crate) fn engine_kind(kind: ApiKind) -> TransactionKind {
    match kind {
        ApiKind::Income => TransactionKind::Income,
        ApiKind::Expense => TransactionKind::Expense,
    }
}

pub(crate) fn parse_amount(amount: &str) -> Result<MoneyCents, ServerError> {
    Ok(amount.parse::<MoneyCents>()?)
}

pub(crate) fn map_category(category: Category) -> CategoryView {
    CategoryView {
        id: category.id,
        name: category.name,
        kind: map_kind(category.kind),
        icon: category.icon,
        created_at: category.created_at,
    }
}

pub(crate) fn map_transaction(tx: Transaction) -> TransactionView {
    TransactionView {
        id: tx.id,
        user_uid: tx.user_uid,
        category_id: tx.category_id,
        kind: map_kind(tx.kind),
        amount: tx.amount.to_string(),
        amount_minor: tx.amount.cents(),
        title: tx.title,
        description: tx.description,
        transaction_date: tx.transaction_date,
        created_at: tx.created_at,
        updated_at: tx.updated_at,
        category: tx.category.map(map_category),
    }
}

pub(crate) fn map_balance(balance: UserBalance) -> BalanceView {
    BalanceView {
        user_uid: balance.user_uid,
        total_balance: balance.total_balance.to_string(),
        total_income: balance.total_income.to_string(),
        total_expense: balance.total_expense.to_string(),
        total_balance_minor: balance.total_balance.cents(),
        total_income_minor: balance.total_income.cents(),
        total_expense_minor: balance.total_expense.cents(),
        last_transaction_at: balance.last_transaction_at,
        updated_at: balance.updated_at,
    }
}
