use chrono::Utc;
use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter,
    prelude::*,
    sea_query::{Expr, OnConflict},
};

use crate::{MoneyCents, ResultEngine, TransactionKind, UserBalance, user_balances};

use super::Store;

/// Direction of a balance delta.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum BalanceEffect {
    /// A transaction starts counting (create, new side of an update).
    Apply,
    /// A transaction stops counting (delete, old side of an update).
    Revert,
}

/// Applies the effect of one transaction to its owner's balance.
///
/// Must run on the same database transaction as the ledger write. The update
/// is relative (`total = total + delta`), so concurrent writers for the same
/// user serialize on the row lock instead of overwriting each other.
///
/// `last_transaction_at` only moves forward on [`BalanceEffect::Apply`].
pub(crate) async fn apply_delta<C: ConnectionTrait>(
    conn: &C,
    user_uid: &str,
    kind: TransactionKind,
    amount: MoneyCents,
    effect: BalanceEffect,
) -> ResultEngine<()> {
    let now = Utc::now();
    ensure_balance_row(conn, user_uid, now).await?;

    let delta = match effect {
        BalanceEffect::Apply => amount.cents(),
        BalanceEffect::Revert => -amount.cents(),
    };

    let mut update = user_balances::Entity::update_many()
        .col_expr(user_balances::Column::UpdatedAt, Expr::value(now));
    update = match kind {
        TransactionKind::Income => update
            .col_expr(
                user_balances::Column::TotalIncomeMinor,
                Expr::col(user_balances::Column::TotalIncomeMinor).add(delta),
            )
            .col_expr(
                user_balances::Column::TotalBalanceMinor,
                Expr::col(user_balances::Column::TotalBalanceMinor).add(delta),
            ),
        TransactionKind::Expense => update
            .col_expr(
                user_balances::Column::TotalExpenseMinor,
                Expr::col(user_balances::Column::TotalExpenseMinor).add(delta),
            )
            .col_expr(
                user_balances::Column::TotalBalanceMinor,
                Expr::col(user_balances::Column::TotalBalanceMinor).sub(delta),
            ),
    };
    if effect == BalanceEffect::Apply {
        update = update.col_expr(
            user_balances::Column::LastTransactionAt,
            Expr::value(Some(now)),
        );
    }

    update
        .filter(user_balances::Column::UserUid.eq(user_uid))
        .exec(conn)
        .await?;

    tracing::debug!(
        user_uid,
        kind = kind.as_str(),
        delta,
        "balance delta applied"
    );
    Ok(())
}

/// Inserts an all-zero balance row unless one already exists.
async fn ensure_balance_row<C: ConnectionTrait>(
    conn: &C,
    user_uid: &str,
    now: DateTimeUtc,
) -> ResultEngine<()> {
    let row = user_balances::ActiveModel {
        user_uid: ActiveValue::Set(user_uid.to_string()),
        total_balance_minor: ActiveValue::Set(0),
        total_income_minor: ActiveValue::Set(0),
        total_expense_minor: ActiveValue::Set(0),
        last_transaction_at: ActiveValue::Set(None),
        updated_at: ActiveValue::Set(now),
    };
    user_balances::Entity::insert(row)
        .on_conflict(
            OnConflict::column(user_balances::Column::UserUid)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

impl Store {
    pub(super) async fn user_balance(&self, user_uid: &str) -> ResultEngine<UserBalance> {
        let balance = user_balances::Entity::find_by_id(user_uid.to_string())
            .one(&self.database)
            .await?
            .map(UserBalance::from)
            .unwrap_or_else(|| UserBalance::zero(user_uid));
        Ok(balance)
    }
}
