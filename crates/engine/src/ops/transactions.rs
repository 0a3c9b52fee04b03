use chrono::{Duration, NaiveDate, Utc};
use sea_orm::{
    ActiveValue, DatabaseTransaction, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    Select, TransactionTrait, prelude::*,
};

use crate::{
    EngineError, MoneyCents, NewTransaction, ResultEngine, Transaction, TransactionChanges,
    TransactionKind, categories, transactions,
};

use super::{
    BalanceEffect, Store, TransactionPage,
    balances::apply_delta,
    with_tx,
};

/// Owner, kind and amount of a stored row, as read before a mutation.
struct StoredEffect {
    user_uid: String,
    kind: TransactionKind,
    amount: MoneyCents,
}

impl Store {
    /// Inserts a transaction and applies its forward balance delta.
    ///
    /// The returned transaction carries no category; hydration is left to the
    /// caller.
    pub(super) async fn insert_transaction(
        &self,
        input: NewTransaction,
    ) -> ResultEngine<Transaction> {
        let now = Utc::now();
        let model = with_tx!(self, |db_tx| {
            let model = transactions::ActiveModel {
                id: ActiveValue::NotSet,
                user_uid: ActiveValue::Set(input.user_uid.clone()),
                category_id: ActiveValue::Set(input.category_id),
                kind: ActiveValue::Set(input.kind.as_str().to_string()),
                amount_minor: ActiveValue::Set(input.amount.cents()),
                title: ActiveValue::Set(input.title),
                description: ActiveValue::Set(input.description),
                transaction_date: ActiveValue::Set(input.transaction_date),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await?;

            apply_delta(
                &db_tx,
                &input.user_uid,
                input.kind,
                input.amount,
                BalanceEffect::Apply,
            )
            .await?;

            Ok::<_, EngineError>(model)
        })?;

        tracing::info!(
            transaction_id = model.id,
            user_uid = model.user_uid.as_str(),
            "transaction created"
        );
        Transaction::try_from(model)
    }

    pub(super) async fn find_transaction(&self, id: i64) -> ResultEngine<Transaction> {
        let (model, category) = transactions::Entity::find_by_id(id)
            .find_also_related(categories::Entity)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("transaction {id}")))?;
        Transaction::try_from((model, category))
    }

    /// Lists a user's transactions, newest first.
    ///
    /// With `days` set, only transactions dated on or after `today - days`
    /// (UTC) are counted and returned.
    pub(super) async fn list_transactions(
        &self,
        user_uid: &str,
        days: Option<u32>,
        limit: u64,
        offset: u64,
    ) -> ResultEngine<TransactionPage> {
        let scoped = || {
            let mut query = transactions::Entity::find()
                .filter(transactions::Column::UserUid.eq(user_uid.to_string()));
            if let Some(days) = days {
                let since = Utc::now()
                    .date_naive()
                    .checked_sub_signed(Duration::days(i64::from(days)))
                    .unwrap_or(NaiveDate::MIN);
                query = query.filter(transactions::Column::TransactionDate.gte(since));
            }
            query
        };

        let total = scoped().count(&self.database).await?;

        let rows = newest_first(scoped())
            .find_also_related(categories::Entity)
            .limit(limit)
            .offset(offset)
            .all(&self.database)
            .await?;

        let transactions = rows
            .into_iter()
            .map(Transaction::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;

        Ok(TransactionPage {
            transactions,
            total,
        })
    }

    /// Replaces a transaction and moves its balance effect.
    ///
    /// The old effect is reverted before the row is written and the new one is
    /// applied after, so a kind change (expense to income) is handled by two
    /// independent deltas.
    pub(super) async fn replace_transaction(
        &self,
        input: TransactionChanges,
    ) -> ResultEngine<Transaction> {
        let model = with_tx!(self, |db_tx| {
            let (existing, old) = lock_owned(&db_tx, input.id, &input.user_uid).await?;

            apply_delta(
                &db_tx,
                &old.user_uid,
                old.kind,
                old.amount,
                BalanceEffect::Revert,
            )
            .await?;

            let mut active: transactions::ActiveModel = existing.into();
            active.category_id = ActiveValue::Set(input.category_id);
            active.kind = ActiveValue::Set(input.kind.as_str().to_string());
            active.amount_minor = ActiveValue::Set(input.amount.cents());
            active.title = ActiveValue::Set(input.title);
            active.description = ActiveValue::Set(input.description);
            active.transaction_date = ActiveValue::Set(input.transaction_date);
            active.updated_at = ActiveValue::Set(Utc::now());
            let model = active.update(&db_tx).await?;

            apply_delta(
                &db_tx,
                &model.user_uid,
                input.kind,
                input.amount,
                BalanceEffect::Apply,
            )
            .await?;

            Ok::<_, EngineError>(model)
        })?;

        tracing::info!(
            transaction_id = model.id,
            user_uid = model.user_uid.as_str(),
            "transaction updated"
        );
        Transaction::try_from(model)
    }

    pub(super) async fn remove_transaction(&self, id: i64, user_uid: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let (_, old) = lock_owned(&db_tx, id, user_uid).await?;

            transactions::Entity::delete_by_id(id).exec(&db_tx).await?;

            apply_delta(
                &db_tx,
                &old.user_uid,
                old.kind,
                old.amount,
                BalanceEffect::Revert,
            )
            .await?;

            Ok::<_, EngineError>(())
        })?;

        tracing::info!(transaction_id = id, user_uid, "transaction deleted");
        Ok(())
    }
}

fn newest_first(query: Select<transactions::Entity>) -> Select<transactions::Entity> {
    query
        .order_by_desc(transactions::Column::TransactionDate)
        .order_by_desc(transactions::Column::CreatedAt)
        .order_by_desc(transactions::Column::Id)
}

/// Loads transaction `id` for writing and checks that `user_uid` owns it.
///
/// The row is locked (`FOR UPDATE`) on backends with row locks; SQLite
/// already serializes writers.
async fn lock_owned(
    db_tx: &DatabaseTransaction,
    id: i64,
    user_uid: &str,
) -> ResultEngine<(transactions::Model, StoredEffect)> {
    let model = transactions::Entity::find_by_id(id)
        .lock_exclusive()
        .one(db_tx)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("transaction {id}")))?;

    if model.user_uid != user_uid {
        tracing::warn!(
            transaction_id = id,
            user_uid,
            "transaction belongs to another user"
        );
        return Err(EngineError::OwnershipMismatch(format!(
            "transaction {id} does not belong to user"
        )));
    }

    let effect = StoredEffect {
        user_uid: model.user_uid.clone(),
        kind: TransactionKind::try_from(model.kind.as_str())?,
        amount: MoneyCents::new(model.amount_minor),
    };
    Ok((model, effect))
}

#[cfg(test)]
mod tests {
    use std::time::Duration as StdDuration;

    use migration::MigratorTrait;
    use sea_orm::Database;

    use super::*;

    async fn store() -> Store {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        Store::new(db)
    }

    async fn seeded(store: &Store) -> Transaction {
        let category = store.kind_categories(TransactionKind::Income).await.unwrap()[0].id;
        store
            .insert_transaction(NewTransaction {
                user_uid: "alice".to_string(),
                category_id: category,
                kind: TransactionKind::Income,
                amount: MoneyCents::new(500),
                title: String::new(),
                description: String::new(),
                transaction_date: Utc::now().date_naive(),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn cancelled_unit_rolls_back_every_write() {
        let store = store().await;
        let tx = seeded(&store).await;
        let before = store.user_balance("alice").await.unwrap();

        let unit = async {
            let result: ResultEngine<()> = with_tx!(store, |db_tx| {
                let (_, old) = lock_owned(&db_tx, tx.id, "alice").await?;
                transactions::Entity::delete_by_id(tx.id).exec(&db_tx).await?;
                apply_delta(
                    &db_tx,
                    &old.user_uid,
                    old.kind,
                    old.amount,
                    BalanceEffect::Revert,
                )
                .await?;
                tokio::time::sleep(StdDuration::from_millis(500)).await;
                Ok::<_, EngineError>(())
            });
            result
        };
        assert!(
            tokio::time::timeout(StdDuration::from_millis(50), unit)
                .await
                .is_err()
        );

        assert_eq!(store.user_balance("alice").await.unwrap(), before);
        let stored = store.find_transaction(tx.id).await.unwrap();
        assert_eq!(stored.amount, MoneyCents::new(500));
    }

    #[tokio::test]
    async fn foreign_owner_is_rejected_before_any_write() {
        let store = store().await;
        let tx = seeded(&store).await;

        let err = store.remove_transaction(tx.id, "mallory").await.unwrap_err();
        assert!(matches!(err, EngineError::OwnershipMismatch(_)));
        assert_eq!(
            store.user_balance("alice").await.unwrap().total_income,
            MoneyCents::new(500)
        );
    }
}
