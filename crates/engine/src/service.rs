//! Ledger use cases.
//!
//! [`Engine`] validates requests, emits the change signal and delegates to the
//! [`LedgerStore`]. Mutations always go through the same three steps:
//!
//! 1. validate (fail fast, no side effects);
//! 2. notify the change channel, aborting on failure;
//! 3. run the atomic store operation.
//!
//! The deadline covers those steps only. Category hydration happens after the
//! commit and can no longer fail the call.
//!
//! The signal is sent before the store runs and is not withdrawn if the store
//! later fails, so consumers may see spurious signals.

use std::{future::Future, sync::Arc, time::Duration};

use async_trait::async_trait;
use sea_orm::DatabaseConnection;

use crate::{
    Category, ChangeNotifier, CreateTransactionCmd, EngineError, LedgerStore, NewTransaction,
    ResultEngine, Store, Transaction, TransactionChanges, TransactionKind, TransactionPage,
    UpdateTransactionCmd, UserBalance,
    util::{ensure_positive_amount, page_limit, parse_transaction_date},
};

/// The ledger operations offered to transports and workers.
#[async_trait]
pub trait LedgerService: Send + Sync {
    async fn create_transaction(&self, cmd: CreateTransactionCmd) -> ResultEngine<Transaction>;

    async fn transaction(&self, id: i64) -> ResultEngine<Transaction>;

    /// Newest first; `limit == 0` means the default page size.
    async fn list_user_transactions(
        &self,
        user_uid: &str,
        limit: u64,
        offset: u64,
    ) -> ResultEngine<TransactionPage>;

    async fn list_user_transactions_in_period(
        &self,
        user_uid: &str,
        days: u32,
        limit: u64,
        offset: u64,
    ) -> ResultEngine<TransactionPage>;

    async fn update_transaction(&self, cmd: UpdateTransactionCmd) -> ResultEngine<Transaction>;

    async fn delete_transaction(&self, id: i64, user_uid: &str) -> ResultEngine<()>;

    /// Never fails with `NotFound`: users without transactions get zeros.
    async fn user_balance(&self, user_uid: &str) -> ResultEngine<UserBalance>;

    async fn categories(&self) -> ResultEngine<Vec<Category>>;

    async fn categories_by_kind(&self, kind: TransactionKind) -> ResultEngine<Vec<Category>>;

    async fn category(&self, id: i32) -> ResultEngine<Category>;
}

pub struct Engine {
    store: Arc<dyn LedgerStore>,
    notifier: Arc<dyn ChangeNotifier>,
    deadline: Option<Duration>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("deadline", &self.deadline)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Runs `op` under the configured deadline.
    ///
    /// On timeout the future is dropped; an open database transaction inside
    /// it is rolled back by its drop.
    async fn bounded<T>(
        &self,
        name: &'static str,
        op: impl Future<Output = ResultEngine<T>>,
    ) -> ResultEngine<T> {
        match self.deadline {
            None => op.await,
            Some(deadline) => tokio::time::timeout(deadline, op).await.map_err(|_| {
                tracing::warn!(operation = name, ?deadline, "operation deadline exceeded");
                EngineError::DeadlineExceeded(name.to_string())
            })?,
        }
    }

    /// Attaches the category to a freshly committed transaction.
    ///
    /// Runs outside the operation deadline with a budget of its own. Lookup
    /// failures and timeouts are logged and leave the category absent, so a
    /// durable write is never reported as failed.
    async fn hydrate(&self, mut tx: Transaction) -> Transaction {
        let lookup = self.store.category(tx.category_id);
        let result = match self.deadline {
            None => lookup.await,
            Some(deadline) => tokio::time::timeout(deadline, lookup)
                .await
                .unwrap_or_else(|_| {
                    Err(EngineError::DeadlineExceeded("category hydration".to_string()))
                }),
        };
        match result {
            Ok(category) => tx.category = Some(category),
            Err(err) => tracing::warn!(
                transaction_id = tx.id,
                category_id = tx.category_id,
                "category hydration failed: {err}"
            ),
        }
        tx
    }
}

#[async_trait]
impl LedgerService for Engine {
    async fn create_transaction(&self, cmd: CreateTransactionCmd) -> ResultEngine<Transaction> {
        ensure_positive_amount(cmd.amount)?;
        let transaction_date = parse_transaction_date(&cmd.transaction_date)?;
        let input = NewTransaction {
            user_uid: cmd.user_uid,
            category_id: cmd.category_id,
            kind: cmd.kind,
            amount: cmd.amount,
            title: cmd.title,
            description: cmd.description,
            transaction_date,
        };

        let tx = self
            .bounded("create_transaction", async {
                self.notifier.notify(&input.user_uid).await?;
                self.store.create(input).await
            })
            .await?;
        Ok(self.hydrate(tx).await)
    }

    async fn transaction(&self, id: i64) -> ResultEngine<Transaction> {
        self.bounded("transaction", self.store.transaction(id))
            .await
    }

    async fn list_user_transactions(
        &self,
        user_uid: &str,
        limit: u64,
        offset: u64,
    ) -> ResultEngine<TransactionPage> {
        self.bounded(
            "list_user_transactions",
            self.store.list_by_user(user_uid, page_limit(limit), offset),
        )
        .await
    }

    async fn list_user_transactions_in_period(
        &self,
        user_uid: &str,
        days: u32,
        limit: u64,
        offset: u64,
    ) -> ResultEngine<TransactionPage> {
        self.bounded(
            "list_user_transactions_in_period",
            self.store
                .list_by_user_in_period(user_uid, days, page_limit(limit), offset),
        )
        .await
    }

    async fn update_transaction(&self, cmd: UpdateTransactionCmd) -> ResultEngine<Transaction> {
        ensure_positive_amount(cmd.amount)?;
        let transaction_date = parse_transaction_date(&cmd.transaction_date)?;
        let input = TransactionChanges {
            id: cmd.id,
            user_uid: cmd.user_uid,
            category_id: cmd.category_id,
            kind: cmd.kind,
            amount: cmd.amount,
            title: cmd.title,
            description: cmd.description,
            transaction_date,
        };

        let tx = self
            .bounded("update_transaction", async {
                self.notifier.notify(&input.user_uid).await?;
                self.store.update(input).await
            })
            .await?;
        Ok(self.hydrate(tx).await)
    }

    async fn delete_transaction(&self, id: i64, user_uid: &str) -> ResultEngine<()> {
        self.bounded("delete_transaction", async {
            self.notifier.notify(user_uid).await?;
            self.store.delete(id, user_uid).await
        })
        .await
    }

    async fn user_balance(&self, user_uid: &str) -> ResultEngine<UserBalance> {
        self.bounded("user_balance", self.store.balance(user_uid))
            .await
    }

    async fn categories(&self) -> ResultEngine<Vec<Category>> {
        self.bounded("categories", self.store.categories()).await
    }

    async fn categories_by_kind(&self, kind: TransactionKind) -> ResultEngine<Vec<Category>> {
        self.bounded("categories_by_kind", self.store.categories_by_kind(kind))
            .await
    }

    async fn category(&self, id: i32) -> ResultEngine<Category> {
        self.bounded("category", self.store.category(id)).await
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    store: Option<Arc<dyn LedgerStore>>,
    notifier: Option<Arc<dyn ChangeNotifier>>,
    deadline: Option<Duration>,
}

impl EngineBuilder {
    /// Use the relational store on `db`.
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.store = Some(Arc::new(Store::new(db)));
        self
    }

    /// Use a custom store implementation.
    pub fn store(mut self, store: Arc<dyn LedgerStore>) -> EngineBuilder {
        self.store = Some(store);
        self
    }

    /// Pass the required change notifier
    pub fn notifier(mut self, notifier: Arc<dyn ChangeNotifier>) -> EngineBuilder {
        self.notifier = Some(notifier);
        self
    }

    /// Upper bound for every operation, notification included. Post-commit
    /// category hydration gets a separate budget of the same length.
    pub fn deadline(mut self, deadline: Duration) -> EngineBuilder {
        self.deadline = Some(deadline);
        self
    }

    /// Construct `Engine`
    pub fn build(self) -> ResultEngine<Engine> {
        let store = self
            .store
            .ok_or_else(|| EngineError::InvalidArgument("engine requires a store".to_string()))?;
        let notifier = self.notifier.ok_or_else(|| {
            EngineError::InvalidArgument("engine requires a change notifier".to_string())
        })?;
        Ok(Engine {
            store,
            notifier,
            deadline: self.deadline,
        })
    }
}
