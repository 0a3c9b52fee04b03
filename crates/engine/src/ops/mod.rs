use async_trait::async_trait;
use sea_orm::DatabaseConnection;

use crate::{
    Category, NewTransaction, ResultEngine, Transaction, TransactionChanges, TransactionKind,
    UserBalance,
};

mod balances;
mod categories;
mod transactions;

pub(crate) use balances::BalanceEffect;

/// Run a block inside a DB transaction, committing on success.
///
/// On error (including an early `?` return from the block) the transaction is
/// dropped without commit, which rolls it back.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// One page of a user's transactions plus the user's total transaction count.
///
/// `total` comes from a separate count query and is not snapshot-consistent
/// with `transactions` under concurrent writes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionPage {
    pub transactions: Vec<Transaction>,
    pub total: u64,
}

/// Durable ledger + balance storage.
///
/// Every write keeps the owner's [`UserBalance`] in lock-step with the
/// transactions table inside a single database transaction.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn create(&self, input: NewTransaction) -> ResultEngine<Transaction>;

    /// Transaction joined with its category; `NotFound` if absent.
    async fn transaction(&self, id: i64) -> ResultEngine<Transaction>;

    async fn list_by_user(
        &self,
        user_uid: &str,
        limit: u64,
        offset: u64,
    ) -> ResultEngine<TransactionPage>;

    /// Like [`list_by_user`](Self::list_by_user), restricted to transactions
    /// dated within the last `days` days.
    async fn list_by_user_in_period(
        &self,
        user_uid: &str,
        days: u32,
        limit: u64,
        offset: u64,
    ) -> ResultEngine<TransactionPage>;

    async fn update(&self, input: TransactionChanges) -> ResultEngine<Transaction>;

    async fn delete(&self, id: i64, user_uid: &str) -> ResultEngine<()>;

    /// Stored balance, or the zero value when the user never wrote anything.
    async fn balance(&self, user_uid: &str) -> ResultEngine<UserBalance>;

    async fn categories(&self) -> ResultEngine<Vec<Category>>;

    async fn categories_by_kind(&self, kind: TransactionKind) -> ResultEngine<Vec<Category>>;

    async fn category(&self, id: i32) -> ResultEngine<Category>;
}

/// Relational [`LedgerStore`] backed by sea-orm.
#[derive(Clone, Debug)]
pub struct Store {
    database: DatabaseConnection,
}

impl Store {
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }
}

#[async_trait]
impl LedgerStore for Store {
    async fn create(&self, input: NewTransaction) -> ResultEngine<Transaction> {
        self.insert_transaction(input).await
    }

    async fn transaction(&self, id: i64) -> ResultEngine<Transaction> {
        self.find_transaction(id).await
    }

    async fn list_by_user(
        &self,
        user_uid: &str,
        limit: u64,
        offset: u64,
    ) -> ResultEngine<TransactionPage> {
        self.list_transactions(user_uid, None, limit, offset).await
    }

    async fn list_by_user_in_period(
        &self,
        user_uid: &str,
        days: u32,
        limit: u64,
        offset: u64,
    ) -> ResultEngine<TransactionPage> {
        self.list_transactions(user_uid, Some(days), limit, offset)
            .await
    }

    async fn update(&self, input: TransactionChanges) -> ResultEngine<Transaction> {
        self.replace_transaction(input).await
    }

    async fn delete(&self, id: i64, user_uid: &str) -> ResultEngine<()> {
        self.remove_transaction(id, user_uid).await
    }

    async fn balance(&self, user_uid: &str) -> ResultEngine<UserBalance> {
        self.user_balance(user_uid).await
    }

    async fn categories(&self) -> ResultEngine<Vec<Category>> {
        self.all_categories().await
    }

    async fn categories_by_kind(&self, kind: TransactionKind) -> ResultEngine<Vec<Category>> {
        self.kind_categories(kind).await
    }

    async fn category(&self, id: i32) -> ResultEngine<Category> {
        self.find_category(id).await
    }
}
