//! Transactional ledger with per-user balance aggregation.
//!
//! Writes go through [`Engine`] (the [`LedgerService`] implementation), which
//! emits a change signal and then runs an atomic [`LedgerStore`] operation
//! keeping `user_balances` consistent with `transactions`.

pub use categories::Category;
pub use commands::{CreateTransactionCmd, NewTransaction, TransactionChanges, UpdateTransactionCmd};
pub use error::EngineError;
pub use money::MoneyCents;
pub use notifier::{
    ChangeConsumer, ChangeNotifier, ChangeSignal, ChannelNotifier, ConsumerStats, RECOMPUTE_BODY,
    Recalculator,
};
pub use ops::{LedgerStore, Store, TransactionPage};
pub use service::{Engine, EngineBuilder, LedgerService};
pub use transactions::{Transaction, TransactionKind};
pub use user_balances::UserBalance;
pub use util::DEFAULT_PAGE_LIMIT;

mod categories;
mod commands;
mod error;
mod money;
mod notifier;
mod ops;
mod service;
mod transactions;
mod user_balances;
mod util;

pub type ResultEngine<T> = Result<T, EngineError>;
