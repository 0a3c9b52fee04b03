use std::sync::Arc;

use async_trait::async_trait;
use engine::{LedgerService, Recalculator, ResultEngine};

/// Recomputes a user's figures by re-reading the aggregate from the ledger.
pub struct BalanceRefresher {
    service: Arc<dyn LedgerService>,
}

impl BalanceRefresher {
    pub fn new(service: Arc<dyn LedgerService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Recalculator for BalanceRefresher {
    async fn recalculate(&self, user_uid: &str) -> ResultEngine<()> {
        let balance = self.service.user_balance(user_uid).await?;
        let period = self
            .service
            .list_user_transactions_in_period(user_uid, 30, 1, 0)
            .await?;
        tracing::info!(
            user_uid,
            balance = %balance.total_balance,
            income = %balance.total_income,
            expense = %balance.total_expense,
            last_30_days = period.total,
            "balance refreshed"
        );
        Ok(())
    }
}
