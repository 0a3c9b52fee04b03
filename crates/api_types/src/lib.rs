use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
}

pub mod category {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryList {
        /// Restrict the listing to one kind.
        pub kind: Option<TransactionKind>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: i32,
        pub name: String,
        pub kind: TransactionKind,
        pub icon: String,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoriesResponse {
        pub categories: Vec<CategoryView>,
    }
}

pub mod balance {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceView {
        pub user_uid: String,
        /// Decimal string with two fraction digits, e.g. `"-12.50"`.
        pub total_balance: String,
        pub total_income: String,
        pub total_expense: String,
        pub total_balance_minor: i64,
        pub total_income_minor: i64,
        pub total_expense_minor: i64,
        pub last_transaction_at: Option<DateTime<Utc>>,
        pub updated_at: Option<DateTime<Utc>>,
    }
}

pub mod transaction {
    use super::{category::CategoryView, *};

    /// Request body for `POST /transactions`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        pub category_id: i32,
        pub kind: TransactionKind,
        /// Positive decimal amount; `.` or `,` as separator, at most 2 decimals.
        pub amount: String,
        #[serde(default)]
        pub title: String,
        #[serde(default)]
        pub description: String,
        /// Calendar date, `YYYY-MM-DD`.
        pub transaction_date: String,
    }

    /// Request body for `PUT /transactions/{id}`: a full replacement.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionUpdate {
        pub category_id: i32,
        pub kind: TransactionKind,
        pub amount: String,
        #[serde(default)]
        pub title: String,
        #[serde(default)]
        pub description: String,
        pub transaction_date: String,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionList {
        /// `0` or absent means the server default page size.
        pub limit: Option<u64>,
        pub offset: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionPeriodList {
        /// Keep transactions dated on or after `today - days` (UTC).
        pub days: u32,
        pub limit: Option<u64>,
        pub offset: Option<u64>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: i64,
        pub user_uid: String,
        pub category_id: i32,
        pub kind: TransactionKind,
        pub amount: String,
        pub amount_minor: i64,
        pub title: String,
        pub description: String,
        pub transaction_date: NaiveDate,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
        pub category: Option<CategoryView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionListResponse {
        pub transactions: Vec<TransactionView>,
        /// Count of every matching transaction, independent of the page.
        pub total: u64,
    }
}

#[cfg(test)]
mod tests {
    use super::{transaction::TransactionNew, *};

    #[test]
    fn kinds_use_lowercase_names() {
        assert_eq!(
            serde_json::to_string(&TransactionKind::Expense).unwrap(),
            "\"expense\""
        );
        let kind: TransactionKind = serde_json::from_str("\"income\"").unwrap();
        assert_eq!(kind, TransactionKind::Income);
    }

    #[test]
    fn text_fields_default_to_empty() {
        let body: TransactionNew = serde_json::from_str(
            r#"{"category_id":1,"kind":"income","amount":"10,50","transaction_date":"2024-05-01"}"#,
        )
        .unwrap();
        assert_eq!(body.title, "");
        assert_eq!(body.description, "");
        assert_eq!(body.amount, "10,50");
    }
}
