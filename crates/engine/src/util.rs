//! Internal helpers for request validation.
//!
//! These utilities are **not** part of the public API. They run before any
//! side effect so a rejected request never reaches the notifier or the store.

use chrono::NaiveDate;

use crate::{EngineError, MoneyCents, ResultEngine};

/// Page size used when a caller asks for `limit == 0`.
pub const DEFAULT_PAGE_LIMIT: u64 = 50;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` calendar date.
pub(crate) fn parse_transaction_date(value: &str) -> ResultEngine<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|err| {
        EngineError::InvalidArgument(format!("invalid transaction date '{value}': {err}"))
    })
}

pub(crate) fn ensure_positive_amount(amount: MoneyCents) -> ResultEngine<()> {
    if !amount.is_positive() {
        return Err(EngineError::InvalidArgument(format!(
            "amount must be > 0, got {amount}"
        )));
    }
    Ok(())
}

pub(crate) fn page_limit(limit: u64) -> u64 {
    if limit == 0 { DEFAULT_PAGE_LIMIT } else { limit }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_calendar_dates() {
        let date = parse_transaction_date("2024-02-29").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn rejects_malformed_dates() {
        for input in ["2023-02-29", "29/02/2024", "2024-13-01", "", "2024-01-01T10:00:00"] {
            assert!(
                matches!(
                    parse_transaction_date(input),
                    Err(EngineError::InvalidArgument(_))
                ),
                "{input} should be rejected"
            );
        }
    }

    #[test]
    fn zero_or_negative_amounts_are_invalid() {
        assert!(ensure_positive_amount(MoneyCents::new(1)).is_ok());
        assert!(ensure_positive_amount(MoneyCents::ZERO).is_err());
        assert!(ensure_positive_amount(MoneyCents::new(-500)).is_err());
    }

    #[test]
    fn zero_limit_falls_back_to_default() {
        assert_eq!(page_limit(0), DEFAULT_PAGE_LIMIT);
        assert_eq!(page_limit(7), 7);
        assert_eq!(page_limit(10_000), 10_000);
    }
}
