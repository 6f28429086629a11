//! The summary report: income, expense and balance totals for one user,
//! optionally restricted to a month or a year.

use axum::{
    Extension, Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::{
    app_state::AppState,
    report::range::{RangeDescriptor, RangeQuery, resolve_range},
    transaction::{Transaction, TransactionKind, TransactionQuery, TransactionStore},
    user::UserId,
};

/// Totals over a user's transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryReport {
    /// The sum of all income amounts.
    pub total_income: f64,
    /// The sum of all expense amounts.
    pub total_expenses: f64,
    /// The number of transactions that contributed to the totals.
    pub transaction_count: usize,
    /// `total_income - total_expenses`. Negative when the user spent more
    /// than they earned, which is a valid, reportable state.
    pub balance: f64,
    /// The date filter that was applied, omitted for all-time summaries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<RangeDescriptor>,
}

/// Reduce `transactions` into a [SummaryReport] with a single pass.
///
/// An empty slice produces an all-zero report rather than an error, so new
/// users always see a fully populated summary.
pub fn summarize(transactions: &[Transaction], range: Option<RangeDescriptor>) -> SummaryReport {
    let mut total_income = 0.0;
    let mut total_expenses = 0.0;

    for transaction in transactions {
        match transaction.kind {
            TransactionKind::Income => total_income += transaction.amount,
            TransactionKind::Expense => total_expenses += transaction.amount,
        }
    }

    SummaryReport {
        total_income,
        total_expenses,
        transaction_count: transactions.len(),
        balance: total_income - total_expenses,
        range,
    }
}

/// A route handler for the summary report.
///
/// Accepts optional `month=YYYY-MM` and `year=YYYY` query parameters; the
/// month takes precedence when both are present.
pub async fn get_summary<T>(
    State(state): State<AppState<T>>,
    Extension(user_id): Extension<UserId>,
    Query(query): Query<RangeQuery>,
) -> Response
where
    T: TransactionStore + Clone + Send + Sync,
{
    let resolved = match resolve_range(&query) {
        Ok(resolved) => resolved,
        Err(error) => return error.into_response(),
    };

    let (date_span, descriptor) = match resolved {
        Some(range) => (Some(range.span), Some(range.descriptor)),
        None => (None, None),
    };

    let transactions = match state.transaction_store.get_query(
        user_id,
        TransactionQuery {
            date_span,
            ..Default::default()
        },
    ) {
        Ok(transactions) => transactions,
        Err(error) => return error.into_response(),
    };

    Json(summarize(&transactions, descriptor)).into_response()
}

#[cfg(test)]
mod summarize_tests {
    use time::macros::date;

    use crate::{
        report::{
            range::RangeDescriptor,
            summary::{SummaryReport, summarize},
        },
        transaction::{CategoryName, Transaction, TransactionKind},
        user::UserId,
    };

    fn transaction(kind: TransactionKind, amount: f64) -> Transaction {
        Transaction {
            id: 0,
            user_id: UserId::new(1),
            kind,
            amount,
            category: CategoryName::new_unchecked("misc"),
            date: date!(2026 - 01 - 15),
            description: String::new(),
        }
    }

    #[test]
    fn empty_input_produces_all_zero_report() {
        let got = summarize(&[], None);

        assert_eq!(
            got,
            SummaryReport {
                total_income: 0.0,
                total_expenses: 0.0,
                transaction_count: 0,
                balance: 0.0,
                range: None,
            }
        );
    }

    #[test]
    fn sums_income_and_expenses_separately() {
        let transactions = vec![
            transaction(TransactionKind::Income, 2500.0),
            transaction(TransactionKind::Expense, 900.0),
            transaction(TransactionKind::Expense, 100.0),
            transaction(TransactionKind::Income, 50.0),
        ];

        let got = summarize(&transactions, None);

        assert_eq!(got.total_income, 2550.0);
        assert_eq!(got.total_expenses, 1000.0);
        assert_eq!(got.balance, 1550.0);
        assert_eq!(got.transaction_count, 4);
    }

    #[test]
    fn balance_may_be_negative() {
        let transactions = vec![
            transaction(TransactionKind::Income, 100.0),
            transaction(TransactionKind::Expense, 250.0),
        ];

        let got = summarize(&transactions, None);

        assert_eq!(got.balance, -150.0);
    }

    #[test]
    fn echoes_the_applied_range() {
        let descriptor = RangeDescriptor::Month("2026-01".to_owned());

        let got = summarize(&[], Some(descriptor.clone()));

        assert_eq!(got.range, Some(descriptor));
    }

    #[test]
    fn summarize_is_idempotent() {
        let transactions = vec![
            transaction(TransactionKind::Income, 123.45),
            transaction(TransactionKind::Expense, 67.89),
        ];

        assert_eq!(summarize(&transactions, None), summarize(&transactions, None));
    }

    #[test]
    fn range_is_omitted_from_json_when_absent() {
        let json = serde_json::to_string(&summarize(&[], None)).unwrap();

        assert!(!json.contains("range"));
        assert!(json.contains(r#""totalIncome":0.0"#));
    }
}
