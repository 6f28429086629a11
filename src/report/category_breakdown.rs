//! The category breakdown report: where a user's money went, as per-category
//! expense totals and percentage shares.

use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::{
    app_state::AppState,
    report::range::{RangeDescriptor, RangeQuery, resolve_range},
    transaction::{
        CategoryName, Transaction, TransactionKind, TransactionQuery, TransactionStore,
    },
    user::UserId,
};

/// One category's slice of the total expenses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryShare {
    /// The category name.
    pub category: CategoryName,
    /// The sum of the expense amounts in this category.
    pub total_amount: f64,
    /// This category's share of the total expenses, in percent rounded to
    /// two decimal places.
    pub percent: f64,
}

/// Per-category expense totals, largest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBreakdownReport {
    /// The sum of all expense amounts across all categories.
    pub total_expenses: f64,
    /// The per-category shares, sorted by total amount descending. Empty
    /// when there are no expenses, so that callers never see 0% entries.
    pub breakdown: Vec<CategoryShare>,
    /// The date filter that was applied, omitted for all-time breakdowns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<RangeDescriptor>,
}

/// Round to two decimal places, halves away from zero.
fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Group `transactions` by category and compute each category's share of the
/// total.
///
/// Only expense transactions count towards the breakdown. The output order is
/// deterministic: total amount descending, ties broken by category name
/// ascending. When the expense total is zero the breakdown is empty rather
/// than a list of meaningless 0% entries.
pub fn breakdown_by_category(
    transactions: &[Transaction],
    range: Option<RangeDescriptor>,
) -> CategoryBreakdownReport {
    let mut totals: HashMap<&CategoryName, f64> = HashMap::new();

    for transaction in transactions
        .iter()
        .filter(|transaction| transaction.kind == TransactionKind::Expense)
    {
        *totals.entry(&transaction.category).or_insert(0.0) += transaction.amount;
    }

    let total_expenses: f64 = totals.values().sum();

    if total_expenses == 0.0 {
        return CategoryBreakdownReport {
            total_expenses: 0.0,
            breakdown: Vec::new(),
            range,
        };
    }

    let mut grouped: Vec<(&CategoryName, f64)> = totals.into_iter().collect();
    grouped.sort_by(|(category_a, amount_a), (category_b, amount_b)| {
        amount_b
            .partial_cmp(amount_a)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| category_a.cmp(category_b))
    });

    let breakdown = grouped
        .into_iter()
        .map(|(category, total_amount)| CategoryShare {
            category: category.clone(),
            total_amount,
            percent: round_to_cents(total_amount / total_expenses * 100.0),
        })
        .collect();

    CategoryBreakdownReport {
        total_expenses,
        breakdown,
        range,
    }
}

/// A route handler for the category breakdown report.
///
/// Accepts the same optional `month`/`year` query parameters as the summary
/// report.
pub async fn get_category_breakdown<T>(
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
            kind: Some(TransactionKind::Expense),
            ..Default::default()
        },
    ) {
        Ok(transactions) => transactions,
        Err(error) => return error.into_response(),
    };

    Json(breakdown_by_category(&transactions, descriptor)).into_response()
}
