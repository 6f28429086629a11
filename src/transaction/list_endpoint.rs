//! Defines the endpoint for listing a user's transactions.

use axum::{
    Extension, Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::{
    app_state::AppState,
    report::{RangeQuery, resolve_range},
    transaction::{
        models::{CategoryName, TransactionKind},
        store::{SortOrder, TransactionQuery, TransactionStore},
    },
    user::UserId,
};

/// The query parameters for listing transactions.
///
/// All filters are optional and combine with AND semantics.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionListQuery {
    /// Include only transactions of this kind.
    pub kind: Option<TransactionKind>,
    /// Include only transactions in this category (normalized before
    /// matching).
    pub category: Option<String>,
    /// Include only transactions inside this `YYYY-MM` month.
    pub month: Option<String>,
}

/// A route handler that lists the caller's transactions, newest first.
pub async fn list_transactions_endpoint<T>(
    State(state): State<AppState<T>>,
    Extension(user_id): Extension<UserId>,
    Query(query): Query<TransactionListQuery>,
) -> Response
where
    T: TransactionStore + Clone + Send + Sync,
{
    // The month filter shares the report resolver so that a malformed token
    // fails with the same message everywhere.
    let resolved = match resolve_range(&RangeQuery {
        month: query.month,
        year: None,
    }) {
        Ok(resolved) => resolved,
        Err(error) => return error.into_response(),
    };

    let category = match query.category.as_deref().map(CategoryName::new) {
        Some(Ok(category)) => Some(category),
        Some(Err(error)) => return error.into_response(),
        None => None,
    };

    let result = state.transaction_store.get_query(
        user_id,
        TransactionQuery {
            date_span: resolved.map(|range| range.span),
            kind: query.kind,
            category,
            sort_date: Some(SortOrder::Descending),
        },
    );

    match result {
        Ok(transactions) => Json(transactions).into_response(),
        Err(error) => error.into_response(),
    }
}
