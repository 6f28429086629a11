//! Defines the endpoint for updating an existing transaction.

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::Deserialize;
use time::Date;

use crate::{
    Error,
    app_state::AppState,
    transaction::{
        models::{CategoryName, Transaction, TransactionId, TransactionKind, validate_amount},
        store::{TransactionChanges, TransactionStore},
    },
    user::UserId,
};

/// The request body for updating a transaction.
///
/// Only the fields present in the request are changed.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTransactionData {
    /// Replace the transaction kind.
    pub kind: Option<TransactionKind>,
    /// Replace the amount. Must be greater than zero.
    pub amount: Option<f64>,
    /// Replace the category. Normalized before storage.
    pub category: Option<String>,
    /// Replace the date.
    pub date: Option<Date>,
    /// Replace the description.
    pub description: Option<String>,
}

/// A route handler for updating a subset of a transaction's fields, answers
/// with the updated row on success.
///
/// An empty update is rejected rather than treated as a no-op so that client
/// bugs surface early. Updating another user's transaction answers 404, the
/// same as a transaction that does not exist.
pub async fn update_transaction_endpoint<T>(
    State(mut state): State<AppState<T>>,
    Extension(user_id): Extension<UserId>,
    Path(transaction_id): Path<TransactionId>,
    Json(data): Json<UpdateTransactionData>,
) -> Result<Json<Transaction>, Error>
where
    T: TransactionStore + Clone + Send + Sync,
{
    let changes = TransactionChanges {
        kind: data.kind,
        amount: data.amount.map(validate_amount).transpose()?,
        category: data
            .category
            .as_deref()
            .map(CategoryName::new)
            .transpose()?,
        date: data.date,
        description: data.description,
    };

    if changes.is_empty() {
        return Err(Error::EmptyUpdate);
    }

    state
        .transaction_store
        .update(transaction_id, user_id, changes)
        .map(Json)
}
