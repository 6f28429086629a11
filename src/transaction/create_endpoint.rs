//! Defines the endpoint for recording a new transaction.

use axum::{Extension, Json, extract::State, http::StatusCode};
use serde::Deserialize;
use time::Date;

use crate::{
    Error,
    app_state::AppState,
    transaction::{
        models::{CategoryName, Transaction, TransactionKind, validate_amount},
        store::TransactionStore,
    },
    user::UserId,
};

/// The request body for creating a transaction.
#[derive(Debug, Deserialize)]
pub struct CreateTransactionData {
    /// Whether the transaction is an income or an expense.
    pub kind: TransactionKind,
    /// The value of the transaction. Must be greater than zero.
    pub amount: f64,
    /// The category the transaction belongs to. Normalized before storage.
    pub category: String,
    /// The date when the transaction occurred.
    pub date: Date,
    /// Text detailing the transaction.
    #[serde(default)]
    pub description: String,
}

/// A route handler for recording a new transaction, answers with the stored
/// row on success.
pub async fn create_transaction_endpoint<T>(
    State(mut state): State<AppState<T>>,
    Extension(user_id): Extension<UserId>,
    Json(data): Json<CreateTransactionData>,
) -> Result<(StatusCode, Json<Transaction>), Error>
where
    T: TransactionStore + Clone + Send + Sync,
{
    let amount = validate_amount(data.amount)?;
    let category = CategoryName::new(&data.category)?;

    let transaction = state.transaction_store.create(
        Transaction::build(user_id, data.kind, amount, category, data.date)
            .description(&data.description),
    )?;

    Ok((StatusCode::CREATED, Json(transaction)))
}
