//! Defines the endpoint for deleting a transaction.

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde_json::{Value, json};

use crate::{
    Error,
    app_state::AppState,
    transaction::{models::TransactionId, store::TransactionStore},
    user::UserId,
};

/// A route handler for deleting one of the caller's transactions.
///
/// Deleting another user's transaction answers 404, the same as a
/// transaction that does not exist.
pub async fn delete_transaction_endpoint<T>(
    State(mut state): State<AppState<T>>,
    Extension(user_id): Extension<UserId>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Json<Value>, Error>
where
    T: TransactionStore + Clone + Send + Sync,
{
    state.transaction_store.delete(transaction_id, user_id)?;

    Ok(Json(json!({ "message": "transaction deleted" })))
}

#[cfg(test)]
mod tests {
    use axum::{
        Extension,
        extract::{Path, State},
    };
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        app_state::{SqlAppState, create_app_state},
        transaction::{
            delete_endpoint::delete_transaction_endpoint,
            models::{CategoryName, Transaction, TransactionKind},
            store::TransactionStore,
        },
        user::UserId,
    };

    fn get_test_state_with_transaction(user_id: UserId) -> (SqlAppState, Transaction) {
        let conn = Connection::open_in_memory().unwrap();
        let mut state = create_app_state(conn, "notsoverysecret", "UTC").unwrap();

        let transaction = state
            .transaction_store
            .create(Transaction::build(
                user_id,
                TransactionKind::Expense,
                50.0,
                CategoryName::new_unchecked("groceries"),
                date!(2026 - 01 - 15),
            ))
            .unwrap();

        (state, transaction)
    }

    #[tokio::test]
    async fn deletes_the_transaction() {
        let user_id = UserId::new(1);
        let (state, transaction) = get_test_state_with_transaction(user_id);

        delete_transaction_endpoint(State(state.clone()), Extension(user_id), Path(transaction.id))
            .await
            .expect("Could not delete transaction");

        assert_eq!(
            state.transaction_store.get(transaction.id, user_id),
            Err(Error::NotFound)
        );
    }

    #[tokio::test]
    async fn deleting_a_missing_transaction_fails() {
        let user_id = UserId::new(1);
        let (state, transaction) = get_test_state_with_transaction(user_id);

        let result = delete_transaction_endpoint(
            State(state),
            Extension(user_id),
            Path(transaction.id + 999),
        )
        .await;

        assert!(matches!(result, Err(Error::DeleteMissingTransaction)));
    }

    #[tokio::test]
    async fn cannot_delete_another_users_transaction() {
        let owner = UserId::new(1);
        let (state, transaction) = get_test_state_with_transaction(owner);

        let result = delete_transaction_endpoint(
            State(state.clone()),
            Extension(UserId::new(2)),
            Path(transaction.id),
        )
        .await;

        assert!(matches!(result, Err(Error::DeleteMissingTransaction)));
        assert!(state.transaction_store.get(transaction.id, owner).is_ok());
    }
}
