//! Application router configuration with protected and unprotected route
//! definitions.

use axum::{
    Json, Router,
    extract::FromRef,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde_json::json;

use crate::{
    app_state::AppState,
    auth::{AuthState, auth_guard, post_log_in, register_user},
    endpoints,
    report::{get_category_breakdown, get_monthly_series, get_summary},
    transaction::{
        TransactionStore, create_transaction_endpoint, delete_transaction_endpoint,
        list_transactions_endpoint, update_transaction_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router<T>(state: AppState<T>) -> Router
where
    T: TransactionStore + Clone + Send + Sync + 'static,
{
    let unprotected_routes = Router::new()
        .route(endpoints::HEALTH, get(get_health))
        .route(endpoints::REGISTER, post(register_user::<T>))
        .route(endpoints::LOG_IN, post(post_log_in::<T>));

    let protected_routes = Router::new()
        .route(
            endpoints::TRANSACTIONS,
            post(create_transaction_endpoint::<T>).get(list_transactions_endpoint::<T>),
        )
        .route(
            endpoints::TRANSACTION,
            put(update_transaction_endpoint::<T>).delete(delete_transaction_endpoint::<T>),
        )
        .route(endpoints::SUMMARY, get(get_summary::<T>))
        .route(endpoints::CATEGORY_BREAKDOWN, get(get_category_breakdown::<T>))
        .route(endpoints::MONTHLY_SERIES, get(get_monthly_series::<T>))
        .layer(middleware::from_fn_with_state(
            AuthState::from_ref(&state),
            auth_guard,
        ));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

/// A route handler for liveness checks.
async fn get_health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// The fallback for requests that match no route.
async fn get_404_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": "the requested resource could not be found" })),
    )
        .into_response()
}
