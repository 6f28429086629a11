//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use time::Duration;

use crate::{
    Error,
    auth::{TOKEN_DURATION, TokenKeys},
    db::initialize,
    transaction::{SqliteTransactionStore, TransactionStore},
};

/// The state of the REST server.
///
/// The transaction store is a type parameter so that the report and
/// transaction handlers only depend on the [TransactionStore] contract, not
/// on SQLite.
#[derive(Clone)]
pub struct AppState<T>
where
    T: TransactionStore + Clone + Send + Sync,
{
    /// The keys used for signing and verifying bearer tokens.
    pub token_keys: TokenKeys,
    /// The duration for which issued tokens are valid.
    pub token_duration: Duration,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The database connection, shared with the stores.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The store for managing user [transactions](crate::transaction::Transaction).
    pub transaction_store: T,
}

impl<T> AppState<T>
where
    T: TransactionStore + Clone + Send + Sync,
{
    /// Create a new [AppState].
    ///
    /// `local_timezone` should be a valid, canonical timezone name, it is
    /// used to decide what "the current year" means for the monthly series
    /// report.
    pub fn new(
        token_secret: &str,
        local_timezone: &str,
        db_connection: Arc<Mutex<Connection>>,
        transaction_store: T,
    ) -> Self {
        Self {
            token_keys: TokenKeys::from_secret(token_secret),
            token_duration: TOKEN_DURATION,
            local_timezone: local_timezone.to_owned(),
            db_connection,
            transaction_store,
        }
    }
}

/// An alias for an [AppState] that uses SQLite for the backend.
pub type SqlAppState = AppState<SqliteTransactionStore>;

/// Creates an [AppState] instance that uses SQLite for the backend.
///
/// This function will modify the database by adding the tables for the
/// domain models.
///
/// # Errors
/// Returns an error if the database cannot be initialized.
pub fn create_app_state(
    db_connection: Connection,
    token_secret: &str,
    local_timezone: &str,
) -> Result<SqlAppState, Error> {
    initialize(&db_connection)?;

    let connection = Arc::new(Mutex::new(db_connection));
    let transaction_store = SqliteTransactionStore::new(connection.clone());

    Ok(AppState::new(
        token_secret,
        local_timezone,
        connection,
        transaction_store,
    ))
}
