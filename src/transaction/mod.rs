//! Everything to do with recording and retrieving transactions: the core
//! model, the store trait and its SQLite implementation, and the CRUD
//! endpoints.

mod create_endpoint;
mod delete_endpoint;
mod list_endpoint;
mod models;
mod sqlite;
mod store;
mod update_endpoint;

pub use create_endpoint::{CreateTransactionData, create_transaction_endpoint};
pub use delete_endpoint::delete_transaction_endpoint;
pub use list_endpoint::{TransactionListQuery, list_transactions_endpoint};
pub use models::{
    CategoryName, Transaction, TransactionBuilder, TransactionId, TransactionKind, validate_amount,
};
pub use sqlite::{SqliteTransactionStore, create_transaction_table};
pub use store::{
    DateSpan, SortOrder, TransactionChanges, TransactionQuery, TransactionStore,
};
pub use update_endpoint::{UpdateTransactionData, update_transaction_endpoint};
