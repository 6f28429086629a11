//! Defines the transaction store trait, the repository seam between the
//! HTTP handlers and the storage engine.

use time::Date;

use crate::{
    Error,
    transaction::models::{
        CategoryName, Transaction, TransactionBuilder, TransactionId, TransactionKind,
    },
    user::UserId,
};

/// A half-open date interval `[start, end)`.
///
/// The start date is included and the end date is excluded, so a date on the
/// boundary between two adjacent spans belongs to exactly one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateSpan {
    /// The first date inside the span.
    pub start: Date,
    /// The first date after the span.
    pub end: Date,
}

impl DateSpan {
    /// Whether `date` falls inside the span.
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date < self.end
    }
}

/// The order to sort transactions in a [TransactionQuery].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Sort in order of increasing value.
    #[allow(dead_code)]
    Ascending,
    /// Sort in order of decreasing value.
    Descending,
}

/// Defines how transactions should be fetched from [TransactionStore::get_query].
///
/// All fields are optional restrictions; the query is always scoped to a
/// single owner via the `user_id` argument of the store methods.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TransactionQuery {
    /// Include transactions with `date` inside the half-open span.
    pub date_span: Option<DateSpan>,
    /// Include only transactions of this kind.
    pub kind: Option<TransactionKind>,
    /// Include only transactions in this category.
    pub category: Option<CategoryName>,
    /// Orders transactions by date in the order `sort_date`. None returns
    /// transactions in the order they are stored.
    pub sort_date: Option<SortOrder>,
}

/// The fields of a transaction that can be changed after creation.
///
/// All fields are optional so that clients can update any subset in a single
/// request.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TransactionChanges {
    /// Replace the transaction kind.
    pub kind: Option<TransactionKind>,
    /// Replace the amount.
    pub amount: Option<f64>,
    /// Replace the category.
    pub category: Option<CategoryName>,
    /// Replace the date.
    pub date: Option<Date>,
    /// Replace the description.
    pub description: Option<String>,
}

impl TransactionChanges {
    /// Whether no field is set.
    pub fn is_empty(&self) -> bool {
        self.kind.is_none()
            && self.amount.is_none()
            && self.category.is_none()
            && self.date.is_none()
            && self.description.is_none()
    }
}

/// Handles the storage and retrieval of transactions.
///
/// Every method takes the owner's [UserId] explicitly; implementations must
/// never return or touch another user's rows. Any storage engine satisfying
/// this contract is interchangeable.
pub trait TransactionStore {
    /// Store a new transaction.
    fn create(&mut self, builder: TransactionBuilder) -> Result<Transaction, Error>;

    /// Retrieve one of `user_id`'s transactions by its ID.
    fn get(&self, id: TransactionId, user_id: UserId) -> Result<Transaction, Error>;

    /// Retrieve `user_id`'s transactions in the way defined by `query`.
    fn get_query(&self, user_id: UserId, query: TransactionQuery)
    -> Result<Vec<Transaction>, Error>;

    /// Apply `changes` to one of `user_id`'s transactions and return the
    /// updated row.
    fn update(
        &mut self,
        id: TransactionId,
        user_id: UserId,
        changes: TransactionChanges,
    ) -> Result<Transaction, Error>;

    /// Delete one of `user_id`'s transactions.
    fn delete(&mut self, id: TransactionId, user_id: UserId) -> Result<(), Error>;
}
