//! The core transaction model and its supporting types.

use std::fmt::Display;

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, user::UserId};

/// The ID of a transaction in the application database.
pub type TransactionId = i64;

/// Whether a transaction added money to the user's pocket or took it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money earned, e.g. salary.
    Income,
    /// Money spent, e.g. groceries.
    Expense,
}

impl TransactionKind {
    /// The kind as the lowercase string stored in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(FromSqlError::Other(
                format!("unknown transaction kind {other:?}").into(),
            )),
        }
    }
}

/// A transaction category, e.g. "groceries" or "rent".
///
/// Categories are free-form but normalized: leading and trailing whitespace
/// is stripped and the name is lowercased, so "Food" and " food " refer to
/// the same category once stored.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryName(String);

impl CategoryName {
    /// Normalize and validate a raw category name.
    ///
    /// # Errors
    /// Returns [Error::EmptyCategory] if the name is empty after trimming.
    pub fn new(raw_name: &str) -> Result<Self, Error> {
        let name = raw_name.trim().to_lowercase();

        if name.is_empty() {
            return Err(Error::EmptyCategory);
        }

        Ok(Self(name))
    }

    /// Wrap a category name without normalizing or validating it.
    ///
    /// The caller should ensure that `name` came from a trusted source such
    /// as the application database.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_owned())
    }

    /// The category name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The ID of the user that owns this transaction.
    pub user_id: UserId,
    /// Whether the transaction is an income or an expense.
    pub kind: TransactionKind,
    /// The amount of money spent or earned. Always greater than zero, the
    /// direction comes from `kind`.
    pub amount: f64,
    /// The normalized category the transaction belongs to.
    pub category: CategoryName,
    /// When the transaction happened.
    pub date: Date,
    /// A text description of what the transaction was for.
    pub description: String,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        user_id: UserId,
        kind: TransactionKind,
        amount: f64,
        category: CategoryName,
        date: Date,
    ) -> TransactionBuilder {
        TransactionBuilder {
            user_id,
            kind,
            amount,
            category,
            date,
            description: String::new(),
        }
    }
}

/// The details of a transaction that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionBuilder {
    /// The ID of the user that owns the transaction.
    pub user_id: UserId,
    /// Whether the transaction is an income or an expense.
    pub kind: TransactionKind,
    /// The amount of money spent or earned.
    pub amount: f64,
    /// The normalized category the transaction belongs to.
    pub category: CategoryName,
    /// When the transaction happened.
    pub date: Date,
    /// A text description of what the transaction was for. Defaults to the
    /// empty string.
    pub description: String,
}

impl TransactionBuilder {
    /// Set the description for the transaction.
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_owned();
        self
    }
}

/// Check that `amount` is a valid transaction amount.
///
/// # Errors
/// Returns [Error::NonPositiveAmount] for zero, negative and non-finite
/// values.
pub fn validate_amount(amount: f64) -> Result<f64, Error> {
    if amount.is_finite() && amount > 0.0 {
        Ok(amount)
    } else {
        Err(Error::NonPositiveAmount(amount))
    }
}



#[cfg(test)]
mod kind_tests {
    use crate::transaction::models::TransactionKind;

    #[test]
    fn serializes_as_lowercase() {
        assert_eq!(
            serde_json::to_string(&TransactionKind::Income).unwrap(),
            r#""income""#
        );
        assert_eq!(
            serde_json::from_str::<TransactionKind>(r#""expense""#).unwrap(),
            TransactionKind::Expense
        );
    }
}
