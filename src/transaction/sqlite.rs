//! Implements a SQLite backed transaction store.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row, params_from_iter, types::Value};

use crate::{
    Error,
    transaction::{
        models::{CategoryName, Transaction, TransactionBuilder, TransactionId},
        store::{SortOrder, TransactionChanges, TransactionQuery, TransactionStore},
    },
    user::UserId,
};

/// Stores transactions in a SQLite database.
///
/// Note that because a transaction belongs to a [User](crate::user::User),
/// the user table must be set up in the database as well.
#[derive(Debug, Clone)]
pub struct SqliteTransactionStore {
    connection: Arc<Mutex<Connection>>,
}

const TRANSACTION_COLUMNS: &str = "id, user_id, kind, amount, category, date, description";

impl SqliteTransactionStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    fn map_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
        let category: String = row.get(4)?;

        Ok(Transaction {
            id: row.get(0)?,
            user_id: UserId::new(row.get(1)?),
            kind: row.get(2)?,
            amount: row.get(3)?,
            category: CategoryName::new_unchecked(&category),
            date: row.get(5)?,
            description: row.get(6)?,
        })
    }
}

impl TransactionStore for SqliteTransactionStore {
    /// Store a new transaction in the database.
    ///
    /// # Errors
    /// Returns [Error::SqlError] if there is an SQL error.
    fn create(&mut self, builder: TransactionBuilder) -> Result<Transaction, Error> {
        let connection = self.connection.lock().unwrap();

        let transaction = connection
            .prepare(&format!(
                "INSERT INTO \"transaction\" (user_id, kind, amount, category, date, description)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 RETURNING {TRANSACTION_COLUMNS}"
            ))?
            .query_row(
                (
                    builder.user_id.as_i64(),
                    builder.kind,
                    builder.amount,
                    builder.category.as_str(),
                    builder.date,
                    builder.description,
                ),
                Self::map_row,
            )?;

        Ok(transaction)
    }

    /// Retrieve one of `user_id`'s transactions by its `id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a transaction owned by
    ///   `user_id`,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn get(&self, id: TransactionId, user_id: UserId) -> Result<Transaction, Error> {
        let transaction = self
            .connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" \
                 WHERE id = :id AND user_id = :user_id"
            ))?
            .query_row(
                &[(":id", &id), (":user_id", &user_id.as_i64())],
                Self::map_row,
            )?;

        Ok(transaction)
    }

    /// Query for `user_id`'s transactions in the database.
    ///
    /// # Errors
    /// This function will return a [Error::SqlError] if there is a SQL error.
    fn get_query(
        &self,
        user_id: UserId,
        query: TransactionQuery,
    ) -> Result<Vec<Transaction>, Error> {
        let mut query_string_parts =
            vec![format!("SELECT {TRANSACTION_COLUMNS} FROM \"transaction\"")];
        let mut where_clause_parts = vec!["user_id = ?1".to_string()];
        let mut query_parameters = vec![Value::Integer(user_id.as_i64())];

        if let Some(kind) = query.kind {
            where_clause_parts.push(format!("kind = ?{}", query_parameters.len() + 1));
            query_parameters.push(Value::Text(kind.as_str().to_owned()));
        }

        if let Some(category) = query.category {
            where_clause_parts.push(format!("category = ?{}", query_parameters.len() + 1));
            query_parameters.push(Value::Text(category.as_str().to_owned()));
        }

        if let Some(date_span) = query.date_span {
            // Dates are stored as ISO-8601 text, so the half-open interval
            // maps directly onto string comparisons.
            where_clause_parts.push(format!(
                "date >= ?{} AND date < ?{}",
                query_parameters.len() + 1,
                query_parameters.len() + 2,
            ));
            query_parameters.push(Value::Text(date_span.start.to_string()));
            query_parameters.push(Value::Text(date_span.end.to_string()));
        }

        query_string_parts.push(String::from("WHERE ") + &where_clause_parts.join(" AND "));

        // Sort by date, and then ID to keep transaction order stable after updates.
        match query.sort_date {
            Some(SortOrder::Ascending) => {
                query_string_parts.push("ORDER BY date ASC, id ASC".to_string())
            }
            Some(SortOrder::Descending) => {
                query_string_parts.push("ORDER BY date DESC, id DESC".to_string())
            }
            None => {}
        }

        let query_string = query_string_parts.join(" ");
        let params = params_from_iter(query_parameters.iter());

        self.connection
            .lock()
            .unwrap()
            .prepare(&query_string)?
            .query_map(params, Self::map_row)?
            .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
            .collect()
    }

    /// Apply `changes` to one of `user_id`'s transactions.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::UpdateMissingTransaction] if `id` does not refer to a
    ///   transaction owned by `user_id`,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn update(
        &mut self,
        id: TransactionId,
        user_id: UserId,
        changes: TransactionChanges,
    ) -> Result<Transaction, Error> {
        let mut set_clause_parts = vec![];
        let mut query_parameters: Vec<Value> = vec![];

        if let Some(kind) = changes.kind {
            set_clause_parts.push(format!("kind = ?{}", query_parameters.len() + 1));
            query_parameters.push(Value::Text(kind.as_str().to_owned()));
        }

        if let Some(amount) = changes.amount {
            set_clause_parts.push(format!("amount = ?{}", query_parameters.len() + 1));
            query_parameters.push(Value::Real(amount));
        }

        if let Some(category) = changes.category {
            set_clause_parts.push(format!("category = ?{}", query_parameters.len() + 1));
            query_parameters.push(Value::Text(category.as_str().to_owned()));
        }

        if let Some(date) = changes.date {
            set_clause_parts.push(format!("date = ?{}", query_parameters.len() + 1));
            query_parameters.push(Value::Text(date.to_string()));
        }

        if let Some(description) = changes.description {
            set_clause_parts.push(format!("description = ?{}", query_parameters.len() + 1));
            query_parameters.push(Value::Text(description));
        }

        if set_clause_parts.is_empty() {
            return Err(Error::EmptyUpdate);
        }

        let query_string = format!(
            "UPDATE \"transaction\" SET {} WHERE id = ?{} AND user_id = ?{} \
             RETURNING {TRANSACTION_COLUMNS}",
            set_clause_parts.join(", "),
            query_parameters.len() + 1,
            query_parameters.len() + 2,
        );
        query_parameters.push(Value::Integer(id));
        query_parameters.push(Value::Integer(user_id.as_i64()));

        self.connection
            .lock()
            .unwrap()
            .prepare(&query_string)?
            .query_row(params_from_iter(query_parameters.iter()), Self::map_row)
            .map_err(|error| match error {
                rusqlite::Error::QueryReturnedNoRows => Error::UpdateMissingTransaction,
                error => error.into(),
            })
    }

    /// Delete one of `user_id`'s transactions.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::DeleteMissingTransaction] if `id` does not refer to a
    ///   transaction owned by `user_id`,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn delete(&mut self, id: TransactionId, user_id: UserId) -> Result<(), Error> {
        let rows_affected = self.connection.lock().unwrap().execute(
            "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
            (id, user_id.as_i64()),
        )?;

        if rows_affected == 0 {
            return Err(Error::DeleteMissingTransaction);
        }

        Ok(())
    }
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                kind TEXT NOT NULL CHECK (kind IN ('income', 'expense')),
                amount REAL NOT NULL CHECK (amount > 0),
                category TEXT NOT NULL,
                date TEXT NOT NULL,
                description TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    // Ensure the sequence starts at 1
    connection.execute(
        "INSERT OR IGNORE INTO sqlite_sequence (name, seq) VALUES ('transaction', 0)",
        (),
    )?;

    // Add composite index used by the report queries.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);",
        (),
    )?;

    Ok(())
}
