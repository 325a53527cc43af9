//! Defines the core data model and database queries for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    database_id::TransactionId,
    transaction::category::categories_for,
    user::UserId,
};

// ============================================================================
// MODELS
// ============================================================================

/// Whether a transaction records money earned or money spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money earned, e.g. salary or a gift.
    Income,
    /// Money spent.
    Expense,
}

impl TransactionType {
    /// The string stored in the database and sent over the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(Error::Validation(format!(
                "'{other}' is not a valid transaction type"
            ))),
        }
    }
}

/// An income or expense recorded by a user.
///
/// Transactions are immutable: there is no update operation, only create and
/// delete. Every transaction belongs to exactly one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// A short description of the transaction, e.g. "Groceries".
    pub title: String,
    /// The amount of money spent or earned. Always non-negative; the type
    /// carries the direction.
    pub amount: f64,
    /// Whether the transaction is income or an expense.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// When the transaction happened.
    pub date: Date,
    /// The category the transaction belongs to, drawn from the fixed set for
    /// its type.
    pub category: String,
    /// The ID of the user who owns the transaction.
    pub user_id: UserId,
    /// When the transaction was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// The fields needed to create a [Transaction].
///
/// The owner is stamped from the resolved identity by the endpoint, never
/// taken from the request body.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// A short description of the transaction.
    pub title: String,
    /// The amount of money spent or earned.
    pub amount: f64,
    /// Whether the transaction is income or an expense.
    pub transaction_type: TransactionType,
    /// When the transaction happened. Future dates are allowed.
    pub date: Date,
    /// The category the transaction belongs to.
    pub category: String,
    /// The ID of the user who will own the transaction.
    pub user_id: UserId,
}

impl NewTransaction {
    /// Check the fields against the data model's invariants.
    ///
    /// # Errors
    /// Returns an [Error::Validation] describing the first violated rule.
    pub fn validate(&self) -> Result<(), Error> {
        if self.title.trim().is_empty() {
            return Err(Error::Validation("title must not be empty".to_owned()));
        }

        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(Error::Validation(
                "amount must be a non-negative number".to_owned(),
            ));
        }

        if !categories_for(self.transaction_type).contains(&self.category.as_str()) {
            return Err(Error::Validation(format!(
                "'{}' is not a valid category for {} transactions",
                self.category, self.transaction_type
            )));
        }

        Ok(())
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                amount REAL NOT NULL,
                type TEXT NOT NULL,
                date TEXT NOT NULL,
                category TEXT NOT NULL,
                user_id INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id)
                )",
        (),
    )?;

    Ok(())
}

/// Validate and insert a new transaction.
///
/// Calling this twice with identical fields creates two distinct records;
/// idempotency is deliberately not provided.
///
/// # Errors
/// This function will return a:
/// - [Error::Validation] if the fields violate the data model's invariants,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    new_transaction.validate()?;

    let created_at = OffsetDateTime::now_utc();

    let transaction = connection
        .prepare(
            "INSERT INTO \"transaction\" (title, amount, type, date, category, user_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING id, title, amount, type, date, category, user_id, created_at",
        )?
        .query_row(
            (
                &new_transaction.title,
                new_transaction.amount,
                new_transaction.transaction_type.as_str(),
                new_transaction.date,
                &new_transaction.category,
                new_transaction.user_id.as_i64(),
                created_at,
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve a transaction from the database by its `id`.
///
/// Callers that act on behalf of a user must check ownership before using the
/// result.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "SELECT id, title, amount, type, date, category, user_id, created_at
             FROM \"transaction\" WHERE id = :id",
        )?
        .query_row(&[(":id", &id)], map_transaction_row)?;

    Ok(transaction)
}

/// Get all transactions owned by `user_id`, newest-dated first.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is some SQL error.
pub fn list_transactions(user_id: UserId, connection: &Connection) -> Result<Vec<Transaction>, Error> {
    let transactions = connection
        .prepare(
            "SELECT id, title, amount, type, date, category, user_id, created_at
             FROM \"transaction\"
             WHERE user_id = :user_id
             ORDER BY date DESC, id DESC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_transaction_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(transactions)
}

type RowsAffected = usize;

/// Delete a transaction by its `id`.
///
/// Returns the number of rows affected: zero means the transaction did not
/// exist.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is some SQL error.
pub fn delete_transaction(
    id: TransactionId,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    connection
        .execute("DELETE FROM \"transaction\" WHERE id = :id", &[(":id", &id)])
        .map_err(|error| error.into())
}

fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let raw_type: String = row.get(3)?;
    let transaction_type = raw_type.parse().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            format!("invalid transaction type '{raw_type}'").into(),
        )
    })?;

    Ok(Transaction {
        id: row.get(0)?,
        title: row.get(1)?,
        amount: row.get(2)?,
        transaction_type,
        date: row.get(4)?,
        category: row.get(5)?,
        user_id: UserId::new(row.get(6)?),
        created_at: row.get(7)?,
    })
}
