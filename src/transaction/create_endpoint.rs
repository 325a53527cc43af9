//! Defines the endpoint for creating a new transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
    http::StatusCode,
};
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    transaction::{NewTransaction, Transaction, TransactionType, core::create_transaction},
    user::User,
};

/// The state needed to create a transaction.
#[derive(Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for creating a transaction.
///
/// The owner never appears here; it is stamped from the resolved identity.
#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    /// A short description of the transaction.
    pub title: String,
    /// The amount of money spent or earned.
    pub amount: f64,
    /// Whether the transaction is income or an expense.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// When the transaction happened.
    pub date: Date,
    /// The category the transaction belongs to.
    pub category: String,
}

/// A route handler for creating a new transaction, responds with the created
/// record.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<Transaction>), Error> {
    let connection = state.db_connection.lock().unwrap();

    let transaction = create_transaction(
        NewTransaction {
            title: request.title,
            amount: request.amount,
            transaction_type: request.transaction_type,
            date: request.date,
            category: request.category,
            user_id: user.id,
        },
        &connection,
    )?;

    Ok((StatusCode::CREATED, Json(transaction)))
}
