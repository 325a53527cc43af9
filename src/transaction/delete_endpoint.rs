//! Defines the endpoint for deleting a transaction, gated on ownership.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State},
};
use rusqlite::Connection;
use serde_json::{Value, json};

use crate::{
    AppState, Error,
    database_id::TransactionId,
    transaction::core::{delete_transaction, get_transaction},
    user::User,
};

/// The state needed to delete a transaction.
#[derive(Clone)]
pub struct DeleteTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting a transaction, responds with a confirmation
/// message.
///
/// A missing transaction is [Error::NotFound]; one owned by a different user is
/// [Error::Forbidden] and is left untouched.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    Extension(user): Extension<User>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Json<Value>, Error> {
    let connection = state.db_connection.lock().unwrap();

    let transaction = get_transaction(transaction_id, &connection)?;

    if transaction.user_id != user.id {
        tracing::warn!(
            "User {} attempted to delete transaction {transaction_id} owned by user {}",
            user.id,
            transaction.user_id
        );
        return Err(Error::Forbidden);
    }

    delete_transaction(transaction_id, &connection)?;

    Ok(Json(json!({ "msg": "Transaction removed" })))
}

#[cfg(test)]
mod delete_endpoint_tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use time::macros::date;

    use crate::{
        build_router,
        endpoints::{self, format_endpoint},
        test_utils::{OTHER_TOKEN, VALID_TOKEN, seed_transaction, test_app_state},
        transaction::Transaction,
    };

    #[tokio::test]
    async fn delete_requires_authentication() {
        let server = TestServer::new(build_router(test_app_state()));

        server
            .delete(&format_endpoint(endpoints::TRANSACTION, 1))
            .await
            .assert_status_unauthorized();
    }

    #[tokio::test]
    async fn owner_can_delete_their_transaction() {
        let state = test_app_state();
        let server = TestServer::new(build_router(state.clone()));
        let transaction =
            seed_transaction(&state, VALID_TOKEN, "Groceries", 25.0, date!(2025 - 06 - 14)).await;

        let response = server
            .delete(&format_endpoint(endpoints::TRANSACTION, transaction.id))
            .authorization_bearer(VALID_TOKEN)
            .await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["msg"], "Transaction removed");

        server
            .get(endpoints::TRANSACTIONS)
            .authorization_bearer(VALID_TOKEN)
            .await
            .assert_json(&serde_json::json!([]));
    }

    #[tokio::test]
    async fn deleting_anothers_transaction_is_rejected_and_the_record_survives() {
        let state = test_app_state();
        let server = TestServer::new(build_router(state.clone()));
        let transaction =
            seed_transaction(&state, VALID_TOKEN, "Groceries", 25.0, date!(2025 - 06 - 14)).await;

        let response = server
            .delete(&format_endpoint(endpoints::TRANSACTION, transaction.id))
            .authorization_bearer(OTHER_TOKEN)
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "User not authorized");

        // The record must still exist for its owner.
        let remaining: Vec<Transaction> = server
            .get(endpoints::TRANSACTIONS)
            .authorization_bearer(VALID_TOKEN)
            .await
            .json();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, transaction.id);
    }

    #[tokio::test]
    async fn deleting_nonexistent_transaction_is_not_found() {
        let server = TestServer::new(build_router(test_app_state()));

        let response = server
            .delete(&format_endpoint(endpoints::TRANSACTION, 999))
            .authorization_bearer(VALID_TOKEN)
            .await;

        response.assert_status_not_found();
    }
}
