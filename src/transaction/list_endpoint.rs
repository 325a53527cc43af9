//! Defines the endpoint for listing the requesting user's transactions.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    transaction::{Transaction, list_transactions},
    user::User,
};

/// The state needed to list transactions.
#[derive(Clone)]
pub struct ListTransactionsState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListTransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that returns the requesting user's transactions,
/// newest-dated first.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn get_transactions_endpoint(
    State(state): State<ListTransactionsState>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let connection = state.db_connection.lock().unwrap();
    let transactions = list_transactions(user.id, &connection)?;

    Ok(Json(transactions))
}

#[cfg(test)]
mod list_endpoint_tests {
    use axum_test::TestServer;
    use time::macros::date;

    use crate::{
        build_router, endpoints,
        test_utils::{OTHER_TOKEN, VALID_TOKEN, seed_transaction, test_app_state},
        transaction::Transaction,
    };

    #[tokio::test]
    async fn list_requires_authentication() {
        let server = TestServer::new(build_router(test_app_state()));

        server
            .get(endpoints::TRANSACTIONS)
            .await
            .assert_status_unauthorized();
    }

    #[tokio::test]
    async fn list_returns_only_the_requesters_transactions() {
        let state = test_app_state();
        let server = TestServer::new(build_router(state.clone()));
        seed_transaction(&state, VALID_TOKEN, "Groceries", 25.0, date!(2025 - 06 - 14)).await;
        seed_transaction(&state, OTHER_TOKEN, "Rent", 800.0, date!(2025 - 06 - 01)).await;

        let response = server
            .get(endpoints::TRANSACTIONS)
            .authorization_bearer(VALID_TOKEN)
            .await;

        response.assert_status_ok();
        let transactions: Vec<Transaction> = response.json();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].title, "Groceries");
    }

    #[tokio::test]
    async fn list_orders_by_date_descending() {
        let state = test_app_state();
        let server = TestServer::new(build_router(state.clone()));
        seed_transaction(&state, VALID_TOKEN, "Oldest", 1.0, date!(2025 - 01 - 01)).await;
        seed_transaction(&state, VALID_TOKEN, "Newest", 1.0, date!(2025 - 06 - 01)).await;
        seed_transaction(&state, VALID_TOKEN, "Middle", 1.0, date!(2025 - 03 - 01)).await;

        let response = server
            .get(endpoints::TRANSACTIONS)
            .authorization_bearer(VALID_TOKEN)
            .await;

        let titles: Vec<String> = response
            .json::<Vec<Transaction>>()
            .into_iter()
            .map(|transaction| transaction.title)
            .collect();
        assert_eq!(titles, vec!["Newest", "Middle", "Oldest"]);
    }

    #[tokio::test]
    async fn empty_list_is_ok_not_an_error() {
        let server = TestServer::new(build_router(test_app_state()));

        let response = server
            .get(endpoints::TRANSACTIONS)
            .authorization_bearer(VALID_TOKEN)
            .await;

        response.assert_status_ok();
        assert!(response.json::<Vec<Transaction>>().is_empty());
    }
}
