//! Shared stubs and fixtures for tests: a canned-identity credential verifier,
//! a canned-output extractor, and helpers for building app state and seeding
//! transactions.

use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::Connection;
use time::Date;

use crate::{
    AppState, Error,
    auth::{CredentialVerifier, Identity},
    extraction::{ExtractedTransaction, TransactionExtractor},
    transaction::{
        DEFAULT_CATEGORY, NewTransaction, Transaction, TransactionType, create_transaction,
    },
};

/// A bearer token the stub verifier resolves to [test_identity].
pub const VALID_TOKEN: &str = "valid-token";
/// A bearer token the stub verifier resolves to [other_identity].
pub const OTHER_TOKEN: &str = "other-token";
/// A bearer token the stub verifier rejects as expired.
pub const EXPIRED_TOKEN: &str = "expired-token";

pub fn test_identity() -> Identity {
    Identity {
        subject: "test-uid-1".to_owned(),
        email: "alice@example.com".to_owned(),
        display_name: Some("Alice".to_owned()),
        phone: None,
    }
}

pub fn other_identity() -> Identity {
    Identity {
        subject: "test-uid-2".to_owned(),
        email: "bob@example.com".to_owned(),
        display_name: Some("Bob".to_owned()),
        phone: None,
    }
}

/// A credential verifier with a fixed token-to-identity mapping.
pub struct StubVerifier;

#[async_trait]
impl CredentialVerifier for StubVerifier {
    async fn verify(&self, token: &str) -> Result<Identity, Error> {
        match token {
            VALID_TOKEN => Ok(test_identity()),
            OTHER_TOKEN => Ok(other_identity()),
            EXPIRED_TOKEN => Err(Error::CredentialExpired),
            _ => Err(Error::Unauthenticated),
        }
    }
}

/// An extractor that returns a canned extraction, or an upstream failure when
/// none is configured.
pub struct StubExtractor {
    pub extraction: Option<ExtractedTransaction>,
}

#[async_trait]
impl TransactionExtractor for StubExtractor {
    async fn extract(
        &self,
        _text: &str,
        _current_date: Date,
    ) -> Result<ExtractedTransaction, Error> {
        self.extraction
            .clone()
            .ok_or_else(|| Error::Upstream("stub extractor configured to fail".to_owned()))
    }
}

/// App state over an in-memory database with the stub verifier and a failing
/// stub extractor.
pub fn test_app_state() -> AppState {
    test_app_state_with_extraction(None)
}

/// App state over an in-memory database with the stub verifier and a canned
/// extraction result.
pub fn test_app_state_with_extraction(extraction: Option<ExtractedTransaction>) -> AppState {
    let connection =
        Connection::open_in_memory().expect("Could not create in-memory SQLite database");

    AppState::new(
        connection,
        Arc::new(StubVerifier),
        Arc::new(StubExtractor { extraction }),
        "Etc/UTC",
    )
    .expect("Could not create app state")
}

/// Insert an expense transaction with category [DEFAULT_CATEGORY] for the user the stub
/// verifier maps `token` to, creating the user if needed.
pub async fn seed_transaction(
    state: &AppState,
    token: &str,
    title: &str,
    amount: f64,
    date: Date,
) -> Transaction {
    let identity = StubVerifier
        .verify(token)
        .await
        .expect("seed_transaction needs a token the stub verifier accepts");

    let connection = state.db_connection.lock().unwrap();
    let user = crate::auth::resolve_user(&identity, &connection)
        .expect("Could not resolve seed user");

    create_transaction(
        NewTransaction {
            title: title.to_owned(),
            amount,
            transaction_type: TransactionType::Expense,
            date,
            category: DEFAULT_CATEGORY.to_owned(),
            user_id: user.id,
        },
        &connection,
    )
    .expect("Could not seed transaction")
}
