//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{CredentialVerifier, Error, TransactionExtractor, db::initialize};

/// The state of the REST server.
#[derive(Clone)]
pub struct AppState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,

    /// The external identity provider used to verify bearer credentials.
    pub verifier: Arc<dyn CredentialVerifier>,

    /// The language model provider used for voice transaction entry.
    pub extractor: Arc<dyn TransactionExtractor>,

    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the
    /// domain models. `local_timezone` should be a valid, canonical timezone
    /// name, e.g. "Pacific/Auckland".
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        verifier: Arc<dyn CredentialVerifier>,
        extractor: Arc<dyn TransactionExtractor>,
        local_timezone: &str,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            db_connection: Arc::new(Mutex::new(db_connection)),
            verifier,
            extractor,
            local_timezone: local_timezone.to_owned(),
        })
    }
}
