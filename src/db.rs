//! Database schema initialization.

use rusqlite::Connection;

use crate::{transaction::create_transaction_table, user::create_user_table};

/// Create the application tables if they do not already exist.
///
/// # Errors
/// Returns an error if a table cannot be created or if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    create_user_table(connection)?;
    create_transaction_table(connection)?;

    Ok(())
}
