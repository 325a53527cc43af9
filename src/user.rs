//! Code for creating the user table and fetching users from the database.
//!
//! Users are created lazily: the first authenticated request from an identity
//! the application has never seen inserts a row, and users are never deleted.

use std::fmt::Display;

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, auth::Identity};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better
/// compile time errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserId(i64);

impl UserId {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A user of the application.
///
/// The identity provider owns authentication; this row only maps its stable
/// subject ID to a local ID that transactions can reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserId,
    /// The stable subject ID assigned by the identity provider.
    pub external_id: String,
    /// The user's email address.
    pub email: String,
    /// The user's display name, if the identity provider supplied one.
    pub display_name: Option<String>,
    /// The user's phone number, if the identity provider supplied one.
    pub phone: Option<String>,
    /// When the user was first seen by the application.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Create the user table.
///
/// The phone column is unique but nullable. SQLite treats NULLs as distinct,
/// so users without a phone number do not collide.
///
/// # Errors
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                external_id TEXT NOT NULL UNIQUE,
                email TEXT NOT NULL UNIQUE,
                display_name TEXT,
                phone TEXT UNIQUE,
                created_at TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new user from a verified identity.
///
/// # Errors
/// This function will return a:
/// - [Error::Conflict] if a user with the same subject ID, email, or phone
///   number already exists (e.g. two concurrent first-sightings of the same
///   identity),
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_user(identity: &Identity, connection: &Connection) -> Result<User, Error> {
    let created_at = OffsetDateTime::now_utc();

    let user = connection
        .prepare(
            "INSERT INTO user (external_id, email, display_name, phone, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, external_id, email, display_name, phone, created_at",
        )?
        .query_row(
            (
                &identity.subject,
                &identity.email,
                &identity.display_name,
                &identity.phone,
                created_at,
            ),
            map_user_row,
        )?;

    Ok(user)
}

/// Get the user whose identity-provider subject ID equals `external_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if no user has the given subject ID,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_user_by_external_id(external_id: &str, connection: &Connection) -> Result<User, Error> {
    let user = connection
        .prepare(
            "SELECT id, external_id, email, display_name, phone, created_at
             FROM user WHERE external_id = :external_id",
        )?
        .query_row(&[(":external_id", external_id)], map_user_row)?;

    Ok(user)
}

/// Get the number of users in the database.
///
/// # Errors
/// Returns an [Error::SqlError] if an SQL related error occurred.
pub fn count_users(connection: &Connection) -> Result<i64, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM user;", [], |row| row.get(0))
        .map_err(|error| error.into())
}

fn map_user_row(row: &rusqlite::Row) -> Result<User, rusqlite::Error> {
    Ok(User {
        id: UserId::new(row.get(0)?),
        external_id: row.get(1)?,
        email: row.get(2)?,
        display_name: row.get(3)?,
        phone: row.get(4)?,
        created_at: row.get(5)?,
    })
}
