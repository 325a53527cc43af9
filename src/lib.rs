//! Pockit is a personal finance tracker served as a JSON HTTP API.
//!
//! Users authenticate with a bearer credential verified against an external
//! identity provider, record income and expense transactions, and fetch
//! time-windowed aggregates for charts. A voice-assisted entry flow turns a
//! free-text utterance into a schema-validated transaction draft via a language
//! model call.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod app_state;
mod auth;
mod dashboard;
mod database_id;
mod db;
mod endpoints;
mod extraction;
mod logging;
mod routing;
#[cfg(test)]
mod test_utils;
mod timezone;
mod transaction;
mod user;

pub use app_state::AppState;
pub use auth::{CredentialVerifier, FirebaseVerifier, Identity};
pub use db::initialize as initialize_db;
pub use extraction::{GroqExtractor, TransactionExtractor};
pub use logging::logging_middleware;
pub use routing::build_router;
pub use user::{User, UserId};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The request carried no bearer credential, or the credential was rejected
    /// by the identity provider.
    #[error("missing or invalid bearer credential")]
    Unauthenticated,

    /// The bearer credential was valid once but has expired.
    ///
    /// Kept distinct from [Error::Unauthenticated] so clients know to refresh
    /// their token rather than re-authenticate from scratch.
    #[error("the bearer credential has expired")]
    CredentialExpired,

    /// The requested resource exists but belongs to a different user.
    #[error("the resource belongs to another user")]
    Forbidden,

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The request payload failed validation.
    ///
    /// The message is safe to show to the client.
    #[error("invalid request: {0}")]
    Validation(String),

    /// Two concurrent first-sightings of the same identity raced on the unique
    /// constraint, or the identity clashes with an existing user's email or
    /// phone number.
    #[error("a user with this identity already exists")]
    Conflict,

    /// A call to an external provider (identity or extraction) failed.
    ///
    /// The detail string should only be logged on the server, never sent to
    /// the client.
    #[error("upstream provider call failed: {0}")]
    Upstream(String),

    /// The extraction provider returned output that failed schema validation.
    ///
    /// The detail string should only be logged on the server. Clients get a
    /// generic processing failure, never a partial draft.
    #[error("extraction output failed validation: {0}")]
    InvalidExtraction(String),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::Conflict,
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::Unauthenticated => {
                json_error(StatusCode::UNAUTHORIZED, "Unauthorized: Invalid token.")
            }
            Error::CredentialExpired => {
                json_error(StatusCode::UNAUTHORIZED, "Unauthorized: Token expired.")
            }
            Error::Forbidden => json_error(StatusCode::UNAUTHORIZED, "User not authorized"),
            Error::NotFound => json_error(StatusCode::NOT_FOUND, "Transaction not found"),
            Error::Validation(message) => json_error(StatusCode::BAD_REQUEST, &message),
            Error::Conflict => json_error(
                StatusCode::CONFLICT,
                "Conflict: User with this email or phone number already exists.",
            ),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                json_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred, check the server logs for more details.",
                )
            }
        }
    }
}

/// Build a JSON error response with the body shape `{"error": message}`.
pub(crate) fn json_error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
