//! Defines the endpoint serving the windowed transaction summary.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Query, State},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    dashboard::{Summary, TypeFilter, WindowSelector, summarize},
    timezone::local_today,
    transaction::list_transactions,
    user::User,
};

/// The state needed to compute a transaction summary.
#[derive(Clone)]
pub struct SummaryState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for SummaryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The query parameters for the summary endpoint.
#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    /// The time window to aggregate over. Defaults to all-time.
    pub window: Option<WindowSelector>,
    /// An optional restriction to a single transaction type.
    #[serde(rename = "type")]
    pub type_filter: Option<TypeFilter>,
}

/// A route handler that aggregates the requesting user's transactions over a
/// time window, producing the totals and category rollups the charts need.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn get_summary_endpoint(
    State(state): State<SummaryState>,
    Extension(user): Extension<User>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<Summary>, Error> {
    let today = local_today(&state.local_timezone)?;

    let transactions = {
        let connection = state.db_connection.lock().unwrap();
        list_transactions(user.id, &connection)?
    };

    let window = query.window.unwrap_or(WindowSelector::default_selector());
    let type_filter = query.type_filter.unwrap_or(TypeFilter::All);

    Ok(Json(summarize(transactions, window, type_filter, today)))
}
