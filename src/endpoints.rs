//! The API endpoint URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/transactions/{transaction_id}',
//! use [format_endpoint].

/// The route to list and create transactions.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route to delete a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route for the windowed transaction summary that feeds the charts.
pub const SUMMARY: &str = "/api/summary";
/// The route for converting a voice transcript into a transaction draft.
///
/// The path is a historical artifact: the first version of the extraction flow
/// used Dialogflow, and the client keeps calling the same path.
pub const EXTRACT: &str = "/api/send-to-dialogflow";

/// Replace the `{...}` parameter in `endpoint_path` with `id`.
///
/// Assumes the path contains at most one parameter. If no parameter is found,
/// the original path is returned unchanged.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };
    let end = endpoint_path[start..]
        .find('}')
        .map(|offset| start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..start],
        id,
        &endpoint_path[end..]
    )
}
