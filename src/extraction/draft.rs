//! Validation of extraction output into a user-confirmable transaction draft.

use serde::Serialize;
use time::Date;

use crate::{
    Error,
    extraction::provider::ExtractedTransaction,
    transaction::{TransactionType, is_legal_category},
};

/// An unsaved, user-confirmable transaction proposal.
///
/// Unlike the provider's raw output, a draft always has a date and carries the
/// verbatim input text for audit and display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDraft {
    /// Whether the utterance described income or an expense.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// The amount mentioned in the utterance.
    pub amount: f64,
    /// The inferred category, guaranteed legal for the type.
    pub category: String,
    /// The store or person mentioned, if any.
    pub vendor: Option<String>,
    /// The date named in the utterance, or the current date if none was.
    pub date: Date,
    /// The verbatim input the draft was extracted from.
    pub original_text: String,
}

/// Check an extraction against the schema contract and build the draft.
///
/// This is all-or-nothing: a single violated rule rejects the whole
/// extraction, never a partial or best-effort draft.
///
/// # Errors
/// Returns an [Error::InvalidExtraction] if the amount is not a finite
/// non-negative number or the category falls outside the legal set for the
/// extracted type.
pub fn validate_extraction(
    extraction: ExtractedTransaction,
    current_date: Date,
    original_text: &str,
) -> Result<TransactionDraft, Error> {
    if !extraction.amount.is_finite() || extraction.amount < 0.0 {
        return Err(Error::InvalidExtraction(format!(
            "amount {} is not a non-negative number",
            extraction.amount
        )));
    }

    if !is_legal_category(extraction.transaction_type, &extraction.category) {
        return Err(Error::InvalidExtraction(format!(
            "category '{}' is outside the legal set for {} transactions",
            extraction.category, extraction.transaction_type
        )));
    }

    Ok(TransactionDraft {
        transaction_type: extraction.transaction_type,
        amount: extraction.amount,
        category: extraction.category,
        vendor: extraction.vendor,
        date: extraction.date.unwrap_or(current_date),
        original_text: original_text.to_owned(),
    })
}
