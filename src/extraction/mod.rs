//! Voice-assisted transaction entry: converts a free-text utterance into a
//! schema-validated transaction draft via a language model call.
//!
//! The draft is never persisted here; the client presents it to the user for
//! confirmation before creating a real transaction.

mod draft;
mod extract_endpoint;
mod provider;

pub use draft::{TransactionDraft, validate_extraction};
pub use extract_endpoint::extract_transaction_endpoint;
pub use provider::{ExtractedTransaction, GroqExtractor, TransactionExtractor};
