//! Transactions: the domain model, fixed category sets, database queries, and
//! the list/create/delete endpoints.

pub mod category;
mod core;
mod create_endpoint;
mod delete_endpoint;
mod list_endpoint;

pub use category::{DEFAULT_CATEGORY, categories_for, is_legal_category};
pub use core::{
    NewTransaction, Transaction, TransactionType, create_transaction, create_transaction_table,
    list_transactions,
};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use list_endpoint::get_transactions_endpoint;
