//! The fixed category sets for transactions.
//!
//! The sets are not persisted; they are the legal category domain for both
//! manual entry and extraction output, conditioned on the transaction type.

use crate::transaction::TransactionType;

/// The legal categories for expense transactions.
pub const EXPENSE_CATEGORIES: [&str; 7] = [
    "Food",
    "Transport",
    "Utilities",
    "Rent",
    "Shopping",
    "Entertainment",
    "Other",
];

/// The legal categories for income transactions.
pub const INCOME_CATEGORIES: [&str; 5] = ["Salary", "Bonus", "Gift", "Investment", "Other"];

/// The fallback category when no specific category can be inferred.
pub const DEFAULT_CATEGORY: &str = "Other";

/// The legal category set for a transaction type.
pub fn categories_for(transaction_type: TransactionType) -> &'static [&'static str] {
    match transaction_type {
        TransactionType::Expense => &EXPENSE_CATEGORIES,
        TransactionType::Income => &INCOME_CATEGORIES,
    }
}

/// Whether `category` is inside the legal set for `transaction_type`.
pub fn is_legal_category(transaction_type: TransactionType, category: &str) -> bool {
    categories_for(transaction_type).contains(&category)
}
