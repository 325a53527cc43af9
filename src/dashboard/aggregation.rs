//! Transaction aggregation for the dashboard charts.
//!
//! Filters a user's transactions by time window and type, then computes the
//! scalar totals and the per-category rollups the charts are drawn from.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    dashboard::window::WindowSelector,
    transaction::{Transaction, TransactionType},
};

/// An optional restriction of the aggregation to a single transaction type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeFilter {
    /// Keep both income and expense transactions.
    All,
    /// Keep only income transactions.
    Income,
    /// Keep only expense transactions.
    Expense,
}

impl TypeFilter {
    fn matches(self, transaction_type: TransactionType) -> bool {
        match self {
            Self::All => true,
            Self::Income => transaction_type == TransactionType::Income,
            Self::Expense => transaction_type == TransactionType::Expense,
        }
    }
}

/// The aggregated view of a filtered set of transactions.
///
/// Categories with no activity in the filtered set are omitted from the
/// rollups rather than reported as zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// The transactions that survived the window and type filters.
    pub transactions: Vec<Transaction>,
    /// The sum of amounts over income transactions in the filtered set.
    pub total_income: f64,
    /// The sum of amounts over expense transactions in the filtered set.
    pub total_expense: f64,
    /// Category to summed amount, over income transactions only.
    pub income_by_category: HashMap<String, f64>,
    /// Category to summed amount, over expense transactions only.
    pub expense_by_category: HashMap<String, f64>,
}

/// Filter `transactions` by time window and type, then aggregate.
///
/// The window's lower bound is computed relative to `today` at local-midnight
/// granularity. There is no upper bound, so future-dated transactions are
/// included. An empty filtered set yields zero totals and empty rollups, not
/// an error.
pub fn summarize(
    transactions: Vec<Transaction>,
    window: WindowSelector,
    type_filter: TypeFilter,
    today: Date,
) -> Summary {
    let lower_bound = window.lower_bound(today);

    let filtered: Vec<Transaction> = transactions
        .into_iter()
        .filter(|transaction| match lower_bound {
            Some(bound) => transaction.date >= bound,
            None => true,
        })
        .filter(|transaction| type_filter.matches(transaction.transaction_type))
        .collect();

    let mut total_income = 0.0;
    let mut total_expense = 0.0;
    let mut income_by_category = HashMap::new();
    let mut expense_by_category = HashMap::new();

    for transaction in &filtered {
        match transaction.transaction_type {
            TransactionType::Income => {
                total_income += transaction.amount;
                *income_by_category
                    .entry(transaction.category.clone())
                    .or_insert(0.0) += transaction.amount;
            }
            TransactionType::Expense => {
                total_expense += transaction.amount;
                *expense_by_category
                    .entry(transaction.category.clone())
                    .or_insert(0.0) += transaction.amount;
            }
        }
    }

    Summary {
        transactions: filtered,
        total_income,
        total_expense,
        income_by_category,
        expense_by_category,
    }
}
