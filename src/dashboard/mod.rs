//! The aggregation engine behind the dashboard charts: time-window filtering,
//! scalar totals, and per-category rollups.

mod aggregation;
mod summary_endpoint;
mod window;

pub use aggregation::{Summary, TypeFilter, summarize};
pub use summary_endpoint::get_summary_endpoint;
pub use window::WindowSelector;
