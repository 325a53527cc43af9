//! The enumerated time windows used to filter transactions before aggregation.

use serde::Deserialize;
use time::{Date, Duration, Month};

/// The choice of time range used to filter transactions before aggregation.
///
/// Windows have a lower bound only: future-dated transactions are always
/// included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum WindowSelector {
    /// No lower bound.
    #[serde(rename = "all-time")]
    AllTime,
    /// From the first calendar day of the current year.
    #[serde(rename = "this-year")]
    ThisYear,
    /// From the first calendar day of the current month.
    #[serde(rename = "this-month")]
    ThisMonth,
    /// The inclusive seven day window ending today.
    #[serde(rename = "last-7-days")]
    Last7Days,
}

impl WindowSelector {
    /// The window used when a request does not name one.
    pub fn default_selector() -> Self {
        Self::AllTime
    }

    /// The first date inside the window, at local-midnight granularity, or
    /// `None` when the window is unbounded.
    pub fn lower_bound(self, today: Date) -> Option<Date> {
        match self {
            Self::AllTime => None,
            Self::ThisYear => {
                Some(Date::from_calendar_date(today.year(), Month::January, 1).unwrap())
            }
            Self::ThisMonth => Some(today.replace_day(1).unwrap()),
            // Six days back plus today makes an inclusive seven day window.
            Self::Last7Days => Some(today - Duration::days(6)),
        }
    }
}
