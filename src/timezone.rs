//! Helpers for resolving "today" in the server's configured timezone.
//!
//! Time-window filtering works at local-midnight granularity, so the server
//! needs a single, explicit timezone policy: a canonical timezone name (e.g.
//! "Pacific/Auckland") supplied at startup.

use time::{Date, OffsetDateTime, UtcOffset};
use time_tz::{Offset, TimeZone};

use crate::Error;

/// Get the UTC offset for a canonical timezone name at the current instant.
pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}

/// The current calendar date in the given canonical timezone.
///
/// # Errors
/// Returns [Error::InvalidTimezone] if `canonical_timezone` is not a valid
/// canonical timezone name.
pub fn local_today(canonical_timezone: &str) -> Result<Date, Error> {
    let offset = get_local_offset(canonical_timezone)
        .ok_or_else(|| Error::InvalidTimezone(canonical_timezone.to_owned()))?;

    Ok(OffsetDateTime::now_utc().to_offset(offset).date())
}
