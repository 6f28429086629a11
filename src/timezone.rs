//! Resolving the server's configured timezone.
//!
//! The monthly series report defaults to "the current year", which depends
//! on where the server considers itself to be. The timezone is configured
//! explicitly (the `--timezone` flag, defaulting to UTC) rather than read
//! from the host so that deployments behave the same everywhere.

use time::{OffsetDateTime, UtcOffset};
use time_tz::{Offset, TimeZone};

use crate::Error;

/// Look up the UTC offset that `canonical_timezone` has right now.
pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}

/// The current calendar year in `canonical_timezone`.
///
/// # Errors
/// Returns [Error::InvalidTimezone] if the name is not a canonical timezone.
pub fn current_year(canonical_timezone: &str) -> Result<i32, Error> {
    get_local_offset(canonical_timezone)
        .map(|offset| OffsetDateTime::now_utc().to_offset(offset).year())
        .ok_or_else(|| Error::InvalidTimezone(canonical_timezone.to_owned()))
}
