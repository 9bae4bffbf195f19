//! Local input checks, run before any backend contact.

use crate::Error;

/// Checks an identifier that is interpolated into a resource path and
/// returns it trimmed.
pub(crate) fn identifier<'a>(field: &'static str, value: &'a str) -> Result<&'a str, Error> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid_input(format!("{field} must not be empty")));
    }
    if trimmed.contains('/') {
        return Err(Error::invalid_input(format!("{field} must not contain '/': {trimmed:?}")));
    }
    Ok(trimmed)
}

/// Checks a requested grant duration.
pub(crate) fn duration_secs(seconds: i64) -> Result<i64, Error> {
    if seconds <= 0 {
        return Err(Error::invalid_input(format!(
            "duration must be a positive number of seconds, got {seconds}"
        )));
    }
    Ok(seconds)
}
