use chrono::{NaiveDate, NaiveTime};
use crate::error::RosterError;

/// Longest display name accepted, in characters.
pub const MAX_DISPLAY_NAME_LEN: usize = 50;

/// Longest session place accepted, in characters.
pub const MAX_PLACE_LEN: usize = 100;

/// Trims and checks a participant display name, returning the trimmed form.
pub fn validate_display_name(name: &str) -> Result<&str, RosterError> {
    let name = name.trim();

    if name.is_empty() {
        return Err(RosterError::InvalidName("name cannot be empty".to_string()));
    }

    if name.chars().count() > MAX_DISPLAY_NAME_LEN {
        return Err(RosterError::InvalidName(format!(
            "name cannot be longer than {MAX_DISPLAY_NAME_LEN} characters"
        )));
    }

    if name.contains('\n') || name.contains('\r') {
        return Err(RosterError::InvalidName("name cannot contain line breaks".to_string()));
    }

    Ok(name)
}

/// Accepts `YYYY-MM-DD` only.
pub fn validate_session_date(value: &str) -> Result<NaiveDate, RosterError> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| RosterError::InvalidDate(value.to_string()))
}

/// Accepts 24-hour `HH:MM`.
pub fn validate_session_time(value: &str) -> Result<NaiveTime, RosterError> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| RosterError::InvalidTime(value.to_string()))
}

pub fn validate_session_place(value: &str) -> Result<&str, RosterError> {
    let value = value.trim();

    if value.is_empty() {
        return Err(RosterError::InvalidPlace("place cannot be empty".to_string()));
    }

    if value.chars().count() > MAX_PLACE_LEN {
        return Err(RosterError::InvalidPlace(format!(
            "place cannot be longer than {MAX_PLACE_LEN} characters"
        )));
    }

    Ok(value)
}

/// Parses a 1-based participant number as typed by the administrator.
///
/// Range checking against the roster happens later; this only rejects text
/// that is not a positive number.
pub fn parse_participant_index(value: &str, total: usize) -> Result<usize, RosterError> {
    match value.trim().trim_start_matches('#').parse::<usize>() {
        Ok(index) if index > 0 => Ok(index),
        _ => Err(RosterError::IndexOutOfRange { index: 0, total }),
    }
}
