//! Conversions between calendar dates and the `DD-MM-YYYY` strings that key
//! schedule entries. Every date comparison in the crate goes through here.
use std::cmp::Ordering;

use chrono::NaiveDate;

use super::error::DateError;

pub const DATE_FORMAT: &str = "%d-%m-%Y";

pub fn encode(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn decode(value: &str) -> Result<NaiveDate, DateError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|source| DateError::InvalidDateFormat {
        value: value.to_owned(),
        source,
    })
}

pub fn compare(fst: &str, snd: &str) -> Result<Ordering, DateError> {
    Ok(decode(fst)?.cmp(&decode(snd)?))
}

/// Inclusive on both ends.
pub fn in_range(date: &str, start: &str, end: &str) -> Result<bool, DateError> {
    let date = decode(date)?;
    Ok(decode(start)? <= date && date <= decode(end)?)
}
