// Date helpers for the countdown and calendar routes

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

use super::error::HandlerError;

/// Layout of calendar trigger timestamps, e.g. `January 13, 2018 at 06:00AM`
pub const CALENDAR_DATETIME_FORMAT: &str = "%B %d, %Y at %I:%M%p";

/// Layout of countdown targets, e.g. `2018-01-15`
pub const TARGET_DATE_FORMAT: &str = "%Y-%m-%d";

pub const WEDDING_DATE: NaiveDate = match NaiveDate::from_ymd_opt(2020, 10, 10) {
    Some(date) => date,
    None => panic!("invalid wedding date"),
};

/// Days from `from` to `to`, counting both ends
///
/// Partial days round down, so 06:00 on the 13th to midnight on the 15th is 2.
pub fn days_until(from: NaiveDateTime, to: NaiveDateTime) -> i64 {
    let delta = to - from;
    let whole = delta.num_days();
    let floored = if delta < TimeDelta::days(whole) {
        whole - 1
    } else {
        whole
    };
    floored + 1
}

pub fn parse_calendar_datetime(
    field: &'static str,
    value: &str,
) -> Result<NaiveDateTime, HandlerError> {
    NaiveDateTime::parse_from_str(value, CALENDAR_DATETIME_FORMAT).map_err(|source| {
        HandlerError::InvalidDate {
            field,
            value: value.to_string(),
            source,
        }
    })
}

/// Parse a countdown target; the result is midnight at the start of that day
pub fn parse_target_date(field: &'static str, value: &str) -> Result<NaiveDateTime, HandlerError> {
    NaiveDate::parse_from_str(value, TARGET_DATE_FORMAT)
        .map(|date| date.and_time(NaiveTime::MIN))
        .map_err(|source| HandlerError::InvalidDate {
            field,
            value: value.to_string(),
            source,
        })
}
