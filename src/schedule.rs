//! Pretty schedule times: parsing the naive `M/D/YYYY H:MM:SS` strings and
//! placing them in the schedule's time zone.
use chrono::{LocalResult, NaiveDate, NaiveDateTime, Offset, TimeDelta, TimeZone, Timelike};
use chrono_tz::{America::New_York, Tz};
use serde_json::Value;

use crate::{document::Record, error::RemapError};

/// all pretty times are wall-clock times in this zone
pub const SCHEDULE_TZ: Tz = New_York;

pub const PRETTY_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

pub fn parse_pretty(pretty: &str) -> Result<NaiveDateTime, RemapError> {
    let invalid = |reason: String| RemapError::DateParse {
        value: pretty.to_owned(),
        reason,
    };
    // chrono skips whitespace before numeric fields
    if pretty.starts_with(char::is_whitespace) || pretty.ends_with(char::is_whitespace) {
        return Err(invalid(String::from("leading or trailing whitespace")));
    }
    let parsed = NaiveDateTime::parse_from_str(pretty, PRETTY_FORMAT)
        .map_err(|error| invalid(error.to_string()))?;
    // second 60 is read as a leap second
    if parsed.nanosecond() >= 1_000_000_000 {
        return Err(invalid(String::from("second out of range")));
    }
    Ok(parsed)
}

/// Reads and parses the pretty field of a record. Records where the field is
/// missing or empty-ish (`null`, `""`, `0`, `false`) have no schedule time.
pub fn read_pretty(record: &Record, field: &str) -> Result<Option<NaiveDateTime>, RemapError> {
    match record.get(field) {
        None => Ok(None),
        Some(value) if is_empty(value) => Ok(None),
        Some(Value::String(pretty)) => parse_pretty(pretty).map(Some),
        Some(value) => Err(RemapError::InvalidPrettyValue {
            value: value.clone(),
        }),
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}

/// keeps the time of day of `local` but moves it onto `date`
pub fn on_date(local: NaiveDateTime, date: NaiveDate) -> NaiveDateTime {
    date.and_time(local.time())
}

/// Seconds since the Unix epoch of a wall-clock time in [`SCHEDULE_TZ`].
///
/// Times repeated by the autumn fall-back resolve to the earlier (daylight)
/// instant. Times skipped by the spring-forward jump are read with the offset
/// in force before the jump, so 2:30 lands on 3:30 daylight time.
pub fn to_epoch(local: NaiveDateTime) -> Result<i64, RemapError> {
    match SCHEDULE_TZ.from_local_datetime(&local) {
        LocalResult::Single(datetime) => Ok(datetime.timestamp()),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.timestamp()),
        LocalResult::None => {
            let offset = SCHEDULE_TZ
                .offset_from_local_datetime(&(local - TimeDelta::days(1)))
                .earliest()
                .ok_or(RemapError::UnrepresentableTime { datetime: local })?
                .fix()
                .local_minus_utc();
            let utc = local - TimeDelta::seconds(i64::from(offset));
            Ok(utc.and_utc().timestamp())
        }
    }
}
