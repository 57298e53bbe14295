use serde_json::Value;

use crate::{date_map::DateMap, document::Record, error::RemapError, schedule};

pub const ARRIVAL_ARRIVAL: &str = "Unix Arrival Arrival";
pub const ARRIVAL: &str = "Unix Arrival";
pub const ARRIVAL_DEPARTURE: &str = "Unix Arrival Departure";

/// The three epoch timestamps of a stop: earliest, primary and latest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpochFields {
    pub arrival_arrival: i64,
    pub arrival: i64,
    pub arrival_departure: i64,
}

/// How a record's epoch fields were rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    /// no pretty time on the record, left as is
    Skipped,
    /// all three fields were numeric and their gaps were kept
    OffsetsPreserved,
    /// all three fields set to the new primary time
    Collapsed,
}

impl EpochFields {
    /// all three fields at the same instant
    pub fn collapsed(epoch: i64) -> Self {
        Self {
            arrival_arrival: epoch,
            arrival: epoch,
            arrival_departure: epoch,
        }
    }

    /// Reads the fields from a record, or `None` if any of them is missing or
    /// not integer-like.
    pub fn read(record: &Record) -> Option<Self> {
        Some(Self {
            arrival_arrival: record.get(ARRIVAL_ARRIVAL).and_then(as_epoch)?,
            arrival: record.get(ARRIVAL).and_then(as_epoch)?,
            arrival_departure: record.get(ARRIVAL_DEPARTURE).and_then(as_epoch)?,
        })
    }

    /// The same gaps around a new primary time, or `None` if a gap or a new
    /// field does not fit in an `i64`.
    pub fn shifted_to(&self, arrival: i64) -> Option<Self> {
        let before = self.arrival.checked_sub(self.arrival_arrival)?;
        let after = self.arrival_departure.checked_sub(self.arrival)?;
        Some(Self {
            arrival_arrival: arrival.checked_sub(before)?,
            arrival,
            arrival_departure: arrival.checked_add(after)?,
        })
    }

    /// overwrites the three fields, keeping their position if already present
    pub fn write(&self, record: &mut Record) {
        record.insert(ARRIVAL_ARRIVAL.to_owned(), Value::from(self.arrival_arrival));
        record.insert(ARRIVAL.to_owned(), Value::from(self.arrival));
        record.insert(ARRIVAL_DEPARTURE.to_owned(), Value::from(self.arrival_departure));
    }
}

/// integers, floats (truncated), booleans and integer strings that fit in an
/// `i64`
fn as_epoch(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) if number.is_f64() => number.as_f64().and_then(float_epoch),
        Value::Number(number) => number.as_i64(),
        Value::Bool(flag) => Some(i64::from(*flag)),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn float_epoch(float: f64) -> Option<i64> {
    let whole = float.trunc();
    // i64::MAX as f64 rounds up to 2^63, which is already out of range
    (whole >= i64::MIN as f64 && whole < i64::MAX as f64).then_some(whole as i64)
}

/// Recomputes a record's epoch fields from its pretty time moved onto the
/// mapped target date.
pub fn convert_record(
    record: &mut Record,
    pretty_field: &str,
    date_map: &DateMap,
) -> Result<Conversion, RemapError> {
    let Some(local) = schedule::read_pretty(record, pretty_field)? else {
        return Ok(Conversion::Skipped);
    };
    let moved = schedule::on_date(local, date_map.target(local.date())?);
    let new_arrival = schedule::to_epoch(moved)?;

    let shifted = EpochFields::read(record).and_then(|old| old.shifted_to(new_arrival));
    let (fields, conversion) = match shifted {
        Some(fields) => (fields, Conversion::OffsetsPreserved),
        None => (EpochFields::collapsed(new_arrival), Conversion::Collapsed),
    };
    fields.write(record);

    log::debug!("{local} -> {moved} ({conversion:?}): {fields:?}");
    Ok(conversion)
}
