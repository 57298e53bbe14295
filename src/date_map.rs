use std::fmt;

use chrono::NaiveDate;
use itertools::Itertools;

use crate::{document::Record, error::RemapError, schedule};

/// Two original schedule dates and the target dates they move to, kept in the
/// order the original dates were first seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateMap {
    entries: [(NaiveDate, NaiveDate); 2],
}

impl DateMap {
    pub fn get(&self, original: &NaiveDate) -> Option<NaiveDate> {
        self.entries
            .iter()
            .find(|(from, _)| from == original)
            .map(|(_, to)| *to)
    }

    /// like [`DateMap::get`], for dates that must be in the table
    pub fn target(&self, original: NaiveDate) -> Result<NaiveDate, RemapError> {
        self.get(&original).ok_or_else(|| RemapError::UnmappedDate {
            date: original,
            keys: self.keys().collect(),
        })
    }

    pub fn keys(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.entries.iter().map(|(from, _)| *from)
    }

    pub fn entries(&self) -> &[(NaiveDate, NaiveDate)] {
        &self.entries
    }
}

impl fmt::Display for DateMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs = self
            .entries
            .iter()
            .map(|(from, to)| format!("{from} -> {to}"))
            .join(", ");
        write!(f, "{{{pairs}}}")
    }
}

/// Collects the distinct pretty-field dates in encounter order and maps the
/// first onto `day1`, the second onto `day2`. Anything other than exactly two
/// distinct dates is an error.
pub fn build_date_map(
    records: &[Record],
    pretty_field: &str,
    day1: NaiveDate,
    day2: NaiveDate,
) -> Result<DateMap, RemapError> {
    let seen: Vec<NaiveDate> = records
        .iter()
        .map(|record| schedule::read_pretty(record, pretty_field))
        .filter_map_ok(|pretty| pretty.map(|datetime| datetime.date()))
        .process_results(|dates| dates.unique().collect::<Vec<_>>())?;

    match seen.as_slice() {
        [first, second] => Ok(DateMap {
            entries: [(*first, day1), (*second, day2)],
        }),
        _ => Err(RemapError::DateCountMismatch {
            field: pretty_field.to_owned(),
            found: seen.len(),
            dates: seen,
        }),
    }
}
