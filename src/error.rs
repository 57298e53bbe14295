use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RemapError {
    #[error("Could not find {path:?}. Run this from your project root (the folder that contains /data)")]
    FileNotFound { path: PathBuf },

    #[error("Failed to access {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read route JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported JSON structure. Expected a list or an object with a 'stops' or 'route' list")]
    UnsupportedShape,

    #[error("Record {index} is not a JSON object")]
    RecordNotObject { index: usize },

    #[error("Failed to parse pretty datetime {value:?}: {reason}")]
    DateParse { value: String, reason: String },

    #[error("Pretty datetime must be a string, found {value}")]
    InvalidPrettyValue { value: Value },

    #[error("Expected exactly 2 unique dates in {field:?}, but found {found}: {dates:?}")]
    DateCountMismatch {
        field: String,
        found: usize,
        dates: Vec<NaiveDate>,
    },

    #[error("Pretty date {date} not found in date map keys: {keys:?}")]
    UnmappedDate {
        date: NaiveDate,
        keys: Vec<NaiveDate>,
    },

    #[error("Wall-clock time {datetime} cannot be placed in the schedule time zone")]
    UnrepresentableTime { datetime: NaiveDateTime },
}
