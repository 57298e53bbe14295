use chrono::NaiveDate;
use clap::Parser;

/// route file rewritten in place, relative to the working directory
pub const ROUTE_FILE: &str = "data/route.json";

pub const DEFAULT_PRETTY_FIELD: &str = "Pretty Arrival EDT 2026";

/// update the Unix arrival fields in data/route.json from the pretty schedule
/// times, remapped onto two target dates
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct RemapConfig {
    /// name of the schedule field holding the source-of-truth times
    #[arg(long, default_value_t = String::from(DEFAULT_PRETTY_FIELD))]
    pub pretty_field: String,

    /// target date (YYYY-MM-DD) for the first date found in the schedule
    #[arg(long, default_value = "2027-03-27")]
    pub day1: NaiveDate,

    /// target date (YYYY-MM-DD) for the second date found in the schedule
    #[arg(long, default_value = "2027-03-28")]
    pub day2: NaiveDate,
}
