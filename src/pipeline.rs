use std::{
    fmt, fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use serde_json::Value;
use tempfile::NamedTempFile;

use crate::{
    config::RemapConfig,
    date_map::{build_date_map, DateMap},
    document::RouteDocument,
    error::RemapError,
    record::{convert_record, Conversion},
};

/// What a successful run changed, printed once the file is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub path: PathBuf,
    pub pretty_field: String,
    pub date_map: DateMap,
    pub preserved: usize,
    pub collapsed: usize,
    pub skipped: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Done. Updated in-place: {}", self.path.display())?;
        writeln!(f, "Pretty field: {}", self.pretty_field)?;
        write!(f, "Mapped original dates -> target dates:")?;
        for (from, to) in self.date_map.entries() {
            write!(f, "\n  {from} -> {to}")?;
        }
        Ok(())
    }
}

/// Loads the route file at `path`, remaps every record onto the configured
/// target dates and writes it back. Nothing is written unless every record
/// converted.
pub fn run(config: &RemapConfig, path: &Path) -> Result<Summary, RemapError> {
    log::info!("Loading {}", path.display());
    let text = fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => RemapError::FileNotFound {
            path: path.to_owned(),
        },
        _ => RemapError::Io {
            path: path.to_owned(),
            source,
        },
    })?;

    let mut document = RouteDocument::try_from(serde_json::from_str::<Value>(&text)?)?;
    log::info!(
        "Found {} records in a {} document",
        document.records().len(),
        document.shape()
    );

    let date_map = build_date_map(
        document.records(),
        &config.pretty_field,
        config.day1,
        config.day2,
    )?;
    log::info!("Date map: {date_map}");

    let mut summary = Summary {
        path: path.to_owned(),
        pretty_field: config.pretty_field.clone(),
        date_map,
        preserved: 0,
        collapsed: 0,
        skipped: 0,
    };
    for record in document.records_mut() {
        match convert_record(record, &config.pretty_field, &date_map)? {
            Conversion::OffsetsPreserved => summary.preserved += 1,
            Conversion::Collapsed => summary.collapsed += 1,
            Conversion::Skipped => summary.skipped += 1,
        }
    }
    log::info!(
        "Converted records: {} with offsets preserved, {} collapsed, {} skipped",
        summary.preserved,
        summary.collapsed,
        summary.skipped
    );

    write_document(path, document)?;
    log::info!("Wrote {}", path.display());
    Ok(summary)
}

fn write_document(path: &Path, document: RouteDocument) -> Result<(), RemapError> {
    let text = serde_json::to_string_pretty(&Value::from(document))?;
    let io_error = |source| RemapError::Io {
        path: path.to_owned(),
        source,
    };
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(io_error)?;

    // written beside the route file and renamed over it, so a failed write
    // never leaves a truncated route file behind
    let mut staged = NamedTempFile::new_in(parent).map_err(io_error)?;
    staged.write_all(text.as_bytes()).map_err(io_error)?;
    staged.as_file().sync_all().map_err(io_error)?;
    staged
        .persist(path)
        .map_err(|persist| io_error(persist.error))?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::NaiveDate;
    use clap::Parser;
    use serde_json::json;
    use tempfile::TempDir;

    const PRETTY: &str = "Pretty Arrival EDT 2026";

    // 2027-03-27 23:58:00 and 2027-03-28 00:05:00 in New York
    const DAY1_2358: i64 = 1806206280;
    const DAY2_0005: i64 = 1806206700;

    fn config() -> RemapConfig {
        RemapConfig::try_parse_from(["route-remap", "--day1", "2027-03-27", "--day2", "2027-03-28"])
            .unwrap()
    }

    fn route_file(dir: &TempDir, value: &Value) -> PathBuf {
        let path = dir.path().join("data").join("route.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
        path
    }

    fn read(path: &Path) -> Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    fn easter_stops() -> Value {
        json!([
            {
                PRETTY: "4/4/2026 23:58:00",
                "Unix Arrival Arrival": 100,
                "Unix Arrival": 110,
                "Unix Arrival Departure": 130
            },
            {PRETTY: "4/5/2026 0:05:00"}
        ])
    }

    fn expected_stops() -> Value {
        json!([
            {
                PRETTY: "4/4/2026 23:58:00",
                "Unix Arrival Arrival": DAY1_2358 - 10,
                "Unix Arrival": DAY1_2358,
                "Unix Arrival Departure": DAY1_2358 + 20
            },
            {
                PRETTY: "4/5/2026 0:05:00",
                "Unix Arrival Arrival": DAY2_0005,
                "Unix Arrival": DAY2_0005,
                "Unix Arrival Departure": DAY2_0005
            }
        ])
    }

    #[test]
    fn test_end_to_end_stops_document() {
        let dir = TempDir::new().unwrap();
        let path = route_file(&dir, &json!({"stops": easter_stops()}));

        let summary = run(&config(), &path).unwrap();

        assert_eq!(read(&path), json!({"stops": expected_stops()}));
        assert_eq!((summary.preserved, summary.collapsed, summary.skipped), (1, 1, 0));
        assert_eq!(
            summary.date_map.entries(),
            [
                (
                    NaiveDate::from_ymd_opt(2026, 4, 4).unwrap(),
                    NaiveDate::from_ymd_opt(2027, 3, 27).unwrap()
                ),
                (
                    NaiveDate::from_ymd_opt(2026, 4, 5).unwrap(),
                    NaiveDate::from_ymd_opt(2027, 3, 28).unwrap()
                ),
            ]
        );
    }

    #[test]
    fn test_bare_and_route_documents_keep_shape() {
        let dir = TempDir::new().unwrap();

        let path = route_file(&dir, &easter_stops());
        run(&config(), &path).unwrap();
        assert_eq!(read(&path), expected_stops());

        let path = route_file(
            &dir,
            &json!({"name": "Sunrise service", "route": easter_stops(), "version": 2}),
        );
        run(&config(), &path).unwrap();
        let written = read(&path);
        assert_eq!(
            written,
            json!({"name": "Sunrise service", "route": expected_stops(), "version": 2})
        );
        let keys: Vec<&String> = written.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["name", "route", "version"]);
    }

    #[test]
    fn test_output_is_two_space_pretty_json_with_literal_unicode() {
        let dir = TempDir::new().unwrap();
        let mut stops = easter_stops();
        stops[1]["name"] = json!("Église Saint-Pierre");
        let path = route_file(&dir, &stops);

        run(&config(), &path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("[\n  {\n    \""));
        assert!(text.contains("Église Saint-Pierre"));
        assert!(!text.ends_with('\n'));
    }

    #[test]
    fn test_other_floats_survive_rewrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("route.json");
        let longitude = "-179.73504012806399";
        fs::write(
            &path,
            format!(
                r#"{{"stops": [{{"{PRETTY}": "4/4/2026 23:58:00", "lon": {longitude}}}, {{"{PRETTY}": "4/5/2026 0:05:00"}}]}}"#
            ),
        )
        .unwrap();

        run(&config(), &path).unwrap();

        let exact: f64 = longitude.parse().unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains(&format!("\"lon\": {exact}")));
        assert_eq!(read(&path)["stops"][0]["lon"].as_f64(), Some(exact));
        // no staging file left next to the route file
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data").join("route.json");
        let error = run(&config(), &path).unwrap_err();
        assert!(matches!(error, RemapError::FileNotFound { .. }));
        assert!(error.to_string().contains("project root"));
    }

    #[test]
    fn test_failures_leave_file_untouched() {
        let dir = TempDir::new().unwrap();
        let inputs = [
            json!({"legs": easter_stops()}),
            json!([{PRETTY: "4/4/2026 23:58:00"}]),
            json!([
                {PRETTY: "4/4/2026 23:58:00"},
                {PRETTY: "4/5/2026 0:05:00"},
                {PRETTY: "Easter morning"}
            ]),
        ];
        for input in inputs {
            let path = route_file(&dir, &input);
            let before = fs::read_to_string(&path).unwrap();
            assert!(run(&config(), &path).is_err());
            assert_eq!(fs::read_to_string(&path).unwrap(), before);
        }
    }

    #[test]
    fn test_invalid_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("route.json");
        fs::write(&path, "{\"stops\": [").unwrap();
        assert!(matches!(run(&config(), &path), Err(RemapError::Json(_))));
    }

    #[test]
    fn test_rerun_recomputes_from_pretty_field() {
        let dir = TempDir::new().unwrap();
        let path = route_file(&dir, &json!({"stops": easter_stops()}));
        run(&config(), &path).unwrap();
        run(&config(), &path).unwrap();

        // the pretty field is unchanged, so the second run recomputes the same
        // primary times and keeps the gaps from the first run
        assert_eq!(read(&path), json!({"stops": expected_stops()}));
    }

    #[test]
    fn test_summary_lines() {
        let dir = TempDir::new().unwrap();
        let path = route_file(&dir, &easter_stops());
        let summary = run(&config(), &path).unwrap();
        let text = summary.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], format!("Pretty field: {PRETTY}"));
        assert_eq!(
            lines[2..],
            [
                "Mapped original dates -> target dates:",
                "  2026-04-04 -> 2027-03-27",
                "  2026-04-05 -> 2027-03-28"
            ]
        );
    }
}
