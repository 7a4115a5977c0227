#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CSV ingestion for the accident dashboard.
//!
//! Reads a bounded prefix of the accident CSV, normalizes `Start_Time`,
//! and attaches the derived dashboard fields to every row. The
//! [`AccidentLoader`] memoizes loaded tables by `(path, row_limit)`.

pub mod cache;
mod derive;
pub mod parsing;

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use accident_dashboard_accident_models::{AccidentRecord, RawAccident};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

pub use cache::{AccidentLoader, LoadKey};

/// Number of data rows read when no limit is configured.
pub const DEFAULT_ROW_LIMIT: usize = 100_000;

/// Errors that can occur while loading the accident table.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The source file could not be opened or read.
    #[error("I/O error reading {}: {source}", .path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// CSV parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is not present in the header row.
    #[error("Missing required column '{0}'")]
    MissingColumn(&'static str),

    /// A `Start_Time` value could not be parsed.
    #[error("Unparseable Start_Time '{value}' on row {row}")]
    Timestamp {
        /// 1-based data row number (header excluded).
        row: usize,
        /// The offending cell.
        value: String,
    },
}

/// What to do with a row whose `Start_Time` cannot be parsed.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TimestampPolicy {
    /// Abort the whole load.
    #[default]
    Fail,
    /// Drop the row and log a warning.
    Skip,
}

/// Options controlling a single load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Maximum number of data rows to read from the file.
    pub row_limit: usize,
    /// Policy for unparseable timestamps.
    pub timestamp_policy: TimestampPolicy,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            row_limit: DEFAULT_ROW_LIMIT,
            timestamp_policy: TimestampPolicy::default(),
        }
    }
}

/// The loaded accident rows with their derived fields.
///
/// Read-only after construction; shared between renders behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct AccidentTable {
    records: Vec<AccidentRecord>,
    source: Option<PathBuf>,
    row_limit: usize,
    skipped_rows: usize,
}

impl AccidentTable {
    /// Builds a table directly from records. Mostly useful for tests and
    /// callers that already hold parsed rows.
    #[must_use]
    pub const fn from_records(records: Vec<AccidentRecord>) -> Self {
        Self {
            records,
            source: None,
            row_limit: 0,
            skipped_rows: 0,
        }
    }

    /// All rows, in file order.
    #[must_use]
    pub fn records(&self) -> &[AccidentRecord] {
        &self.records
    }

    /// Number of rows in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The file this table was read from, if any.
    #[must_use]
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// The row limit the table was loaded with.
    #[must_use]
    pub const fn row_limit(&self) -> usize {
        self.row_limit
    }

    /// Rows dropped under [`TimestampPolicy::Skip`].
    #[must_use]
    pub const fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }
}

/// Header positions of the columns the dashboard reads.
struct ColumnIndex {
    id: Option<usize>,
    start_time: usize,
    severity: usize,
    weather_condition: usize,
    amenity: usize,
    start_lat: usize,
    start_lng: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, LoadError> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let require = |name: &'static str| find(name).ok_or(LoadError::MissingColumn(name));

        Ok(Self {
            id: find("ID"),
            start_time: require("Start_Time")?,
            severity: require("Severity")?,
            weather_condition: require("Weather_Condition")?,
            amenity: require("Amenity")?,
            start_lat: require("Start_Lat")?,
            start_lng: require("Start_Lng")?,
        })
    }
}

/// Opens `path` and reads it with [`read_accidents`].
///
/// # Errors
///
/// Returns [`LoadError`] if the file cannot be opened, the CSV is malformed,
/// a required column is missing, or a timestamp fails under
/// [`TimestampPolicy::Fail`].
pub fn load_accidents(path: &Path, options: &LoadOptions) -> Result<AccidentTable, LoadError> {
    log::info!(
        "Loading accidents from {} (row limit {})",
        path.display(),
        options.row_limit
    );

    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut table = read_accidents(file, options)?;
    table.source = Some(path.to_path_buf());

    log::info!(
        "Loaded {} accidents from {} ({} skipped)",
        table.len(),
        path.display(),
        table.skipped_rows
    );

    Ok(table)
}

/// Reads at most `options.row_limit` data rows of accident CSV from
/// `reader` and derives the dashboard fields.
///
/// # Errors
///
/// Returns [`LoadError`] if the CSV is malformed, a required column is
/// missing, or a timestamp fails under [`TimestampPolicy::Fail`].
pub fn read_accidents<R: Read>(reader: R, options: &LoadOptions) -> Result<AccidentTable, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let columns = ColumnIndex::from_headers(reader.headers()?)?;

    let mut rows: Vec<RawAccident> = Vec::new();
    let mut skipped_rows = 0;

    for (i, result) in reader.records().take(options.row_limit).enumerate() {
        let record = result?;
        let row = i + 1;
        let cell = |idx: usize| record.get(idx).unwrap_or("");

        let raw_time = cell(columns.start_time);
        let Some(start_time) = parsing::parse_start_time(raw_time) else {
            match options.timestamp_policy {
                TimestampPolicy::Fail => {
                    return Err(LoadError::Timestamp {
                        row,
                        value: raw_time.to_string(),
                    });
                }
                TimestampPolicy::Skip => {
                    log::warn!("Skipping row {row}: unparseable Start_Time '{raw_time}'");
                    skipped_rows += 1;
                    continue;
                }
            }
        };

        rows.push(RawAccident {
            id: columns.id.and_then(|idx| parsing::non_empty(cell(idx))),
            severity: parsing::parse_severity(cell(columns.severity)),
            start_time,
            weather_condition: parsing::non_empty(cell(columns.weather_condition)),
            amenity: parsing::parse_flag(cell(columns.amenity)),
            start_lat: parsing::parse_coordinate(cell(columns.start_lat)),
            start_lng: parsing::parse_coordinate(cell(columns.start_lng)),
        });
    }

    log::debug!("Parsed {} rows, deriving columns", rows.len());

    Ok(AccidentTable {
        records: derive::derive_records(rows),
        source: None,
        row_limit: options.row_limit,
        skipped_rows,
    })
}
