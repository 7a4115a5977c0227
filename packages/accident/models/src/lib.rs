#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Accident record types and derived label definitions.
//!
//! This crate defines the row shape shared across the accident dashboard:
//! the raw columns read from the source CSV and the fields derived from
//! them at load time. The derivations are pure functions so the loader can
//! apply them as whole-column transforms.

use chrono::{Datelike as _, NaiveDateTime, Timelike as _};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString, IntoStaticStr};

/// Label used in place of a missing weather condition.
pub const UNKNOWN_WEATHER: &str = "Unknown";

/// Severity value that maps to [`Cause::DrunkDriving`].
pub const DRUNK_DRIVING_SEVERITY: i64 = 4;

/// Road state shown on the dashboard, derived from the `Amenity` flag.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    IntoStaticStr,
)]
pub enum RoadCondition {
    /// The amenity flag was set on the record.
    #[serde(rename = "Under Construction")]
    #[strum(serialize = "Under Construction")]
    UnderConstruction,
    /// Anything else, including a missing flag.
    Normal,
}

impl RoadCondition {
    /// Derives the road condition from the raw amenity flag.
    ///
    /// A missing flag is not truthy.
    #[must_use]
    pub const fn from_amenity(amenity: Option<bool>) -> Self {
        match amenity {
            Some(true) => Self::UnderConstruction,
            Some(false) | None => Self::Normal,
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::UnderConstruction, Self::Normal]
    }
}

/// Demo cause label, derived from severity.
///
/// This is a fixed presentation stand-in. It carries no causal information
/// from the source data.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    IntoStaticStr,
)]
pub enum Cause {
    /// Severity 4 records.
    #[serde(rename = "Drunk Driving")]
    #[strum(serialize = "Drunk Driving")]
    DrunkDriving,
    /// Every other record, including ones with no severity.
    Speeding,
}

impl Cause {
    /// Derives the cause label from a record's severity.
    #[must_use]
    pub const fn from_severity(severity: Option<i64>) -> Self {
        match severity {
            Some(DRUNK_DRIVING_SEVERITY) => Self::DrunkDriving,
            _ => Self::Speeding,
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::DrunkDriving, Self::Speeding]
    }
}

/// Replaces a missing weather condition with [`UNKNOWN_WEATHER`]. Present
/// values are returned unchanged.
#[must_use]
pub fn fill_weather(weather: Option<&str>) -> String {
    match weather {
        Some(w) if !w.is_empty() => w.to_string(),
        _ => UNKNOWN_WEATHER.to_string(),
    }
}

/// A single accident row as read from the source CSV.
///
/// Only the columns the dashboard uses are kept; `None` means the cell was
/// empty in the source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAccident {
    /// Source identifier (`ID` column), if present.
    pub id: Option<String>,
    /// Severity level as reported by the source.
    pub severity: Option<i64>,
    /// Start time with any fractional seconds already discarded.
    pub start_time: NaiveDateTime,
    /// Weather condition before null-filling.
    pub weather_condition: Option<String>,
    /// Amenity indicator.
    pub amenity: Option<bool>,
    /// Start latitude.
    pub start_lat: Option<f64>,
    /// Start longitude.
    pub start_lng: Option<f64>,
}

/// Fields computed once at load time and never mutated afterward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedFields {
    /// Hour of day of the start time, `0..=23`.
    pub hour: u32,
    /// Calendar year of the start time.
    pub year: i32,
    /// Weather condition, never empty.
    pub weather_condition: String,
    /// Road condition label.
    pub road_condition: RoadCondition,
    /// Demo cause label.
    pub cause: Cause,
}

impl DerivedFields {
    /// Derives every field from a raw row.
    ///
    /// The loader derives column by column; this is the equivalent per-row
    /// form.
    #[must_use]
    pub fn derive(raw: &RawAccident) -> Self {
        Self {
            hour: raw.start_time.hour(),
            year: raw.start_time.year(),
            weather_condition: fill_weather(raw.weather_condition.as_deref()),
            road_condition: RoadCondition::from_amenity(raw.amenity),
            cause: Cause::from_severity(raw.severity),
        }
    }
}

/// A loaded accident with its derived fields attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccidentRecord {
    /// Columns as ingested.
    pub raw: RawAccident,
    /// Columns computed at load time.
    pub derived: DerivedFields,
}

impl AccidentRecord {
    /// Severity with a missing value counted as zero, for summing.
    #[must_use]
    pub fn severity_or_zero(&self) -> i64 {
        self.raw.severity.unwrap_or(0)
    }

    /// Returns `(lat, lng)` when both coordinates are present and finite.
    #[must_use]
    pub fn location(&self) -> Option<(f64, f64)> {
        let lat = self.raw.start_lat?;
        let lng = self.raw.start_lng?;
        if lat.is_finite() && lng.is_finite() {
            Some((lat, lng))
        } else {
            None
        }
    }
}
