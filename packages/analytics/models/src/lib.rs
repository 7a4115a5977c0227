#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Aggregate view and summary metric types.
//!
//! Every view is a small read-only table keyed by one or two categorical
//! dimensions with a count or summed-severity measure. Views are rebuilt
//! on every render and never persisted.

use accident_dashboard_accident_models::{Cause, RoadCondition};
use serde::{Deserialize, Serialize};

/// Number of accidents for one category value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    /// Category value (e.g. a weather condition).
    pub category: String,
    /// Number of accidents.
    pub count: u64,
}

/// Summed severity for one cause label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CauseSeverity {
    /// Cause label.
    pub cause: Cause,
    /// Sum of `Severity` over rows with this cause.
    pub total_severity: i64,
}

/// Number of accidents starting in one hour of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourCount {
    /// Hour of day, `0..=23`.
    pub hour: u32,
    /// Number of accidents.
    pub count: u64,
}

/// Number of accidents for a road condition and weather condition pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadWeatherCount {
    /// Road condition label.
    pub road_condition: RoadCondition,
    /// Weather condition (filled).
    pub weather_condition: String,
    /// Number of accidents.
    pub count: u64,
}

/// Scalar metrics shown on the dashboard cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryMetrics {
    /// Number of loaded rows.
    pub total_accidents: u64,
    /// Sum of `Severity` over all rows.
    pub total_severity: i64,
    /// `total_severity / total_accidents`, or `None` for an empty table.
    pub mean_severity: Option<f64>,
    /// Most frequent cause, or `None` for an empty table.
    pub most_common_cause: Option<Cause>,
}

/// Every aggregate the dashboard renders, computed from one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardAggregates {
    /// Card metrics.
    pub metrics: SummaryMetrics,
    /// Most frequent weather conditions, count descending.
    pub top_weather: Vec<CategoryCount>,
    /// Severity totals per cause.
    pub severity_by_cause: Vec<CauseSeverity>,
    /// Accident counts per hour present, ascending.
    pub by_hour: Vec<HourCount>,
    /// Road/weather pair counts restricted to the top weather conditions.
    pub road_weather: Vec<RoadWeatherCount>,
}
