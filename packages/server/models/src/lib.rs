#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API and chart specification types for the accident dashboard server.
//!
//! Chart specs serialize to the trace/layout shape Plotly.js accepts, so
//! the page script can hand them straight to `Plotly.newPlot`. They are
//! kept separate from the analytics views so the page contract can evolve
//! independently.

use accident_dashboard_spatial::MapSpec;
use serde::{Deserialize, Serialize};

/// Which kind of chart a spec draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    /// Donut/pie of category shares.
    Pie,
    /// Bar per category.
    Bar,
    /// Line over an ordered axis.
    Line,
    /// Bars stacked by a second category.
    StackedBar,
}

/// Plotly trace type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceType {
    /// `pie`
    Pie,
    /// `bar`
    Bar,
    /// `scatter` (used for line charts)
    Scatter,
}

/// A value on a categorical or numeric axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AxisValue {
    /// Integer axis value (e.g. hour of day).
    Integer(i64),
    /// Category label.
    Text(String),
}

/// One Plotly trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartTrace {
    /// Trace type.
    #[serde(rename = "type")]
    pub trace_type: TraceType,
    /// Legend name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Slice labels (pie only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    /// Slice values (pie only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<i64>>,
    /// Donut hole ratio (pie only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hole: Option<f64>,
    /// X values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<Vec<AxisValue>>,
    /// Y values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<Vec<i64>>,
    /// Scatter drawing mode, e.g. `lines+markers`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// Per-point value labels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<Vec<String>>,
    /// Where value labels are drawn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub textposition: Option<String>,
}

impl ChartTrace {
    /// An empty trace of the given type; fill in the fields you need.
    #[must_use]
    pub const fn new(trace_type: TraceType) -> Self {
        Self {
            trace_type,
            name: None,
            labels: None,
            values: None,
            hole: None,
            x: None,
            y: None,
            mode: None,
            text: None,
            textposition: None,
        }
    }
}

/// Plotly `{ "text": ... }` title object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleText {
    /// Title text.
    pub text: String,
}

impl From<&str> for TitleText {
    fn from(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }
}

/// Axis settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Axis {
    /// Axis title.
    pub title: TitleText,
}

/// Free-floating text placed on a chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Text to show.
    pub text: String,
    /// Position reference for `x` (`paper` means chart-relative).
    pub xref: String,
    /// Position reference for `y`.
    pub yref: String,
    /// Chart-relative x position.
    pub x: f64,
    /// Chart-relative y position.
    pub y: f64,
    /// Whether to draw an arrow.
    pub showarrow: bool,
}

impl Annotation {
    /// A centered, arrowless note, used for charts with no data.
    #[must_use]
    pub fn centered(text: &str) -> Self {
        Self {
            text: text.to_string(),
            xref: "paper".to_string(),
            yref: "paper".to_string(),
            x: 0.5,
            y: 0.5,
            showarrow: false,
        }
    }
}

/// Plotly layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartLayout {
    /// Chart title.
    pub title: TitleText,
    /// Bar grouping mode (`stack` for stacked bars).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barmode: Option<String>,
    /// X axis settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<Axis>,
    /// Y axis settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<Axis>,
    /// Notes drawn on top of the chart.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
}

/// A chart ready to be drawn by the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSpec {
    /// DOM id of the chart panel.
    pub id: String,
    /// What the chart draws.
    pub kind: ChartKind,
    /// Plotly traces. Empty when there is no data.
    pub data: Vec<ChartTrace>,
    /// Plotly layout.
    pub layout: ChartLayout,
}

impl ChartSpec {
    /// Whether the chart has nothing to plot.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// A labelled value shown on a metric card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricCard {
    /// Card label.
    pub label: String,
    /// Formatted value.
    pub value: String,
}

/// The four dashboard charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardCharts {
    /// Top weather conditions (donut).
    pub weather: ChartSpec,
    /// Severity by cause (bar).
    pub cause: ChartSpec,
    /// Accidents by hour (line).
    pub hourly: ChartSpec,
    /// Accidents by road and weather condition (stacked bar).
    pub road_weather: ChartSpec,
}

/// Everything needed to render one dashboard page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardPayload {
    /// Page title.
    pub title: String,
    /// Metric cards, in display order.
    pub metrics: Vec<MetricCard>,
    /// Accident location map.
    pub map: MapSpec,
    /// Charts.
    pub charts: DashboardCharts,
    /// Rows the dashboard was computed from.
    pub row_count: usize,
    /// Rows skipped while loading.
    pub skipped_rows: usize,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// Response for the cache invalidation endpoint.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiInvalidated {
    /// Number of cached tables dropped.
    pub invalidated: usize,
}

/// Error body returned by API endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable error message.
    pub error: String,
}
