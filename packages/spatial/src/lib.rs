#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Accident location sampling for the dashboard map.
//!
//! Filters the loaded table to rows with usable coordinates, draws a
//! uniform sample without replacement, and describes the map those
//! markers are drawn on. The browser groups the markers into a cluster
//! layer; this crate only decides which points go on it.

use accident_dashboard_loader::AccidentTable;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Number of markers drawn when no sample size is configured.
pub const DEFAULT_SAMPLE_SIZE: usize = 1000;

/// Initial map viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapView {
    /// Center latitude.
    pub center_lat: f64,
    /// Center longitude.
    pub center_lng: f64,
    /// Initial zoom level.
    pub zoom: u8,
}

impl Default for MapView {
    /// Continental US.
    fn default() -> Self {
        Self {
            center_lat: 37.0902,
            center_lng: -95.7129,
            zoom: 4,
        }
    }
}

/// Styling shared by every circle marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerStyle {
    /// Circle radius in pixels.
    pub radius: u32,
    /// Stroke and fill color.
    pub color: String,
    /// Whether the circle is filled.
    pub fill: bool,
    /// Fill opacity, `0.0..=1.0`.
    pub fill_opacity: f64,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            radius: 4,
            color: "red".to_string(),
            fill: true,
            fill_opacity: 0.6,
        }
    }
}

/// One sampled accident location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapMarker {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
}

/// Everything the browser needs to draw the accident map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapSpec {
    /// Initial viewport.
    pub view: MapView,
    /// Marker styling.
    pub marker_style: MarkerStyle,
    /// Whether markers are grouped into a clustering layer.
    pub clustered: bool,
    /// Rows with both coordinates present.
    pub available: usize,
    /// Sampled markers.
    pub markers: Vec<MapMarker>,
}

/// Every `(lat, lng)` in the table with both coordinates present and
/// finite, in table order.
#[must_use]
pub fn located_points(table: &AccidentTable) -> Vec<MapMarker> {
    table
        .records()
        .iter()
        .filter_map(|r| r.location())
        .map(|(lat, lng)| MapMarker { lat, lng })
        .collect()
}

/// Draws `min(sample_size, available)` markers uniformly without
/// replacement from the located rows of `table`.
///
/// Asking for more markers than there are located rows returns all of
/// them rather than failing.
pub fn sample_markers<R: Rng + ?Sized>(
    table: &AccidentTable,
    sample_size: usize,
    rng: &mut R,
) -> Vec<MapMarker> {
    let points = located_points(table);
    let amount = sample_size.min(points.len());

    if amount < sample_size {
        log::debug!(
            "Only {} located rows, clamping sample of {sample_size}",
            points.len()
        );
    }

    rand::seq::index::sample(rng, points.len(), amount)
        .into_iter()
        .map(|i| points[i])
        .collect()
}

/// Builds the map specification with a fresh sample of markers.
pub fn build_map<R: Rng + ?Sized>(
    table: &AccidentTable,
    sample_size: usize,
    rng: &mut R,
) -> MapSpec {
    let available = table.records().iter().filter(|r| r.location().is_some()).count();
    let markers = sample_markers(table, sample_size, rng);

    MapSpec {
        view: MapView::default(),
        marker_style: MarkerStyle::default(),
        clustered: true,
        available,
        markers,
    }
}
