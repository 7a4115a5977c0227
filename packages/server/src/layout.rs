//! Single-page HTML layout.
//!
//! The page is self-contained apart from the Plotly and Leaflet CDN
//! scripts. Chart specs and map markers are embedded as one JSON document
//! that the inline script reads on load.

use std::fmt::Write as _;

use accident_dashboard_server_models::{DashboardPayload, MetricCard};

const PLOTLY_JS: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";
const LEAFLET_CSS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";
const LEAFLET_JS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";
const CLUSTER_CSS: &str = "https://unpkg.com/leaflet.markercluster@1.5.3/dist/MarkerCluster.css";
const CLUSTER_DEFAULT_CSS: &str =
    "https://unpkg.com/leaflet.markercluster@1.5.3/dist/MarkerCluster.Default.css";
const CLUSTER_JS: &str =
    "https://unpkg.com/leaflet.markercluster@1.5.3/dist/leaflet.markercluster.js";

/// Renders the full dashboard page.
///
/// # Errors
///
/// Returns an error if the payload cannot be serialized to JSON.
pub fn render_page(payload: &DashboardPayload) -> Result<String, serde_json::Error> {
    let data = embed_json(&serde_json::to_string(payload)?);

    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>US Accidents Dashboard</title>
    <link rel="stylesheet" href="{LEAFLET_CSS}">
    <link rel="stylesheet" href="{CLUSTER_CSS}">
    <link rel="stylesheet" href="{CLUSTER_DEFAULT_CSS}">
    <style>{css}</style>
    <script src="{PLOTLY_JS}"></script>
    <script src="{LEAFLET_JS}"></script>
    <script src="{CLUSTER_JS}"></script>
</head>
<body>
    <div class="container">
        <h1>{title}</h1>
        {cards}
        <hr>
        <h2>🌍 Accident Locations Map (Sample of {sampled})</h2>
        <div id="map" class="map-panel"></div>
        <div class="chart-grid">
            <div id="{weather}" class="chart-panel"></div>
            <div id="{cause}" class="chart-panel"></div>
            <div id="{hourly}" class="chart-panel"></div>
            <div id="{road_weather}" class="chart-panel"></div>
        </div>
        {footer}
    </div>
    <script id="dashboard-data" type="application/json">{data}</script>
    <script>{js}</script>
</body>
</html>"#,
        css = inline_css(),
        js = inline_javascript(),
        title = escape_html(&payload.title),
        cards = render_cards(&payload.metrics),
        sampled = payload.map.markers.len(),
        weather = escape_html(&payload.charts.weather.id),
        cause = escape_html(&payload.charts.cause.id),
        hourly = escape_html(&payload.charts.hourly.id),
        road_weather = escape_html(&payload.charts.road_weather.id),
        footer = render_footer(payload),
    ))
}

fn render_cards(metrics: &[MetricCard]) -> String {
    let mut html = String::from(r#"<div class="metric-row">"#);
    for card in metrics {
        let _ = write!(
            html,
            r#"<div class="metric-card"><div class="metric-label">{}</div><div class="metric-value">{}</div></div>"#,
            escape_html(&card.label),
            escape_html(&card.value),
        );
    }
    html.push_str("</div>");
    html
}

fn render_footer(payload: &DashboardPayload) -> String {
    let mut footer = format!(
        "Computed from {} rows, {} with coordinates.",
        payload.row_count, payload.map.available
    );
    if payload.skipped_rows > 0 {
        let _ = write!(
            footer,
            " {} rows skipped for unreadable timestamps.",
            payload.skipped_rows
        );
    }
    format!(r#"<footer class="meta">{footer}</footer>"#)
}

/// Makes serialized JSON safe to place inside a `<script>` element.
///
/// `<`, `>` and `&` only occur inside JSON strings, so they are replaced by
/// their `\uXXXX` escapes. The markup then holds no tag, comment or
/// character reference the HTML tokenizer could act on.
fn embed_json(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for ch in json.chars() {
        match ch {
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escapes text for use in HTML content and attribute values.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn inline_css() -> &'static str {
    r"
* {
    box-sizing: border-box;
}

body {
    margin: 0;
    font-family: system-ui, -apple-system, 'Segoe UI', sans-serif;
    color: #111827;
    background: #ffffff;
}

.container {
    max-width: 1400px;
    margin: 0 auto;
    padding: 2rem;
}

h1 {
    font-size: 2rem;
    margin: 0 0 1.5rem;
}

h2 {
    font-size: 1.4rem;
    margin: 1.5rem 0 1rem;
}

hr {
    border: none;
    border-top: 1px solid #e5e7eb;
}

.metric-row {
    display: grid;
    grid-template-columns: repeat(4, 1fr);
    gap: 1rem;
    margin-bottom: 1.5rem;
}

.metric-card {
    padding: 1rem;
    border: 1px solid #e5e7eb;
    border-radius: 0.5rem;
}

.metric-label {
    color: #6b7280;
    font-size: 0.875rem;
}

.metric-value {
    font-size: 1.75rem;
    font-weight: 600;
}

.map-panel {
    height: 600px;
    margin-bottom: 1.5rem;
}

.chart-grid {
    display: grid;
    grid-template-columns: repeat(2, 1fr);
    gap: 1rem;
}

.chart-panel {
    min-height: 450px;
}

.meta {
    margin-top: 2rem;
    color: #6b7280;
    font-size: 0.875rem;
}
"
}

fn inline_javascript() -> &'static str {
    r"
(function () {
    const payload = JSON.parse(document.getElementById('dashboard-data').textContent);

    const charts = payload.charts;
    [charts.weather, charts.cause, charts.hourly, charts.roadWeather].forEach(function (chart) {
        Plotly.newPlot(chart.id, chart.data, chart.layout, { responsive: true });
    });

    const spec = payload.map;
    const map = L.map('map').setView([spec.view.centerLat, spec.view.centerLng], spec.view.zoom);
    L.tileLayer('https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png', {
        attribution: '&copy; OpenStreetMap contributors'
    }).addTo(map);

    const layer = spec.clustered ? L.markerClusterGroup() : L.layerGroup();
    const style = spec.markerStyle;
    spec.markers.forEach(function (marker) {
        L.circleMarker([marker.lat, marker.lng], {
            radius: style.radius,
            color: style.color,
            fill: style.fill,
            fillOpacity: style.fillOpacity
        }).addTo(layer);
    });
    layer.addTo(map);
})();
"
}
