//! Turns aggregate views into chart specifications and metric cards.

use accident_dashboard_analytics::aggregate;
use accident_dashboard_analytics_models::{
    CategoryCount, CauseSeverity, DashboardAggregates, HourCount, RoadWeatherCount,
    SummaryMetrics,
};
use accident_dashboard_loader::AccidentTable;
use accident_dashboard_server_models::{
    Annotation, Axis, AxisValue, ChartKind, ChartLayout, ChartSpec, ChartTrace, DashboardCharts,
    DashboardPayload, MetricCard, TraceType,
};
use accident_dashboard_spatial::build_map;
use rand::Rng;

/// Page heading.
pub const DASHBOARD_TITLE: &str = "🚦 Global Traffic Accident Analysis Dashboard";

/// Annotation shown on a chart whose view is empty.
pub const NO_DATA: &str = "No data";

const NOT_AVAILABLE: &str = "N/A";

fn to_i64(count: u64) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX)
}

/// Formats an integer with `,` thousands separators, e.g. `12,345`.
#[must_use]
pub fn format_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    out
}

/// The four metric cards, in display order.
#[must_use]
pub fn metric_cards(metrics: &SummaryMetrics) -> Vec<MetricCard> {
    let card = |label: &str, value: String| MetricCard {
        label: label.to_string(),
        value,
    };

    vec![
        card("Total Casualties", format_thousands(metrics.total_severity)),
        card(
            "Total Accidents",
            format_thousands(to_i64(metrics.total_accidents)),
        ),
        card(
            "Mean Casualties",
            metrics
                .mean_severity
                .map_or_else(|| NOT_AVAILABLE.to_string(), |mean| format!("{mean:.2}")),
        ),
        card(
            "Most Common Cause",
            metrics
                .most_common_cause
                .map_or_else(|| NOT_AVAILABLE.to_string(), |cause| cause.to_string()),
        ),
    ]
}

fn layout(title: &str, empty: bool) -> ChartLayout {
    ChartLayout {
        title: title.into(),
        barmode: None,
        xaxis: None,
        yaxis: None,
        annotations: if empty {
            vec![Annotation::centered(NO_DATA)]
        } else {
            Vec::new()
        },
    }
}

fn axis(title: &str) -> Option<Axis> {
    Some(Axis {
        title: title.into(),
    })
}

/// Donut of the top weather conditions.
#[must_use]
pub fn weather_chart(top_weather: &[CategoryCount]) -> ChartSpec {
    let data = if top_weather.is_empty() {
        Vec::new()
    } else {
        let mut trace = ChartTrace::new(TraceType::Pie);
        trace.labels = Some(top_weather.iter().map(|c| c.category.clone()).collect());
        trace.values = Some(top_weather.iter().map(|c| to_i64(c.count)).collect());
        trace.hole = Some(0.4);
        vec![trace]
    };

    ChartSpec {
        id: "weather-chart".to_string(),
        kind: ChartKind::Pie,
        layout: layout("Total Accidents by Weather Condition", data.is_empty()),
        data,
    }
}

/// Bar of summed severity per cause, one colored trace per cause.
#[must_use]
pub fn cause_chart(by_cause: &[CauseSeverity]) -> ChartSpec {
    let data: Vec<ChartTrace> = by_cause
        .iter()
        .map(|c| {
            let label = c.cause.to_string();
            let mut trace = ChartTrace::new(TraceType::Bar);
            trace.x = Some(vec![AxisValue::Text(label.clone())]);
            trace.y = Some(vec![c.total_severity]);
            trace.text = Some(vec![c.total_severity.to_string()]);
            trace.textposition = Some("auto".to_string());
            trace.name = Some(label);
            trace
        })
        .collect();

    let mut layout = layout("Casualties by Cause", data.is_empty());
    layout.xaxis = axis("Cause");
    layout.yaxis = axis("Severity");

    ChartSpec {
        id: "cause-chart".to_string(),
        kind: ChartKind::Bar,
        data,
        layout,
    }
}

/// Line of accident counts by hour, with point markers.
#[must_use]
pub fn hourly_chart(by_hour: &[HourCount]) -> ChartSpec {
    let data = if by_hour.is_empty() {
        Vec::new()
    } else {
        let mut trace = ChartTrace::new(TraceType::Scatter);
        trace.x = Some(
            by_hour
                .iter()
                .map(|h| AxisValue::Integer(i64::from(h.hour)))
                .collect(),
        );
        trace.y = Some(by_hour.iter().map(|h| to_i64(h.count)).collect());
        trace.mode = Some("lines+markers".to_string());
        vec![trace]
    };

    let mut layout = layout("Total Accidents by Hour of the Day", data.is_empty());
    layout.xaxis = axis("Hour");
    layout.yaxis = axis("Total Accidents");

    ChartSpec {
        id: "hourly-chart".to_string(),
        kind: ChartKind::Line,
        data,
        layout,
    }
}

/// Stacked bar of road condition counts, one trace per weather condition.
///
/// Traces follow the order of `top_weather`, so the stack and legend match
/// the weather donut.
#[must_use]
pub fn road_weather_chart(
    road_weather: &[RoadWeatherCount],
    top_weather: &[CategoryCount],
) -> ChartSpec {
    let data: Vec<ChartTrace> = top_weather
        .iter()
        .filter_map(|weather| {
            let rows: Vec<&RoadWeatherCount> = road_weather
                .iter()
                .filter(|r| r.weather_condition == weather.category)
                .collect();
            if rows.is_empty() {
                return None;
            }

            let mut trace = ChartTrace::new(TraceType::Bar);
            trace.name = Some(weather.category.clone());
            trace.x = Some(
                rows.iter()
                    .map(|r| AxisValue::Text(r.road_condition.to_string()))
                    .collect(),
            );
            trace.y = Some(rows.iter().map(|r| to_i64(r.count)).collect());
            Some(trace)
        })
        .collect();

    let mut layout = layout(
        "Total Accidents by Road Condition and Weather Condition",
        data.is_empty(),
    );
    layout.barmode = Some("stack".to_string());
    layout.xaxis = axis("Road Condition");
    layout.yaxis = axis("Total Accidents");

    ChartSpec {
        id: "road-weather-chart".to_string(),
        kind: ChartKind::StackedBar,
        data,
        layout,
    }
}

/// Builds all four charts from the aggregates.
#[must_use]
pub fn dashboard_charts(aggregates: &DashboardAggregates) -> DashboardCharts {
    DashboardCharts {
        weather: weather_chart(&aggregates.top_weather),
        cause: cause_chart(&aggregates.severity_by_cause),
        hourly: hourly_chart(&aggregates.by_hour),
        road_weather: road_weather_chart(&aggregates.road_weather, &aggregates.top_weather),
    }
}

/// Aggregates `table`, samples the map, and assembles the page payload.
pub fn build_dashboard<R: Rng + ?Sized>(
    table: &AccidentTable,
    sample_size: usize,
    rng: &mut R,
) -> DashboardPayload {
    let aggregates = aggregate(table);
    let map = build_map(table, sample_size, rng);

    log::debug!(
        "Presenting {} rows with {} of {} located markers",
        table.len(),
        map.markers.len(),
        map.available
    );

    DashboardPayload {
        title: DASHBOARD_TITLE.to_string(),
        metrics: metric_cards(&aggregates.metrics),
        charts: dashboard_charts(&aggregates),
        map,
        row_count: table.len(),
        skipped_rows: table.skipped_rows(),
    }
}

#[cfg(test)]
mod tests {
    use accident_dashboard_accident_models::{
        AccidentRecord, Cause, DerivedFields, RawAccident, RoadCondition,
    };
    use chrono::NaiveDateTime;
    use rand::SeedableRng as _;
    use rand::rngs::StdRng;

    use super::*;

    fn record(severity: i64, hour: u32, weather: &str, amenity: bool) -> AccidentRecord {
        let raw = RawAccident {
            id: None,
            severity: Some(severity),
            start_time: NaiveDateTime::parse_from_str(
                &format!("2021-07-01 {hour:02}:15:00"),
                "%Y-%m-%d %H:%M:%S",
            )
            .unwrap(),
            weather_condition: Some(weather.to_string()),
            amenity: Some(amenity),
            start_lat: Some(40.0),
            start_lng: Some(-75.0),
        };
        AccidentRecord {
            derived: DerivedFields::derive(&raw),
            raw,
        }
    }

    #[test]
    fn thousands_separators() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1000), "1,000");
        assert_eq!(format_thousands(12_345), "12,345");
        assert_eq!(format_thousands(1_234_567), "1,234,567");
        assert_eq!(format_thousands(-4321), "-4,321");
    }

    #[test]
    fn metric_cards_format_values() {
        let cards = metric_cards(&SummaryMetrics {
            total_accidents: 3,
            total_severity: 10,
            mean_severity: Some(10.0 / 3.0),
            most_common_cause: Some(Cause::DrunkDriving),
        });
        let pairs: Vec<(&str, &str)> = cards
            .iter()
            .map(|c| (c.label.as_str(), c.value.as_str()))
            .collect();
        assert_eq!(
            pairs,
            [
                ("Total Casualties", "10"),
                ("Total Accidents", "3"),
                ("Mean Casualties", "3.33"),
                ("Most Common Cause", "Drunk Driving"),
            ]
        );
    }

    #[test]
    fn empty_metrics_render_not_available() {
        let cards = metric_cards(&SummaryMetrics {
            total_accidents: 0,
            total_severity: 0,
            mean_severity: None,
            most_common_cause: None,
        });
        assert_eq!(cards[2].value, "N/A");
        assert_eq!(cards[3].value, "N/A");
    }

    #[test]
    fn empty_views_produce_annotated_charts() {
        let charts = dashboard_charts(&aggregate(&AccidentTable::from_records(Vec::new())));
        for chart in [
            &charts.weather,
            &charts.cause,
            &charts.hourly,
            &charts.road_weather,
        ] {
            assert!(chart.is_empty(), "{} should have no traces", chart.id);
            assert_eq!(chart.layout.annotations, [Annotation::centered(NO_DATA)]);
        }
    }

    #[test]
    fn weather_chart_is_a_donut() {
        let chart = weather_chart(&[
            CategoryCount {
                category: "Clear".to_string(),
                count: 5,
            },
            CategoryCount {
                category: "Rain".to_string(),
                count: 2,
            },
        ]);
        assert_eq!(chart.kind, ChartKind::Pie);
        assert_eq!(chart.layout.title.text, "Total Accidents by Weather Condition");
        let trace = &chart.data[0];
        assert_eq!(trace.hole, Some(0.4));
        assert_eq!(
            trace.labels.as_deref(),
            Some(&["Clear".to_string(), "Rain".to_string()][..])
        );
        assert_eq!(trace.values.as_deref(), Some(&[5, 2][..]));
    }

    #[test]
    fn cause_chart_has_one_labelled_trace_per_cause() {
        let chart = cause_chart(&[
            CauseSeverity {
                cause: Cause::DrunkDriving,
                total_severity: 8,
            },
            CauseSeverity {
                cause: Cause::Speeding,
                total_severity: 1234,
            },
        ]);
        assert_eq!(chart.data.len(), 2);
        assert_eq!(chart.data[0].name.as_deref(), Some("Drunk Driving"));
        assert_eq!(chart.data[1].y.as_deref(), Some(&[1234][..]));
        assert_eq!(chart.data[1].text.as_deref(), Some(&["1234".to_string()][..]));
    }

    #[test]
    fn hourly_chart_draws_markers() {
        let chart = hourly_chart(&[
            HourCount { hour: 0, count: 4 },
            HourCount { hour: 13, count: 9 },
        ]);
        let trace = &chart.data[0];
        assert_eq!(trace.trace_type, TraceType::Scatter);
        assert_eq!(trace.mode.as_deref(), Some("lines+markers"));
        assert_eq!(
            trace.x.as_deref(),
            Some(&[AxisValue::Integer(0), AxisValue::Integer(13)][..])
        );
    }

    #[test]
    fn road_weather_chart_stacks_one_trace_per_weather() {
        let top = vec![
            CategoryCount {
                category: "Clear".to_string(),
                count: 3,
            },
            CategoryCount {
                category: "Rain".to_string(),
                count: 1,
            },
        ];
        let rows = vec![
            RoadWeatherCount {
                road_condition: RoadCondition::Normal,
                weather_condition: "Clear".to_string(),
                count: 2,
            },
            RoadWeatherCount {
                road_condition: RoadCondition::Normal,
                weather_condition: "Rain".to_string(),
                count: 1,
            },
            RoadWeatherCount {
                road_condition: RoadCondition::UnderConstruction,
                weather_condition: "Clear".to_string(),
                count: 1,
            },
        ];

        let chart = road_weather_chart(&rows, &top);
        assert_eq!(chart.layout.barmode.as_deref(), Some("stack"));
        assert_eq!(chart.data.len(), 2);
        assert_eq!(chart.data[0].name.as_deref(), Some("Clear"));
        assert_eq!(
            chart.data[0].x.as_deref(),
            Some(
                &[
                    AxisValue::Text("Normal".to_string()),
                    AxisValue::Text("Under Construction".to_string()),
                ][..]
            )
        );
        assert_eq!(chart.data[0].y.as_deref(), Some(&[2, 1][..]));
        assert_eq!(chart.data[1].y.as_deref(), Some(&[1][..]));
    }

    #[test]
    fn dashboard_payload_carries_table_provenance() {
        let table = AccidentTable::from_records(vec![
            record(4, 1, "Clear", false),
            record(2, 2, "Clear", true),
            record(4, 3, "Rain", false),
        ]);
        let payload = build_dashboard(&table, 1000, &mut StdRng::seed_from_u64(9));

        assert_eq!(payload.title, DASHBOARD_TITLE);
        assert_eq!(payload.row_count, 3);
        assert_eq!(payload.skipped_rows, 0);
        assert_eq!(payload.metrics.len(), 4);
        assert_eq!(payload.map.markers.len(), 3);
        assert!(!payload.charts.road_weather.is_empty());
    }
}
