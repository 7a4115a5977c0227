#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Aggregate queries over the loaded accident table.
//!
//! Each public function is an independent read-only query. They never fail:
//! an empty table produces empty views and `None` metrics.

pub mod metrics;
pub mod views;

use accident_dashboard_analytics_models::DashboardAggregates;
use accident_dashboard_loader::AccidentTable;

pub use metrics::{most_common_cause, summary_metrics};
pub use views::{accidents_by_hour, road_weather_counts, severity_by_cause, top_weather};

/// Number of weather conditions kept by the top-K query.
pub const TOP_WEATHER_LIMIT: usize = 6;

/// Computes every aggregate the dashboard renders.
#[must_use]
pub fn aggregate(table: &AccidentTable) -> DashboardAggregates {
    let top_weather = top_weather(table, TOP_WEATHER_LIMIT);
    let road_weather = road_weather_counts(table, &top_weather);

    let aggregates = DashboardAggregates {
        metrics: summary_metrics(table),
        severity_by_cause: severity_by_cause(table),
        by_hour: accidents_by_hour(table),
        top_weather,
        road_weather,
    };

    log::debug!(
        "Aggregated {} rows: {} weather, {} cause, {} hour, {} road/weather rows",
        table.len(),
        aggregates.top_weather.len(),
        aggregates.severity_by_cause.len(),
        aggregates.by_hour.len(),
        aggregates.road_weather.len()
    );

    aggregates
}

#[cfg(test)]
mod tests {
    use accident_dashboard_accident_models::{
        AccidentRecord, Cause, DerivedFields, RawAccident, RoadCondition,
    };
    use chrono::NaiveDateTime;

    use super::*;

    fn record(severity: i64, hour: u32, weather: Option<&str>, amenity: bool) -> AccidentRecord {
        let raw = RawAccident {
            id: None,
            severity: Some(severity),
            start_time: NaiveDateTime::parse_from_str(
                &format!("2022-03-04 {hour:02}:00:00"),
                "%Y-%m-%d %H:%M:%S",
            )
            .unwrap(),
            weather_condition: weather.map(str::to_string),
            amenity: Some(amenity),
            start_lat: None,
            start_lng: None,
        };
        AccidentRecord {
            derived: DerivedFields::derive(&raw),
            raw,
        }
    }

    fn table(records: Vec<AccidentRecord>) -> AccidentTable {
        AccidentTable::from_records(records)
    }

    fn weather_table(weathers: &[(&str, usize)]) -> AccidentTable {
        table(
            weathers
                .iter()
                .flat_map(|(w, n)| (0..*n).map(move |_| record(2, 8, Some(*w), false)))
                .collect(),
        )
    }

    #[test]
    fn three_row_scenario_metrics() {
        let t = table(vec![
            record(4, 1, Some("Clear"), false),
            record(2, 2, Some("Clear"), false),
            record(4, 3, Some("Rain"), false),
        ]);

        let metrics = summary_metrics(&t);
        assert_eq!(metrics.total_accidents, 3);
        assert_eq!(metrics.total_severity, 10);
        let mean = metrics.mean_severity.unwrap();
        assert!((mean - 10.0 / 3.0).abs() < 1e-12);
        assert_eq!(format!("{mean:.2}"), "3.33");
        assert_eq!(metrics.most_common_cause, Some(Cause::DrunkDriving));
    }

    #[test]
    fn empty_table_yields_empty_views_and_no_mean() {
        let t = table(Vec::new());
        let aggregates = aggregate(&t);

        assert!(aggregates.top_weather.is_empty());
        assert!(aggregates.severity_by_cause.is_empty());
        assert!(aggregates.by_hour.is_empty());
        assert!(aggregates.road_weather.is_empty());
        assert_eq!(aggregates.metrics.total_accidents, 0);
        assert_eq!(aggregates.metrics.total_severity, 0);
        assert_eq!(aggregates.metrics.mean_severity, None);
        assert_eq!(aggregates.metrics.most_common_cause, None);
    }

    #[test]
    fn top_weather_keeps_six_sorted_descending() {
        let counts = [
            ("Clear", 9),
            ("Cloudy", 7),
            ("Fog", 1),
            ("Haze", 2),
            ("Light Rain", 5),
            ("Overcast", 6),
            ("Rain", 3),
            ("Snow", 1),
        ];
        let t = weather_table(&counts);

        let top = top_weather(&t, TOP_WEATHER_LIMIT);
        let names: Vec<&str> = top.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(names, ["Clear", "Cloudy", "Overcast", "Light Rain", "Rain", "Haze"]);

        assert!(top.windows(2).all(|w| w[0].count >= w[1].count));

        let excluded: Vec<(&str, usize)> = counts
            .iter()
            .copied()
            .filter(|(name, _)| !names.contains(name))
            .collect();
        assert_eq!(excluded, [("Fog", 1), ("Snow", 1)]);

        let min_kept = top.iter().map(|c| c.count).min().unwrap();
        let max_excluded = excluded
            .iter()
            .map(|(_, n)| u64::try_from(*n).unwrap())
            .max()
            .unwrap();
        assert!(min_kept >= max_excluded);
    }

    #[test]
    fn top_weather_ties_break_by_name() {
        let t = weather_table(&[("Snow", 2), ("Fog", 2), ("Clear", 3), ("Haze", 2)]);
        let top = top_weather(&t, 3);
        let names: Vec<&str> = top.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(names, ["Clear", "Fog", "Haze"]);
    }

    #[test]
    fn missing_weather_is_counted_as_unknown() {
        let t = table(vec![
            record(2, 1, None, false),
            record(2, 1, Some(""), false),
            record(2, 1, Some("Clear"), false),
        ]);
        let top = top_weather(&t, TOP_WEATHER_LIMIT);
        assert_eq!(top[0].category, "Unknown");
        assert_eq!(top[0].count, 2);
    }

    #[test]
    fn severity_by_cause_sums_to_total() {
        let t = table(vec![
            record(4, 1, Some("Clear"), false),
            record(2, 2, Some("Clear"), false),
            record(3, 3, Some("Rain"), true),
            record(4, 4, Some("Rain"), true),
            record(1, 5, Some("Fog"), false),
        ]);

        let by_cause = severity_by_cause(&t);
        assert_eq!(by_cause.len(), 2);
        assert_eq!(by_cause[0].cause, Cause::DrunkDriving);
        assert_eq!(by_cause[0].total_severity, 8);
        assert_eq!(by_cause[1].cause, Cause::Speeding);
        assert_eq!(by_cause[1].total_severity, 6);

        let sum: i64 = by_cause.iter().map(|c| c.total_severity).sum();
        assert_eq!(sum, summary_metrics(&t).total_severity);
    }

    #[test]
    fn by_hour_lists_present_hours_ascending() {
        let t = table(vec![
            record(2, 17, Some("Clear"), false),
            record(2, 3, Some("Clear"), false),
            record(2, 17, Some("Clear"), false),
            record(2, 0, Some("Clear"), false),
        ]);

        let hours: Vec<(u32, u64)> = accidents_by_hour(&t)
            .iter()
            .map(|h| (h.hour, h.count))
            .collect();
        assert_eq!(hours, [(0, 1), (3, 1), (17, 2)]);
    }

    #[test]
    fn road_weather_is_restricted_to_top_weather() {
        let mut records = Vec::new();
        for (i, w) in ["A", "B", "C", "D", "E", "F"].iter().enumerate() {
            for _ in 0..=i {
                records.push(record(2, 1, Some(*w), true));
            }
            records.push(record(2, 1, Some(*w), false));
        }
        records.push(record(2, 1, Some("Rare"), true));
        let t = table(records);

        let aggregates = aggregate(&t);
        assert_eq!(aggregates.top_weather.len(), 6);
        assert!(
            aggregates
                .road_weather
                .iter()
                .all(|r| r.weather_condition != "Rare")
        );
        assert_eq!(aggregates.road_weather.len(), 12);

        let first = &aggregates.road_weather[0];
        assert_eq!(first.road_condition, RoadCondition::Normal);
        assert_eq!(first.weather_condition, "A");
        assert_eq!(first.count, 1);

        let last = aggregates.road_weather.last().unwrap();
        assert_eq!(last.road_condition, RoadCondition::UnderConstruction);
        assert_eq!(last.weather_condition, "F");
        assert_eq!(last.count, 6);
    }

    #[test]
    fn most_common_cause_tie_goes_to_first_label() {
        let t = table(vec![
            record(4, 1, Some("Clear"), false),
            record(2, 1, Some("Clear"), false),
        ]);
        assert_eq!(most_common_cause(&t), Some(Cause::DrunkDriving));
    }
}
