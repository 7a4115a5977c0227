//! Plain-text rendering of the dashboard aggregates.

use std::fmt::Write as _;

use accident_dashboard_analytics_models::DashboardAggregates;
use accident_dashboard_server::presenter::{format_thousands, metric_cards};

/// Formats the metric cards and every view as plain text.
#[must_use]
pub fn format_summary(aggregates: &DashboardAggregates) -> String {
    let mut out = String::new();

    for card in metric_cards(&aggregates.metrics) {
        let _ = writeln!(out, "{:<20}{}", card.label, card.value);
    }

    section(&mut out, "Total Accidents by Weather Condition");
    for row in &aggregates.top_weather {
        let _ = writeln!(out, "  {:<30}{:>10}", row.category, row.count);
    }

    section(&mut out, "Casualties by Cause");
    for row in &aggregates.severity_by_cause {
        let _ = writeln!(
            out,
            "  {:<30}{:>10}",
            row.cause.to_string(),
            format_thousands(row.total_severity)
        );
    }

    section(&mut out, "Total Accidents by Hour of the Day");
    for row in &aggregates.by_hour {
        let _ = writeln!(out, "  {:<30}{:>10}", format!("{:02}:00", row.hour), row.count);
    }

    section(
        &mut out,
        "Total Accidents by Road Condition and Weather Condition",
    );
    for row in &aggregates.road_weather {
        let _ = writeln!(
            out,
            "  {:<30}{:>10}",
            format!("{} / {}", row.road_condition, row.weather_condition),
            row.count
        );
    }

    out
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out);
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{}", "-".repeat(title.chars().count()));
}

#[cfg(test)]
mod tests {
    use accident_dashboard_accident_models::{Cause, RoadCondition};
    use accident_dashboard_analytics_models::{
        CategoryCount, CauseSeverity, HourCount, RoadWeatherCount, SummaryMetrics,
    };

    use super::*;

    #[test]
    fn summary_lists_metrics_and_views() {
        let aggregates = DashboardAggregates {
            metrics: SummaryMetrics {
                total_accidents: 1200,
                total_severity: 2500,
                mean_severity: Some(2.5 / 1.2),
                most_common_cause: Some(Cause::Speeding),
            },
            top_weather: vec![CategoryCount {
                category: "Clear".to_string(),
                count: 1200,
            }],
            severity_by_cause: vec![CauseSeverity {
                cause: Cause::Speeding,
                total_severity: 2500,
            }],
            by_hour: vec![HourCount { hour: 7, count: 1200 }],
            road_weather: vec![RoadWeatherCount {
                road_condition: RoadCondition::Normal,
                weather_condition: "Clear".to_string(),
                count: 1200,
            }],
        };

        let text = format_summary(&aggregates);
        assert!(text.contains("Total Casualties    2,500"));
        assert!(text.contains("Total Accidents     1,200"));
        assert!(text.contains("Mean Casualties     2.08"));
        assert!(text.contains("Most Common Cause   Speeding"));
        assert!(text.contains("07:00"));
        assert!(text.contains("Normal / Clear"));
    }

    #[test]
    fn empty_aggregates_show_not_available() {
        let aggregates = DashboardAggregates {
            metrics: SummaryMetrics {
                total_accidents: 0,
                total_severity: 0,
                mean_severity: None,
                most_common_cause: None,
            },
            top_weather: Vec::new(),
            severity_by_cause: Vec::new(),
            by_hour: Vec::new(),
            road_weather: Vec::new(),
        };

        let text = format_summary(&aggregates);
        assert!(text.contains("Mean Casualties     N/A"));
        assert!(text.contains("Casualties by Cause"));
    }
}
