//! The four aggregate views.
//!
//! Each query reads the table and shares no state with the others. An
//! empty table yields empty views.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};

use accident_dashboard_accident_models::{Cause, RoadCondition};
use accident_dashboard_analytics_models::{
    CategoryCount, CauseSeverity, HourCount, RoadWeatherCount,
};
use accident_dashboard_loader::AccidentTable;

/// Sorts `(key, count)` pairs by count descending, then by the key's label
/// ascending, and keeps the first `k`.
pub(crate) fn rank_by_count<K>(
    counts: impl IntoIterator<Item = (K, u64)>,
    k: usize,
    label: impl Fn(&K) -> &str,
) -> Vec<(K, u64)> {
    let mut ranked: Vec<(K, u64)> = counts.into_iter().collect();
    ranked.sort_by(|(a, a_count), (b, b_count)| {
        (Reverse(a_count), label(a)).cmp(&(Reverse(b_count), label(b)))
    });
    ranked.truncate(k);
    ranked
}

/// The `k` most frequent weather conditions.
///
/// Ties on count are broken by weather name, ascending.
#[must_use]
pub fn top_weather(table: &AccidentTable, k: usize) -> Vec<CategoryCount> {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for record in table.records() {
        *counts.entry(record.derived.weather_condition.as_str()).or_default() += 1;
    }

    rank_by_count(counts, k, |weather| *weather)
        .into_iter()
        .map(|(category, count)| CategoryCount {
            category: category.to_string(),
            count,
        })
        .collect()
}

/// Sum of `Severity` per cause, one row per cause present, in label order.
#[must_use]
pub fn severity_by_cause(table: &AccidentTable) -> Vec<CauseSeverity> {
    let mut sums: BTreeMap<&'static str, (Cause, i64)> = BTreeMap::new();
    for record in table.records() {
        let cause = record.derived.cause;
        sums.entry(cause.into()).or_insert((cause, 0)).1 += record.severity_or_zero();
    }

    sums.into_values()
        .map(|(cause, total_severity)| CauseSeverity {
            cause,
            total_severity,
        })
        .collect()
}

/// Accident count per hour, one row per hour present, ascending.
#[must_use]
pub fn accidents_by_hour(table: &AccidentTable) -> Vec<HourCount> {
    let mut counts: BTreeMap<u32, u64> = BTreeMap::new();
    for record in table.records() {
        *counts.entry(record.derived.hour).or_default() += 1;
    }

    counts
        .into_iter()
        .map(|(hour, count)| HourCount { hour, count })
        .collect()
}

/// Accident count per (road condition, weather condition), keeping only
/// weather values that appear in `top`.
///
/// Rows are ordered by road label, then weather name.
#[must_use]
pub fn road_weather_counts(table: &AccidentTable, top: &[CategoryCount]) -> Vec<RoadWeatherCount> {
    let allowed: BTreeSet<&str> = top.iter().map(|c| c.category.as_str()).collect();

    let mut counts: BTreeMap<(&'static str, &str), (RoadCondition, u64)> = BTreeMap::new();
    for record in table.records() {
        let weather = record.derived.weather_condition.as_str();
        if !allowed.contains(weather) {
            continue;
        }
        let road = record.derived.road_condition;
        counts.entry((road.into(), weather)).or_insert((road, 0)).1 += 1;
    }

    counts
        .into_iter()
        .map(|((_, weather), (road_condition, count))| RoadWeatherCount {
            road_condition,
            weather_condition: weather.to_string(),
            count,
        })
        .collect()
}
