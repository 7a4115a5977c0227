//! Scalar card metrics.

use std::collections::BTreeMap;

use accident_dashboard_accident_models::Cause;
use accident_dashboard_analytics_models::SummaryMetrics;
use accident_dashboard_loader::AccidentTable;

use crate::views::rank_by_count;

/// Computes the card metrics for `table`.
///
/// The mean and the most common cause are `None` for an empty table
/// instead of dividing by zero.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn summary_metrics(table: &AccidentTable) -> SummaryMetrics {
    let total_accidents = table.len() as u64;
    let total_severity: i64 = table.records().iter().map(|r| r.severity_or_zero()).sum();

    let mean_severity =
        (total_accidents > 0).then(|| total_severity as f64 / total_accidents as f64);

    SummaryMetrics {
        total_accidents,
        total_severity,
        mean_severity,
        most_common_cause: most_common_cause(table),
    }
}

/// The most frequent cause label. Ties go to the label that sorts first.
#[must_use]
pub fn most_common_cause(table: &AccidentTable) -> Option<Cause> {
    let mut counts: BTreeMap<Cause, u64> = BTreeMap::new();
    for record in table.records() {
        *counts.entry(record.derived.cause).or_default() += 1;
    }

    rank_by_count(counts, 1, |cause| cause.as_ref())
        .first()
        .map(|(cause, _)| *cause)
}
