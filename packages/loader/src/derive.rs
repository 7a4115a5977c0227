//! Column-wise derivation of the dashboard fields.
//!
//! Each derived column is produced by mapping one pure function over an
//! input column. The columns are zipped back onto the raw rows at the end.

use accident_dashboard_accident_models::{
    AccidentRecord, Cause, DerivedFields, RawAccident, RoadCondition, fill_weather,
};
use chrono::{Datelike as _, Timelike as _};

/// The derived columns for a batch of raw rows. All vectors have the same
/// length as the input.
#[derive(Debug, Default)]
pub(crate) struct DerivedColumns {
    pub hour: Vec<u32>,
    pub year: Vec<i32>,
    pub weather_condition: Vec<String>,
    pub road_condition: Vec<RoadCondition>,
    pub cause: Vec<Cause>,
}

impl DerivedColumns {
    pub(crate) fn compute(rows: &[RawAccident]) -> Self {
        Self {
            hour: rows.iter().map(|r| r.start_time.hour()).collect(),
            year: rows.iter().map(|r| r.start_time.year()).collect(),
            weather_condition: rows
                .iter()
                .map(|r| fill_weather(r.weather_condition.as_deref()))
                .collect(),
            road_condition: rows
                .iter()
                .map(|r| RoadCondition::from_amenity(r.amenity))
                .collect(),
            cause: rows.iter().map(|r| Cause::from_severity(r.severity)).collect(),
        }
    }
}

/// Attaches derived fields to every raw row.
pub(crate) fn derive_records(rows: Vec<RawAccident>) -> Vec<AccidentRecord> {
    let columns = DerivedColumns::compute(&rows);

    rows.into_iter()
        .zip(columns.hour)
        .zip(columns.year)
        .zip(columns.weather_condition)
        .zip(columns.road_condition)
        .zip(columns.cause)
        .map(
            |(((((raw, hour), year), weather_condition), road_condition), cause)| AccidentRecord {
                raw,
                derived: DerivedFields {
                    hour,
                    year,
                    weather_condition,
                    road_condition,
                    cause,
                },
            },
        )
        .collect()
}
