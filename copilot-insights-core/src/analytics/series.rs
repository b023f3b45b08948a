//! Per-day code generation series.

use chrono::NaiveDate;
use serde::Serialize;

use crate::types::{CodeGeneration, MetricRecord};

/// Lines added and deleted on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyLines {
    pub date: NaiveDate,
    pub added: u64,
    pub deleted: u64,
}

/// Lines added/deleted per record, ordered by date. Missing data counts as 0.
pub fn code_generation_series(records: &[MetricRecord]) -> Vec<DailyLines> {
    let mut series: Vec<DailyLines> = records
        .iter()
        .map(|record| {
            let lines = record
                .code_generation
                .as_ref()
                .and_then(|g| g.daily_lines)
                .unwrap_or_default();
            DailyLines {
                date: record.date,
                added: lines.added,
                deleted: lines.deleted,
            }
        })
        .collect();
    series.sort_by_key(|d| d.date);
    series
}

/// Code generation block of the most recent record that has one.
///
/// The user- and agent-initiated change breakdowns are cumulative snapshots,
/// so only the latest one is meaningful.
pub fn latest_code_generation(records: &[MetricRecord]) -> Option<&CodeGeneration> {
    records
        .iter()
        .filter_map(|r| r.code_generation.as_ref().map(|g| (r.date, g)))
        .max_by_key(|(date, _)| *date)
        .map(|(_, generation)| generation)
}
