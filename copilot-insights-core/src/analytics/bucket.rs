//! Time bucketing of daily records.
//!
//! Every record maps to exactly one bucket key under a given [`TimeFrame`].
//! Keys are zero-padded ISO strings (`yyyy-MM-dd` or `yyyy-MM`), so sorting
//! them as strings sorts them by date.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use super::aggregate::{aggregate_bucket, BucketTotals};
use crate::error::Error;
use crate::format::format_bucket_label;
use crate::types::MetricRecord;

/// Granularity of a time series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFrame {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl TimeFrame {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeFrame::Daily => "daily",
            TimeFrame::Weekly => "weekly",
            TimeFrame::Monthly => "monthly",
        }
    }
}

impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeFrame {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(TimeFrame::Daily),
            "weekly" => Ok(TimeFrame::Weekly),
            "monthly" => Ok(TimeFrame::Monthly),
            other => Err(Error::Parse {
                what: "time frame",
                value: other.to_string(),
            }),
        }
    }
}

/// First day of a weekly bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    /// ISO 8601 weeks
    #[default]
    Monday,
    /// US calendar weeks
    Sunday,
}

impl WeekStart {
    fn weekday(self) -> Weekday {
        match self {
            WeekStart::Monday => Weekday::Mon,
            WeekStart::Sunday => Weekday::Sun,
        }
    }
}

/// First calendar day of the bucket containing `date`.
pub fn bucket_start(date: NaiveDate, frame: TimeFrame, week_start: WeekStart) -> NaiveDate {
    match frame {
        TimeFrame::Daily => date,
        TimeFrame::Weekly => date.week(week_start.weekday()).first_day(),
        TimeFrame::Monthly => date.with_day(1).unwrap_or(date),
    }
}

/// Bucket key for `date`: `yyyy-MM-dd` for daily and weekly, `yyyy-MM` for monthly.
pub fn bucket_key(date: NaiveDate, frame: TimeFrame, week_start: WeekStart) -> String {
    let start = bucket_start(date, frame, week_start);
    match frame {
        TimeFrame::Daily | TimeFrame::Weekly => start.format("%Y-%m-%d").to_string(),
        TimeFrame::Monthly => start.format("%Y-%m").to_string(),
    }
}

/// One row of a bucketed time series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketedRow {
    /// Bucket key; rows are sorted by it
    pub date: String,
    /// Chart label ("Mar 4", "Mar 2024")
    pub display_date: String,
    /// Number of daily records folded into the row
    pub days: usize,
    #[serde(flatten)]
    pub totals: BucketTotals,
}

/// Bucket records by `frame` using ISO (Monday-start) weeks.
pub fn bucket_metrics(records: &[MetricRecord], frame: TimeFrame) -> Vec<BucketedRow> {
    bucket_metrics_with(records, frame, WeekStart::default())
}

/// Bucket records by `frame`, one row per distinct key, ascending by key.
///
/// The display label is derived from the bucket itself rather than from any
/// record in it, so unsorted input cannot mislabel a row.
pub fn bucket_metrics_with(
    records: &[MetricRecord],
    frame: TimeFrame,
    week_start: WeekStart,
) -> Vec<BucketedRow> {
    let mut groups: BTreeMap<String, (NaiveDate, Vec<&MetricRecord>)> = BTreeMap::new();

    for record in records {
        let start = bucket_start(record.date, frame, week_start);
        groups
            .entry(bucket_key(record.date, frame, week_start))
            .or_insert_with(|| (start, Vec::new()))
            .1
            .push(record);
    }

    tracing::debug!(
        records = records.len(),
        buckets = groups.len(),
        frame = %frame,
        "bucketed metrics"
    );

    groups
        .into_iter()
        .map(|(key, (start, group))| BucketedRow {
            date: key,
            display_date: format_bucket_label(start, frame),
            days: group.len(),
            totals: aggregate_bucket(&group),
        })
        .collect()
}
