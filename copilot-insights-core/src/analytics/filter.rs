//! Query windows and record filters.
//!
//! Time-range presets are resolved against a [`Clock`] so that "last 28 days"
//! is reproducible in tests. Language and editor filters prune the code
//! completion tree in place; they never drop whole records, so user counts
//! and the other trees are unaffected. They feed only the bucketed series:
//! headline KPIs and breakdowns are computed before they apply.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use super::bucket::TimeFrame;
use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::types::MetricRecord;

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of calendar days covered, both ends included.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Preset query windows offered by the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "7_days")]
    Last7Days,
    #[serde(rename = "14_days")]
    Last14Days,
    #[default]
    #[serde(rename = "28_days")]
    Last28Days,
    #[serde(rename = "current_month")]
    CurrentMonth,
    #[serde(rename = "previous_month")]
    PreviousMonth,
    #[serde(rename = "3_months")]
    Last3Months,
    #[serde(rename = "6_months")]
    Last6Months,
    #[serde(rename = "1_year")]
    LastYear,
    #[serde(rename = "custom")]
    Custom,
}

impl TimeRange {
    pub const ALL: [TimeRange; 9] = [
        TimeRange::Last7Days,
        TimeRange::Last14Days,
        TimeRange::Last28Days,
        TimeRange::CurrentMonth,
        TimeRange::PreviousMonth,
        TimeRange::Last3Months,
        TimeRange::Last6Months,
        TimeRange::LastYear,
        TimeRange::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::Last7Days => "7_days",
            TimeRange::Last14Days => "14_days",
            TimeRange::Last28Days => "28_days",
            TimeRange::CurrentMonth => "current_month",
            TimeRange::PreviousMonth => "previous_month",
            TimeRange::Last3Months => "3_months",
            TimeRange::Last6Months => "6_months",
            TimeRange::LastYear => "1_year",
            TimeRange::Custom => "custom",
        }
    }

    /// Resolve the preset to concrete dates relative to `clock`.
    ///
    /// Day-count presets end today and start N days earlier. Month presets
    /// cover whole calendar months, ending with the current month
    /// (`previous_month` covers only last month). `custom` returns `custom`
    /// and fails when it is missing.
    pub fn resolve(&self, clock: &dyn Clock, custom: Option<DateRange>) -> Result<DateRange> {
        let today = clock.today();
        let this_month = first_of_month(today);

        let range = match self {
            TimeRange::Last7Days => trailing_days(today, 7),
            TimeRange::Last14Days => trailing_days(today, 14),
            TimeRange::Last28Days => trailing_days(today, 28),
            TimeRange::CurrentMonth => whole_months(this_month, 0),
            TimeRange::PreviousMonth => {
                let previous = months_back(this_month, 1);
                whole_months(previous, 0)
            }
            TimeRange::Last3Months => whole_months(months_back(this_month, 2), 2),
            TimeRange::Last6Months => whole_months(months_back(this_month, 5), 5),
            TimeRange::LastYear => whole_months(months_back(this_month, 11), 11),
            TimeRange::Custom => return custom.ok_or(Error::MissingCustomRange),
        };
        Ok(range)
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        TimeRange::ALL
            .into_iter()
            .find(|range| range.as_str() == s)
            .ok_or_else(|| Error::Parse {
                what: "time range",
                value: s.to_string(),
            })
    }
}

fn trailing_days(today: NaiveDate, days: i64) -> DateRange {
    DateRange {
        start: today - Duration::days(days),
        end: today,
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn months_back(first: NaiveDate, months: u32) -> NaiveDate {
    first.checked_sub_months(Months::new(months)).unwrap_or(first)
}

/// From `first` through the last day of the month `extra_months` after it.
fn whole_months(first: NaiveDate, extra_months: u32) -> DateRange {
    let end = first
        .checked_add_months(Months::new(extra_months + 1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(first);
    DateRange { start: first, end }
}

/// Everything the dashboard lets a user pick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsightsFilter {
    pub time_range: TimeRange,
    pub time_frame: TimeFrame,
    pub custom_range: Option<DateRange>,
    /// Languages to keep; empty keeps all
    #[serde(default)]
    pub languages: Vec<String>,
    /// Editors to keep; empty keeps all
    #[serde(default)]
    pub editors: Vec<String>,
}

impl InsightsFilter {
    pub fn date_range(&self, clock: &dyn Clock) -> Result<DateRange> {
        self.time_range.resolve(clock, self.custom_range)
    }

    /// Apply the language and editor selections to the series input.
    pub fn apply_dimensions(&self, records: Vec<MetricRecord>) -> Vec<MetricRecord> {
        let records = filter_by_languages(records, &self.languages);
        filter_by_editors(records, &self.editors)
    }
}

/// Keep records whose date falls inside `range`.
pub fn filter_by_date_range(records: Vec<MetricRecord>, range: &DateRange) -> Vec<MetricRecord> {
    records
        .into_iter()
        .filter(|record| range.contains(record.date))
        .collect()
}

/// Drop every completion leaf whose language is not selected.
///
/// An empty selection keeps everything.
pub fn filter_by_languages(records: Vec<MetricRecord>, languages: &[String]) -> Vec<MetricRecord> {
    if languages.is_empty() {
        return records;
    }

    records
        .into_iter()
        .map(|mut record| {
            if let Some(completions) = record.copilot_ide_code_completions.as_mut() {
                for model in completions
                    .editors
                    .iter_mut()
                    .flat_map(|editor| editor.models.iter_mut())
                {
                    model.languages.retain(|lang| languages.contains(&lang.name));
                }
            }
            record
        })
        .collect()
}

/// Drop every completion editor that is not selected.
///
/// An empty selection keeps everything.
pub fn filter_by_editors(records: Vec<MetricRecord>, editors: &[String]) -> Vec<MetricRecord> {
    if editors.is_empty() {
        return records;
    }

    records
        .into_iter()
        .map(|mut record| {
            if let Some(completions) = record.copilot_ide_code_completions.as_mut() {
                completions
                    .editors
                    .retain(|editor| editors.contains(&editor.name));
            }
            record
        })
        .collect()
}

/// Sorted, distinct language names a language filter can select.
///
/// Covers both the top-level completion languages and the per-model leaves.
pub fn distinct_languages(records: &[MetricRecord]) -> Vec<String> {
    let mut names = BTreeSet::new();
    for completions in records
        .iter()
        .filter_map(|r| r.copilot_ide_code_completions.as_ref())
    {
        names.extend(completions.languages.iter().map(|lang| lang.name.clone()));
        names.extend(
            completions
                .editors
                .iter()
                .flat_map(|editor| editor.models.iter())
                .flat_map(|model| model.languages.iter())
                .map(|lang| lang.name.clone()),
        );
    }
    names.into_iter().collect()
}

/// Sorted, distinct completion editor names an editor filter can select.
pub fn distinct_editors(records: &[MetricRecord]) -> Vec<String> {
    records
        .iter()
        .flat_map(|r| r.completion_editors())
        .map(|editor| editor.name.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
