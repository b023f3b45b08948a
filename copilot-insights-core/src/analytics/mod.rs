//! Aggregation core for the insights dashboard
//!
//! Turns daily [`MetricRecord`](crate::types::MetricRecord)s into:
//! - Time series bucketed by day, week or month ([`bucket`])
//! - Language, editor, chat mode and model breakdowns ([`breakdown`])
//! - Headline KPIs ([`summary`])
//! - Per-day code generation series ([`series`])
//! - Seat roster search, filters and sorting ([`seats`])
//!
//! Everything here is pure and synchronous except [`InsightsLoader`], which
//! pairs a [`MetricsSource`](crate::source::MetricsSource) with the
//! aggregation and drops superseded results.

pub mod aggregate;
pub mod breakdown;
pub mod bucket;
pub mod filter;
pub mod insights;
pub mod rates;
pub mod seats;
pub mod series;
pub mod summary;

pub use aggregate::{aggregate_bucket, BucketTotals};
pub use breakdown::{
    breakdown_by_chat_mode, breakdown_by_editor, breakdown_by_language, breakdown_by_model,
    BreakdownEntry, UsageShare,
};
pub use bucket::{
    bucket_key, bucket_metrics, bucket_metrics_with, bucket_start, BucketedRow, TimeFrame,
    WeekStart,
};
pub use filter::{
    distinct_editors, distinct_languages, filter_by_date_range, filter_by_editors,
    filter_by_languages, DateRange, InsightsFilter, TimeRange,
};
pub use insights::{build_insights, InsightsData, InsightsLoader, LoadOutcome};
pub use rates::percentage;
pub use seats::{
    filter_seats, query_seats, seat_editors, seat_teams, sort_seats, SeatQuery, SeatSortField,
    SortDirection,
};
pub use series::{code_generation_series, latest_code_generation, DailyLines};
pub use summary::{
    count_active_seats, latest_most_used_model, summarize, InsightsSummary, SummaryOptions,
    DEFAULT_ACTIVE_SEAT_WINDOW_DAYS, DEFAULT_MOST_USED_MODEL,
};
