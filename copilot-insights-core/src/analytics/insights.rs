//! Dashboard data assembly.
//!
//! [`build_insights`] turns a window of raw records into everything the
//! dashboard renders. [`InsightsLoader`] wraps it with a [`MetricsSource`]
//! fetch and discards results that were overtaken by a newer request.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;

use super::breakdown::{
    breakdown_by_chat_mode, breakdown_by_editor, breakdown_by_language, breakdown_by_model,
    BreakdownEntry, UsageShare,
};
use super::bucket::{bucket_metrics_with, BucketedRow, WeekStart};
use super::filter::{filter_by_date_range, InsightsFilter};
use super::series::{code_generation_series, latest_code_generation, DailyLines};
use super::summary::{summarize, InsightsSummary, SummaryOptions};
use crate::clock::Clock;
use crate::error::Result;
use crate::source::{MetricsQuery, MetricsSource};
use crate::types::{CodeGeneration, MetricRecord, Scope, SeatSnapshot};

/// Everything one dashboard view needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightsData {
    /// Records inside the date window, before language and editor filtering
    pub metrics: Vec<MetricRecord>,
    pub seats: Option<SeatSnapshot>,
    /// Time series bucketed by the filter's time frame, restricted to the
    /// selected languages and editors
    pub processed: Vec<BucketedRow>,
    pub languages: Vec<BreakdownEntry>,
    pub editors: Vec<BreakdownEntry>,
    pub chat_modes: Vec<UsageShare>,
    pub models: Vec<UsageShare>,
    pub code_generation: Vec<DailyLines>,
    /// Code generation block of the latest record carrying one
    pub latest_changes: Option<CodeGeneration>,
    pub summary: InsightsSummary,
}

/// Filter, bucket, break down and summarize a window of records.
///
/// The language and editor selections narrow only the bucketed series. The
/// summary, breakdowns and code generation views always cover every language
/// and editor in the window. Fails only when the filter's time range cannot
/// be resolved.
pub fn build_insights(
    records: Vec<MetricRecord>,
    seats: Option<SeatSnapshot>,
    filter: &InsightsFilter,
    clock: &dyn Clock,
    options: &SummaryOptions,
    week_start: WeekStart,
) -> Result<InsightsData> {
    let range = filter.date_range(clock)?;
    let metrics = filter_by_date_range(records, &range);

    let processed = bucket_metrics_with(
        &filter.apply_dimensions(metrics.clone()),
        filter.time_frame,
        week_start,
    );
    let summary = summarize(&metrics, seats.as_ref(), clock, options);

    Ok(InsightsData {
        processed,
        languages: breakdown_by_language(&metrics),
        editors: breakdown_by_editor(&metrics),
        chat_modes: breakdown_by_chat_mode(&metrics),
        models: breakdown_by_model(&metrics),
        code_generation: code_generation_series(&metrics),
        latest_changes: latest_code_generation(&metrics).cloned(),
        summary,
        seats,
        metrics,
    })
}

/// Result of [`InsightsLoader::load`].
#[derive(Debug)]
pub enum LoadOutcome {
    /// Latest request; safe to display
    Fresh(Box<InsightsData>),
    /// A newer load started while this one was in flight
    Superseded,
}

impl LoadOutcome {
    /// The data, if it is still current.
    pub fn into_fresh(self) -> Option<InsightsData> {
        match self {
            LoadOutcome::Fresh(data) => Some(*data),
            LoadOutcome::Superseded => None,
        }
    }
}

/// Fetches and assembles insights, tagging each request with a generation.
pub struct InsightsLoader<S: MetricsSource> {
    source: S,
    clock: Arc<dyn Clock>,
    scope: Scope,
    options: SummaryOptions,
    week_start: WeekStart,
    generation: AtomicU64,
}

impl<S: MetricsSource> InsightsLoader<S> {
    pub fn new(source: S, clock: Arc<dyn Clock>) -> Self {
        Self {
            source,
            clock,
            scope: Scope::default(),
            options: SummaryOptions::default(),
            week_start: WeekStart::default(),
            generation: AtomicU64::new(0),
        }
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_options(mut self, options: SummaryOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_week_start(mut self, week_start: WeekStart) -> Self {
        self.week_start = week_start;
        self
    }

    /// Generation of the most recently started load.
    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Fetch records and seats for `filter` and build insights.
    ///
    /// A seats failure is logged and treated as no snapshot. If another
    /// `load` started before this one finished, the result is dropped and
    /// [`LoadOutcome::Superseded`] is returned.
    pub async fn load(&self, filter: &InsightsFilter) -> Result<LoadOutcome> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let range = filter.date_range(self.clock.as_ref())?;
        let query = MetricsQuery {
            range,
            scope: self.scope.clone(),
        };

        tracing::debug!(
            generation,
            start = %range.start,
            end = %range.end,
            time_frame = %filter.time_frame,
            "loading insights"
        );

        let records = self.source.fetch_metrics(&query).await?;
        let seats = match self.source.fetch_seats(&self.scope).await {
            Ok(seats) => seats,
            Err(e) => {
                tracing::warn!(error = %e, "failed to fetch seats, continuing without");
                None
            }
        };

        let data = build_insights(
            records,
            seats,
            filter,
            self.clock.as_ref(),
            &self.options,
            self.week_start,
        )?;

        let latest = self.current_generation();
        if latest != generation {
            tracing::debug!(generation, latest, "discarding superseded insights");
            return Ok(LoadOutcome::Superseded);
        }

        Ok(LoadOutcome::Fresh(Box::new(data)))
    }
}
