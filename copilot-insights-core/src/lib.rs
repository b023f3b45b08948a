//! # copilot-insights-core
//!
//! Core library for copilot-insights - usage analytics for an AI coding
//! assistant rollout.
//!
//! This library provides:
//! - Domain types for daily metric records and seat snapshots
//! - The aggregation core: bucketing, breakdowns, KPIs
//! - Query sources for JSON exports and the dashboard API
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Architecture
//!
//! Data flows through three layers:
//! - **Source:** a [`MetricsSource`] returns pre-joined daily records and the seat snapshot
//! - **Filter:** a time range, language and editor selection narrows the records
//! - **Aggregate:** pure functions in [`analytics`] produce series, breakdowns and KPIs
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use copilot_insights_core::{source, Config, InsightsFilter, InsightsLoader, SystemClock};
//!
//! # async fn run() -> copilot_insights_core::Result<()> {
//! let config = Config::load()?;
//! let loader = InsightsLoader::new(source::from_config(&config.source)?, Arc::new(SystemClock))
//!     .with_scope(config.source.scope.clone())
//!     .with_options(config.insights.summary_options());
//!
//! if let Some(data) = loader.load(&InsightsFilter::default()).await?.into_fresh() {
//!     println!("{} suggestions", data.summary.total_suggestions);
//! }
//! # Ok(())
//! # }
//! ```

// Re-export commonly used items at the crate root
pub use analytics::{
    build_insights, DateRange, InsightsData, InsightsFilter, InsightsLoader, InsightsSummary,
    LoadOutcome, TimeFrame, TimeRange, WeekStart,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use error::{Error, Result};
pub use source::{MetricsQuery, MetricsSource};
pub use types::*;

// Public modules
pub mod analytics;
pub mod clock;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod source;
pub mod types;

#[cfg(test)]
mod test_support;
