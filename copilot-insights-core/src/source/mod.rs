//! Query layer: where raw metric records and seat snapshots come from.
//!
//! The aggregation core never performs I/O itself. A [`MetricsSource`]
//! returns the pre-joined records for a date range in a single round trip;
//! two implementations are provided:
//!
//! - [`JsonFileSource`]: reads exported JSON blobs from disk
//! - [`HttpSource`]: calls the dashboard's `/copilot/metrics`,
//!   `/copilot/seats`, `/copilot/languages` and `/copilot/editors` endpoints
//!
//! Neither retries; a failed fetch surfaces as [`Error::Source`](crate::Error::Source)
//! or an IO/JSON error and the caller decides what to show.

mod file;
mod http;

pub use file::JsonFileSource;
pub use http::HttpSource;

use std::sync::Arc;

use async_trait::async_trait;

use crate::analytics::DateRange;
use crate::config::{SourceConfig, SourceKind};
use crate::error::Result;
use crate::types::{MetricRecord, Scope, SeatSnapshot};

/// Parameters of one metrics fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsQuery {
    pub range: DateRange,
    pub scope: Scope,
}

/// Supplier of raw records for the aggregation core.
#[async_trait]
pub trait MetricsSource: Send + Sync {
    /// Daily records within `query.range` for `query.scope`.
    async fn fetch_metrics(&self, query: &MetricsQuery) -> Result<Vec<MetricRecord>>;

    /// Current seat snapshot for `scope`, `None` if there is none.
    async fn fetch_seats(&self, scope: &Scope) -> Result<Option<SeatSnapshot>>;

    /// Sorted language names the language filter can offer.
    async fn fetch_languages(&self) -> Result<Vec<String>>;

    /// Sorted completion editor names the editor filter can offer.
    async fn fetch_editors(&self) -> Result<Vec<String>>;
}

#[async_trait]
impl<T: MetricsSource + ?Sized> MetricsSource for Box<T> {
    async fn fetch_metrics(&self, query: &MetricsQuery) -> Result<Vec<MetricRecord>> {
        (**self).fetch_metrics(query).await
    }

    async fn fetch_seats(&self, scope: &Scope) -> Result<Option<SeatSnapshot>> {
        (**self).fetch_seats(scope).await
    }

    async fn fetch_languages(&self) -> Result<Vec<String>> {
        (**self).fetch_languages().await
    }

    async fn fetch_editors(&self) -> Result<Vec<String>> {
        (**self).fetch_editors().await
    }
}

#[async_trait]
impl<T: MetricsSource + ?Sized> MetricsSource for Arc<T> {
    async fn fetch_metrics(&self, query: &MetricsQuery) -> Result<Vec<MetricRecord>> {
        (**self).fetch_metrics(query).await
    }

    async fn fetch_seats(&self, scope: &Scope) -> Result<Option<SeatSnapshot>> {
        (**self).fetch_seats(scope).await
    }

    async fn fetch_languages(&self) -> Result<Vec<String>> {
        (**self).fetch_languages().await
    }

    async fn fetch_editors(&self) -> Result<Vec<String>> {
        (**self).fetch_editors().await
    }
}

/// Build the source described by the `[source]` config section.
pub fn from_config(config: &SourceConfig) -> Result<Box<dyn MetricsSource>> {
    config.validate()?;
    let source: Box<dyn MetricsSource> = match config.kind {
        SourceKind::File => Box::new(JsonFileSource::new(
            config.metrics_path(),
            config.seats_path(),
        )),
        SourceKind::Http => Box::new(HttpSource::new(config)?),
    };
    Ok(source)
}
