//! JSON export files on disk.
//!
//! `metrics.json` holds an array of daily records. `seats.json` holds either
//! one seat snapshot or an array of snapshots (one per organization).
//! Filter values (languages, editors) are drawn from every record in the
//! export, whatever its scope or date.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;

use super::{MetricsQuery, MetricsSource};
use crate::analytics::{distinct_editors, distinct_languages};
use crate::error::Result;
use crate::types::{MetricRecord, Scope, SeatSnapshot};

#[derive(Deserialize)]
#[serde(untagged)]
enum SeatsFile {
    Many(Vec<SeatSnapshot>),
    One(SeatSnapshot),
}

fn snapshot_in_scope(snapshot: &SeatSnapshot, scope: &Scope) -> bool {
    (scope.enterprise.is_none() || scope.enterprise == snapshot.enterprise)
        && (scope.organization.is_none() || scope.organization == snapshot.organization)
}

/// Reads metric records and seats from local JSON files.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    metrics_path: PathBuf,
    seats_path: PathBuf,
}

impl JsonFileSource {
    pub fn new(metrics_path: PathBuf, seats_path: PathBuf) -> Self {
        Self {
            metrics_path,
            seats_path,
        }
    }

    async fn read_records(&self) -> Result<Vec<MetricRecord>> {
        let content = tokio::fs::read_to_string(&self.metrics_path).await?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[async_trait]
impl MetricsSource for JsonFileSource {
    async fn fetch_metrics(&self, query: &MetricsQuery) -> Result<Vec<MetricRecord>> {
        let records = self.read_records().await?;
        let total = records.len();

        let mut records: Vec<MetricRecord> = records
            .into_iter()
            .filter(|r| query.range.contains(r.date) && r.in_scope(&query.scope))
            .collect();
        records.sort_by_key(|r| r.date);

        tracing::debug!(
            path = %self.metrics_path.display(),
            total,
            matched = records.len(),
            "read metrics file"
        );
        Ok(records)
    }

    async fn fetch_seats(&self, scope: &Scope) -> Result<Option<SeatSnapshot>> {
        let content = match tokio::fs::read_to_string(&self.seats_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.seats_path.display(), "no seats file");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let snapshot = match serde_json::from_str::<SeatsFile>(&content)? {
            SeatsFile::One(snapshot) => Some(snapshot).filter(|s| snapshot_in_scope(s, scope)),
            SeatsFile::Many(snapshots) => snapshots
                .into_iter()
                .find(|s| snapshot_in_scope(s, scope)),
        };
        Ok(snapshot)
    }

    async fn fetch_languages(&self) -> Result<Vec<String>> {
        Ok(distinct_languages(&self.read_records().await?))
    }

    async fn fetch_editors(&self) -> Result<Vec<String>> {
        Ok(distinct_editors(&self.read_records().await?))
    }
}
