//! HTTP client for the metrics API.
//!
//! Endpoints:
//! - `GET {base}/copilot/metrics?startDate=yyyy-MM-dd&endDate=yyyy-MM-dd[&enterprise&organization&team]`
//! - `GET {base}/copilot/seats[?enterprise&organization]`, 404 when no snapshot exists
//! - `GET {base}/copilot/languages` and `GET {base}/copilot/editors`, sorted
//!   names seen over the backend's recent window

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::de::DeserializeOwned;

use super::{MetricsQuery, MetricsSource};
use crate::config::SourceConfig;
use crate::error::{Error, Result};
use crate::types::{MetricRecord, Scope, SeatSnapshot};

/// Fetches records from the dashboard backend.
pub struct HttpSource {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpSource {
    /// Create a client from the `[source]` config section.
    ///
    /// Returns an error if `api_base_url` is missing.
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let base_url = config
            .api_base_url
            .clone()
            .ok_or_else(|| Error::Config("source.api_base_url is required".to_string()))?
            .trim_end_matches('/')
            .to_string();

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    /// URL for a metrics query.
    pub fn metrics_url(&self, query: &MetricsQuery) -> String {
        let mut params = vec![
            ("startDate", query.range.start.format("%Y-%m-%d").to_string()),
            ("endDate", query.range.end.format("%Y-%m-%d").to_string()),
        ];
        push_scope(&mut params, &query.scope, true);
        format!("{}/copilot/metrics?{}", self.base_url, encode_query(&params))
    }

    /// URL for a seats query. Seats are not scoped by team.
    pub fn seats_url(&self, scope: &Scope) -> String {
        let mut params = Vec::new();
        push_scope(&mut params, scope, false);
        if params.is_empty() {
            format!("{}/copilot/seats", self.base_url)
        } else {
            format!("{}/copilot/seats?{}", self.base_url, encode_query(&params))
        }
    }

    /// URL of a filter-value list, `languages` or `editors`.
    pub fn values_url(&self, kind: &str) -> String {
        format!("{}/copilot/{}", self.base_url, kind)
    }

    async fn fetch_values(&self, kind: &str) -> Result<Vec<String>> {
        let url = self.values_url(kind);
        tracing::debug!(%url, "fetching filter values");
        self.get_json(&url)
            .await?
            .ok_or_else(|| Error::Source(format!("{} endpoint not found: {}", kind, url)))
    }

    /// GET `url` and decode the JSON body. `Ok(None)` on 404.
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<Option<T>> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Source(format!("HTTP request failed: {}", e)))?;

        let status = response.status();

        if status.is_success() {
            let body: T = response
                .json()
                .await
                .map_err(|e| Error::Source(format!("failed to parse response: {}", e)))?;
            Ok(Some(body))
        } else if status == reqwest::StatusCode::NOT_FOUND {
            Ok(None)
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown".to_string());
            Err(Error::Source(format!("API error ({}): {}", status, error_text)))
        }
    }
}

fn push_scope(params: &mut Vec<(&'static str, String)>, scope: &Scope, with_team: bool) {
    if let Some(enterprise) = &scope.enterprise {
        params.push(("enterprise", enterprise.clone()));
    }
    if let Some(organization) = &scope.organization {
        params.push(("organization", organization.clone()));
    }
    if with_team {
        if let Some(team) = &scope.team {
            params.push(("team", team.clone()));
        }
    }
}

fn encode_query(params: &[(&str, String)]) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

#[async_trait]
impl MetricsSource for HttpSource {
    async fn fetch_metrics(&self, query: &MetricsQuery) -> Result<Vec<MetricRecord>> {
        let url = self.metrics_url(query);
        tracing::debug!(%url, "fetching metrics");

        // A missing route is a deployment problem, not an empty window
        self.get_json(&url)
            .await?
            .ok_or_else(|| Error::Source(format!("metrics endpoint not found: {}", url)))
    }

    async fn fetch_seats(&self, scope: &Scope) -> Result<Option<SeatSnapshot>> {
        let url = self.seats_url(scope);
        tracing::debug!(%url, "fetching seats");
        self.get_json(&url).await
    }

    async fn fetch_languages(&self) -> Result<Vec<String>> {
        self.fetch_values("languages").await
    }

    async fn fetch_editors(&self) -> Result<Vec<String>> {
        self.fetch_values("editors").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::DateRange;
    use crate::test_support::day;

    fn source() -> HttpSource {
        let config = SourceConfig {
            api_base_url: Some("https://insights.example.com/api/".to_string()),
            ..Default::default()
        };
        HttpSource::new(&config).unwrap()
    }

    #[test]
    fn test_requires_base_url() {
        assert!(HttpSource::new(&SourceConfig::default()).is_err());
    }

    #[test]
    fn test_metrics_url() {
        let query = MetricsQuery {
            range: DateRange::new(day(2024, 3, 1), day(2024, 3, 31)).unwrap(),
            scope: Scope {
                organization: Some("acme corp".to_string()),
                team: Some("platform".to_string()),
                ..Default::default()
            },
        };

        assert_eq!(
            source().metrics_url(&query),
            "https://insights.example.com/api/copilot/metrics?startDate=2024-03-01&endDate=2024-03-31&organization=acme%20corp&team=platform"
        );
    }

    #[test]
    fn test_seats_url_ignores_team() {
        let scope = Scope {
            enterprise: Some("big".to_string()),
            team: Some("platform".to_string()),
            ..Default::default()
        };
        assert_eq!(
            source().seats_url(&scope),
            "https://insights.example.com/api/copilot/seats?enterprise=big"
        );
        assert_eq!(
            source().seats_url(&Scope::default()),
            "https://insights.example.com/api/copilot/seats"
        );
    }

    #[test]
    fn test_values_url() {
        assert_eq!(
            source().values_url("languages"),
            "https://insights.example.com/api/copilot/languages"
        );
        assert_eq!(
            source().values_url("editors"),
            "https://insights.example.com/api/copilot/editors"
        );
    }
}
