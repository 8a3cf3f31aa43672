mod elements;
pub mod query;

use crate::config::OverpassConfig;
use crate::constants::*;
use crate::error::{AppError, Result};
use crate::models::{FeatureTable, RoadEdge};
use crate::osm::TagFilter;
use crate::services::provider::OsmProvider;
use async_trait::async_trait;
use elements::{OverpassElement, OverpassResponse};
use geo::Polygon;
use reqwest::Client;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Primary Overpass API endpoints with automatic fallback
const OVERPASS_ENDPOINTS: &[&str] = &[
    "https://overpass-api.de/api/interpreter", // Official main endpoint
    "https://overpass.private.coffee/api/interpreter", // Community mirror
    "https://maps.mail.ru/osm/tools/overpass/api/interpreter", // Mail.ru mirror
];

/// OSM data provider backed by the Overpass API.
#[derive(Clone)]
pub struct OverpassClient {
    client: Client,
    endpoints: Vec<String>,
    current_endpoint_idx: Arc<AtomicUsize>,
    timeout_secs: u64,
    max_retries: usize,
}

impl OverpassClient {
    pub fn new() -> Self {
        Self::with_config(&OverpassConfig::default())
    }

    pub fn with_config(config: &OverpassConfig) -> Self {
        let endpoints: Vec<String> = match &config.endpoint {
            Some(endpoint) => vec![endpoint.clone()],
            None => OVERPASS_ENDPOINTS.iter().map(|s| s.to_string()).collect(),
        };

        OverpassClient {
            client: Client::new(),
            endpoints,
            current_endpoint_idx: Arc::new(AtomicUsize::new(0)),
            timeout_secs: config.timeout_secs,
            max_retries: config.max_retries,
        }
    }

    /// Get the next endpoint to try (round-robin)
    fn get_next_endpoint(&self) -> String {
        let idx = self.current_endpoint_idx.fetch_add(1, Ordering::Relaxed);
        self.endpoints[idx % self.endpoints.len()].clone()
    }

    /// Execute a query, retrying with exponential backoff on timeouts,
    /// rate limiting and gateway timeouts.
    async fn execute_query(&self, query: &str, query_type: &str) -> Result<Vec<OverpassElement>> {
        let mut retry_count = 0;

        loop {
            let endpoint = self.get_next_endpoint();

            let response_result = self
                .client
                .post(&endpoint)
                .header("Content-Type", "application/x-www-form-urlencoded")
                .body(format!("data={}", urlencoding::encode(query)))
                .timeout(std::time::Duration::from_secs(self.timeout_secs))
                .send()
                .await;

            let response = match response_result {
                Ok(resp) => resp,
                Err(e) => {
                    let error_msg = if e.is_timeout() {
                        "Request timed out".to_string()
                    } else {
                        format!("Request failed: {}", e)
                    };

                    if retry_count < self.max_retries {
                        retry_count += 1;
                        let backoff_ms = 1000 * (2_u64.pow(retry_count as u32));

                        tracing::warn!(
                            "{} {} ({}), retrying in {}ms (attempt {}/{})",
                            query_type,
                            error_msg,
                            endpoint,
                            backoff_ms,
                            retry_count + 1,
                            self.max_retries + 1
                        );

                        tokio::time::sleep(std::time::Duration::from_millis(backoff_ms)).await;
                        continue;
                    }

                    return Err(AppError::LayerFetch(format!(
                        "{}: {} after {} attempts",
                        query_type,
                        error_msg,
                        self.max_retries + 1
                    )));
                }
            };

            let status = response.status();

            if status.is_success() {
                let api_response: OverpassResponse = response.json().await.map_err(|e| {
                    AppError::LayerFetch(format!(
                        "{}: failed to parse response: {}",
                        query_type, e
                    ))
                })?;

                tracing::debug!(
                    "{} returned {} elements",
                    query_type,
                    api_response.elements.len()
                );
                return Ok(api_response.elements);
            }

            let is_retryable = status.as_u16() == OVERPASS_HTTP_TOO_MANY_REQUESTS
                || status.as_u16() == OVERPASS_HTTP_GATEWAY_TIMEOUT;

            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            if is_retryable && retry_count < self.max_retries {
                retry_count += 1;
                let backoff_ms = 1000 * (2_u64.pow(retry_count as u32));

                tracing::warn!(
                    "{} returned HTTP {}, retrying in {}ms (attempt {}/{})",
                    query_type,
                    status,
                    backoff_ms,
                    retry_count + 1,
                    self.max_retries + 1
                );

                tokio::time::sleep(std::time::Duration::from_millis(backoff_ms)).await;
                continue;
            }

            return Err(AppError::LayerFetch(format!(
                "{}: HTTP {}: {}",
                query_type, status, error_text
            )));
        }
    }
}

impl Default for OverpassClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OsmProvider for OverpassClient {
    async fn features_from_polygon(
        &self,
        polygon: &Polygon<f64>,
        filter: &TagFilter,
    ) -> Result<FeatureTable> {
        let query = query::features_query(polygon, filter, self.timeout_secs);
        tracing::debug!("Overpass feature query: {}", query);

        let elements = self.execute_query(&query, "Feature query").await?;
        Ok(elements::into_feature_records(elements))
    }

    async fn graph_from_polygon(&self, polygon: &Polygon<f64>) -> Result<Vec<RoadEdge>> {
        let query = query::highway_query(polygon, self.timeout_secs);
        tracing::debug!("Overpass street network query: {}", query);

        let elements = self.execute_query(&query, "Street network query").await?;
        Ok(elements::into_road_edges(elements))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_override_replaces_mirror_list() {
        let client = OverpassClient::with_config(&OverpassConfig {
            endpoint: Some("http://localhost:1/api/interpreter".to_string()),
            timeout_secs: 5,
            max_retries: 0,
        });
        assert_eq!(client.endpoints.len(), 1);
        assert_eq!(client.get_next_endpoint(), "http://localhost:1/api/interpreter");
    }

    #[test]
    fn endpoints_rotate_round_robin() {
        let client = OverpassClient::new();
        let first = client.get_next_endpoint();
        let second = client.get_next_endpoint();
        assert_ne!(first, second);
        for _ in 0..OVERPASS_ENDPOINTS.len() - 2 {
            client.get_next_endpoint();
        }
        assert_eq!(client.get_next_endpoint(), first);
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_layer_fetch_error() {
        let client = OverpassClient::with_config(&OverpassConfig {
            endpoint: Some("http://127.0.0.1:9/api/interpreter".to_string()),
            timeout_secs: 2,
            max_retries: 0,
        });
        let area = crate::models::BoundingBox::new(0.0, 0.0, 0.01, 0.01).to_polygon();
        let result = client.graph_from_polygon(&area).await;
        assert!(matches!(result, Err(AppError::LayerFetch(_))));
    }
}
