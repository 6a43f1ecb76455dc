//! Blocking client for the telemetry timeseries-query API.
//!
//! Issues the service-graph query over a recent window and hands the raw
//! response body to the metrics extraction strategy. Any failure here means
//! "no graph available": the run logs a diagnostic and skips synthesis.

use chrono::{Duration, Utc};
use reqwest::StatusCode;
use serde_json::json;
use tracing::{debug, error};

/// Delta of the service-graph request counter, grouped by the client and
/// server service-name labels.
const SERVICE_GRAPH_QUERY: &str = "metric traces_service_graph_request_total \
     | delta | group_by [\"client.service.name\", \"server.service.name\"], sum";

const LOOKBACK_MINUTES: i64 = 5;

pub struct MetricsQueryClient {
    url: String,
    api_token: String,
    client: reqwest::blocking::Client,
}

impl MetricsQueryClient {
    pub fn new(api_base: &str, org: &str, project: &str, api_token: &str) -> Self {
        let url = format!(
            "{}/{}/projects/{}/telemetry/query_timeseries",
            api_base.trim_end_matches('/'),
            org,
            project
        );
        Self {
            url,
            api_token: api_token.to_string(),
            client: reqwest::blocking::Client::new(),
        }
    }

    /// POST the service-graph query. Returns the raw response body on
    /// success, `None` when the request fails for any reason.
    pub fn fetch_service_graph(&self) -> Option<String> {
        let youngest = Utc::now();
        let oldest = youngest - Duration::minutes(LOOKBACK_MINUTES);
        let body = json!({
            "data": {
                "attributes": {
                    "input-language": "tql",
                    "oldest-time": oldest.to_rfc3339(),
                    "youngest-time": youngest.to_rfc3339(),
                    "query": SERVICE_GRAPH_QUERY,
                }
            }
        });
        debug!(url = %self.url, "querying service graph");

        let result = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_token)
            .json(&body)
            .send();

        match result {
            Ok(response) if response.status() == StatusCode::OK => match response.text() {
                Ok(text) => Some(text),
                Err(e) => {
                    error!("failed to read metrics response body: {}", e);
                    None
                }
            },
            Ok(response) => {
                let status = response.status();
                let text = response.text().unwrap_or_default();
                error!(%status, "metrics query failed: {}", text);
                None
            }
            Err(e) => {
                error!("metrics query transport error: {}", e);
                None
            }
        }
    }
}
