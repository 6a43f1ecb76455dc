//! Metrics query response extraction.
//!
//! Parses the timeseries-query response from the telemetry API into a
//! service graph. Each series carries group labels of the form
//! `name=value`; the client/server service-name labels of one series
//! describe one observed call pair.

use crate::domain::graph::ServiceGraph;
use crate::ports::GraphExtractor;
use anyhow::{Context, Result};
use serde::Deserialize;

const CLIENT_LABEL: &str = "client.service.name";
const SERVER_LABEL: &str = "server.service.name";

/// Response envelope: `data.attributes.series[].group-labels`.
#[derive(Debug, Deserialize)]
pub struct QueryResponse {
    pub data: QueryData,
}

#[derive(Debug, Deserialize)]
pub struct QueryData {
    pub attributes: QueryAttributes,
}

#[derive(Debug, Deserialize)]
pub struct QueryAttributes {
    #[serde(default)]
    pub series: Vec<Series>,
}

#[derive(Debug, Deserialize)]
pub struct Series {
    #[serde(rename = "group-labels", default)]
    pub group_labels: Vec<String>,
}

pub struct MetricsResponseExtractor;

impl GraphExtractor for MetricsResponseExtractor {
    fn extract(&self, input: &str) -> Result<ServiceGraph> {
        let response: QueryResponse =
            serde_json::from_str(input).context("malformed metrics query response")?;

        let mut graph = ServiceGraph::new();
        for (idx, series) in response.data.attributes.series.iter().enumerate() {
            let client = label_value(&series.group_labels, CLIENT_LABEL)
                .with_context(|| format!("series {}: no '{}' label", idx, CLIENT_LABEL))?;
            let server = label_value(&series.group_labels, SERVER_LABEL)
                .with_context(|| format!("series {}: no '{}' label", idx, SERVER_LABEL))?;

            // An empty value after the '=' means "no node" for that side.
            if !client.is_empty() {
                graph.add_node(client);
            }
            if !server.is_empty() {
                graph.add_node(server);
            }
            if !client.is_empty() && !server.is_empty() && client != server {
                graph.add_edge(client, server);
            }
        }
        Ok(graph)
    }
}

/// Find the label whose name contains `fragment` and return its value: the
/// substring after the first `=`, trimmed. A label with no `=` yields an
/// empty value.
fn label_value<'a>(labels: &'a [String], fragment: &str) -> Option<&'a str> {
    labels
        .iter()
        .find(|l| l.contains(fragment))
        .map(|l| l.split_once('=').map_or("", |(_, value)| value).trim())
}
