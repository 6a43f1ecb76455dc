//! OTLP/HTTP span sink.
//!
//! Buffers completed spans for the whole run and posts them as a single
//! OTLP JSON document on shutdown. Spans are grouped by service identity
//! into one `resourceSpans` entry per service, the span kind is always
//! SERVER, and every root span starts a fresh trace id.
//!
//! Talks OTLP JSON directly over reqwest rather than pulling in an
//! OpenTelemetry SDK; the document shape is
//! `resourceSpans -> scopeSpans -> spans`.

use crate::ports::{AttrValue, SpanHandle, SpanSink};
use anyhow::{bail, Context, Result};
use chrono::Utc;
use rand::RngCore;
use serde_json::json;
use tracing::info;

const ACCESS_TOKEN_HEADER: &str = "lightstep-access-token";
const SPAN_KIND_SERVER: u32 = 2;
const SCOPE_NAME: &str = "traceforge";

struct SpanRecord {
    service: String,
    name: String,
    trace_id: String,
    span_id: String,
    parent_span_id: Option<String>,
    start_unix_nano: i64,
    end_unix_nano: i64,
    attributes: Vec<(String, AttrValue)>,
    events: Vec<(i64, String)>,
}

pub struct OtlpHttpSink {
    endpoint: String,
    access_token: String,
    client: reqwest::blocking::Client,
    spans: Vec<SpanRecord>,
}

impl OtlpHttpSink {
    pub fn new(endpoint: &str, access_token: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            access_token: access_token.to_string(),
            client: reqwest::blocking::Client::new(),
            spans: Vec::new(),
        }
    }

    /// Assemble the OTLP JSON document for everything buffered so far.
    fn build_payload(&self) -> serde_json::Value {
        // One resourceSpans entry per service, in first-appearance order.
        let mut services: Vec<&str> = Vec::new();
        for record in &self.spans {
            if !services.contains(&record.service.as_str()) {
                services.push(&record.service);
            }
        }

        let resource_spans: Vec<serde_json::Value> = services
            .iter()
            .map(|service| {
                let spans: Vec<serde_json::Value> = self
                    .spans
                    .iter()
                    .filter(|r| r.service == *service)
                    .map(span_json)
                    .collect();
                json!({
                    "resource": {
                        "attributes": [attr_json("service.name", &AttrValue::Str(service.to_string()))]
                    },
                    "scopeSpans": [{
                        "scope": { "name": SCOPE_NAME },
                        "spans": spans
                    }]
                })
            })
            .collect();

        json!({ "resourceSpans": resource_spans })
    }
}

impl SpanSink for OtlpHttpSink {
    fn open_span(&mut self, name: &str, parent: Option<SpanHandle>) -> SpanHandle {
        // Children join their parent's trace; each root starts a new one.
        let (trace_id, parent_span_id) = match parent {
            Some(p) => (self.spans[p.0].trace_id.clone(), Some(self.spans[p.0].span_id.clone())),
            None => (hex_id(16), None),
        };
        self.spans.push(SpanRecord {
            service: name.to_string(),
            name: name.to_string(),
            trace_id,
            span_id: hex_id(8),
            parent_span_id,
            start_unix_nano: now_unix_nano(),
            end_unix_nano: 0,
            attributes: Vec::new(),
            events: Vec::new(),
        });
        SpanHandle(self.spans.len() - 1)
    }

    fn set_attribute(&mut self, span: SpanHandle, key: &str, value: AttrValue) {
        self.spans[span.0].attributes.push((key.to_string(), value));
    }

    fn add_event(&mut self, span: SpanHandle, text: &str) {
        self.spans[span.0].events.push((now_unix_nano(), text.to_string()));
    }

    fn close_span(&mut self, span: SpanHandle) {
        self.spans[span.0].end_unix_nano = now_unix_nano();
    }

    fn shutdown(&mut self) -> Result<()> {
        if self.spans.is_empty() {
            return Ok(());
        }
        let payload = self.build_payload();
        let response = self
            .client
            .post(&self.endpoint)
            .header(ACCESS_TOKEN_HEADER, &self.access_token)
            .json(&payload)
            .send()
            .with_context(|| format!("failed to export spans to {}", self.endpoint))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            bail!("span export rejected with {}: {}", status, body);
        }
        info!(spans = self.spans.len(), endpoint = %self.endpoint, "exported spans");
        self.spans.clear();
        Ok(())
    }
}

fn span_json(record: &SpanRecord) -> serde_json::Value {
    let attributes: Vec<serde_json::Value> = record
        .attributes
        .iter()
        .map(|(key, value)| attr_json(key, value))
        .collect();
    let events: Vec<serde_json::Value> = record
        .events
        .iter()
        .map(|(time, name)| json!({ "timeUnixNano": time.to_string(), "name": name }))
        .collect();

    json!({
        "traceId": record.trace_id,
        "spanId": record.span_id,
        "parentSpanId": record.parent_span_id.as_deref().unwrap_or(""),
        "name": record.name,
        "kind": SPAN_KIND_SERVER,
        "startTimeUnixNano": record.start_unix_nano.to_string(),
        "endTimeUnixNano": record.end_unix_nano.to_string(),
        "attributes": attributes,
        "events": events
    })
}

fn attr_json(key: &str, value: &AttrValue) -> serde_json::Value {
    let value = match value {
        AttrValue::Bool(b) => json!({ "boolValue": b }),
        AttrValue::Str(s) => json!({ "stringValue": s }),
    };
    json!({ "key": key, "value": value })
}

fn hex_id(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    rand::thread_rng().fill_bytes(&mut buf);
    buf.iter().map(|b| format!("{:02x}", b)).collect()
}

fn now_unix_nano() -> i64 {
    Utc::now().timestamp_nanos_opt().unwrap_or(0)
}
