//! Service-mesh CLI text extraction.
//!
//! Parses the access-control CLI dump ("intents" listing) into a service
//! graph. The format is line oriented:
//!
//! ```text
//! checkout in namespace shop calls:
//!   - payments in namespace shop
//!   - inventory in namespace shop
//! ```
//!
//! A `calls:` header names the current source service; each following
//! `  - ` line names one target it calls. Anything else is ignored.

use crate::domain::graph::ServiceGraph;
use crate::ports::GraphExtractor;
use anyhow::{bail, Result};
use tracing::debug;

const NAMESPACE_DELIM: &str = " in namespace";
const TARGET_MARKER: &str = "  - ";

pub struct MeshTextExtractor;

impl GraphExtractor for MeshTextExtractor {
    fn extract(&self, input: &str) -> Result<ServiceGraph> {
        let mut graph = ServiceGraph::new();
        // Source service named by the most recent `calls:` header. A target
        // line arriving before any header is an input-contract violation.
        let mut current_source: Option<String> = None;

        for (idx, line) in input.lines().enumerate() {
            let line_no = idx + 1;

            if line.contains("calls:") {
                let source = service_name(line, line_no)?;
                debug!(line_no, source = %source, "calls header");
                graph.add_node(&source);
                current_source = Some(source);
            } else if let Some(rest) = line.strip_prefix(TARGET_MARKER) {
                let Some(source) = current_source.as_deref() else {
                    bail!("line {}: target line before any 'calls:' header", line_no);
                };
                let target = service_name(rest, line_no)?;
                graph.add_node(&target);
                if source != target {
                    graph.add_edge(source, &target);
                } else {
                    debug!(line_no, service = %target, "skipping self-call");
                }
            }
            // Other lines (blank, namespace summaries, ...) are ignored.
        }

        Ok(graph)
    }
}

/// Pull the service name out of a header or target line: the segment before
/// ` in namespace`, with the `calls:` suffix and surrounding whitespace
/// stripped.
fn service_name(segment: &str, line_no: usize) -> Result<String> {
    let Some((head, _namespace)) = segment.split_once(NAMESPACE_DELIM) else {
        bail!(
            "line {}: missing '{}' delimiter in {:?}",
            line_no,
            NAMESPACE_DELIM,
            segment
        );
    };
    let name = head.trim().trim_end_matches("calls:").trim();
    if name.is_empty() {
        bail!("line {}: empty service name in {:?}", line_no, segment);
    }
    Ok(name.to_string())
}
