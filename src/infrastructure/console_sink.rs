//! Human-readable span sink: prints the span tree to stdout as it is
//! emitted, indented by nesting depth.

use crate::ports::{AttrValue, SpanHandle, SpanSink};
use std::time::Instant;

struct OpenSpan {
    name: String,
    depth: usize,
    opened_at: Instant,
}

#[derive(Default)]
pub struct ConsoleSink {
    spans: Vec<OpenSpan>,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn indent(&self, span: SpanHandle) -> String {
        "  ".repeat(self.spans[span.0].depth)
    }
}

impl SpanSink for ConsoleSink {
    fn open_span(&mut self, name: &str, parent: Option<SpanHandle>) -> SpanHandle {
        let depth = parent.map(|p| self.spans[p.0].depth + 1).unwrap_or(0);
        println!("{}> {}", "  ".repeat(depth), name);
        self.spans.push(OpenSpan {
            name: name.to_string(),
            depth,
            opened_at: Instant::now(),
        });
        SpanHandle(self.spans.len() - 1)
    }

    fn set_attribute(&mut self, span: SpanHandle, key: &str, value: AttrValue) {
        println!("{}    {} = {}", self.indent(span), key, value);
    }

    fn add_event(&mut self, span: SpanHandle, text: &str) {
        println!("{}    [event] {}", self.indent(span), text);
    }

    fn close_span(&mut self, span: SpanHandle) {
        let info = &self.spans[span.0];
        println!(
            "{}< {} ({}ms)",
            "  ".repeat(info.depth),
            info.name,
            info.opened_at.elapsed().as_millis()
        );
    }
}
