//! Fan-out span sink.
//!
//! The synthesizer addresses a single sink; the reference system feeds two
//! exporters (console + remote ingestion). `TeeSink` bridges the two by
//! forwarding every call to each inner sink, translating handles per sink.

use crate::ports::{AttrValue, SpanHandle, SpanSink};
use anyhow::Result;

pub struct TeeSink {
    sinks: Vec<Box<dyn SpanSink>>,
    // Our handle -> the handle each inner sink issued for the same span.
    handles: Vec<Vec<SpanHandle>>,
}

impl TeeSink {
    pub fn new(sinks: Vec<Box<dyn SpanSink>>) -> Self {
        Self {
            sinks,
            handles: Vec::new(),
        }
    }
}

impl SpanSink for TeeSink {
    fn open_span(&mut self, name: &str, parent: Option<SpanHandle>) -> SpanHandle {
        let mut inner = Vec::with_capacity(self.sinks.len());
        for (i, sink) in self.sinks.iter_mut().enumerate() {
            let inner_parent = parent.map(|p| self.handles[p.0][i]);
            inner.push(sink.open_span(name, inner_parent));
        }
        self.handles.push(inner);
        SpanHandle(self.handles.len() - 1)
    }

    fn set_attribute(&mut self, span: SpanHandle, key: &str, value: AttrValue) {
        for (i, sink) in self.sinks.iter_mut().enumerate() {
            sink.set_attribute(self.handles[span.0][i], key, value.clone());
        }
    }

    fn add_event(&mut self, span: SpanHandle, text: &str) {
        for (i, sink) in self.sinks.iter_mut().enumerate() {
            sink.add_event(self.handles[span.0][i], text);
        }
    }

    fn close_span(&mut self, span: SpanHandle) {
        for (i, sink) in self.sinks.iter_mut().enumerate() {
            sink.close_span(self.handles[span.0][i]);
        }
    }

    fn shutdown(&mut self) -> Result<()> {
        for sink in self.sinks.iter_mut() {
            sink.shutdown()?;
        }
        Ok(())
    }
}
