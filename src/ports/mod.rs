use crate::domain::graph::ServiceGraph;
use anyhow::Result;
use std::fmt;

/// One of the two parsing strategies producing the shared graph contract.
pub trait GraphExtractor {
    /// Parse one input snapshot into a service graph. Extraction either
    /// fully succeeds or fails; a partial graph is never returned.
    fn extract(&self, input: &str) -> Result<ServiceGraph>;
}

/// Opaque reference to a span previously opened on a sink. Only valid for
/// the sink that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpanHandle(pub usize);

/// Span attribute value. The synthesizer only ever sets booleans and strings.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Bool(bool),
    Str(String),
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Bool(b) => write!(f, "{}", b),
            AttrValue::Str(s) => write!(f, "{}", s),
        }
    }
}

/// Span emission collaborator. The synthesizer drives this interface and
/// nothing else; exporters decide buffering and wire format.
pub trait SpanSink {
    fn open_span(&mut self, name: &str, parent: Option<SpanHandle>) -> SpanHandle;
    fn set_attribute(&mut self, span: SpanHandle, key: &str, value: AttrValue);
    fn add_event(&mut self, span: SpanHandle, text: &str);
    fn close_span(&mut self, span: SpanHandle);

    /// Flush and release any buffered state. Called once, after the last
    /// span tree has been emitted.
    fn shutdown(&mut self) -> Result<()> {
        Ok(())
    }
}
