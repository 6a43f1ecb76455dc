use crate::domain::synthesizer::TraceSynthesizer;
use crate::ports::{GraphExtractor, SpanSink};
use anyhow::Result;
use tracing::info;

/// End-to-end assembly: extract the service graph from one input snapshot,
/// find the trace entry points, emit one span tree per entry point.
pub struct AssembleUsecase<'a> {
    pub extractor: &'a dyn GraphExtractor,
    pub synthesizer: TraceSynthesizer,
}

impl<'a> AssembleUsecase<'a> {
    pub fn run(&self, input: &str, sink: &mut dyn SpanSink) -> Result<()> {
        let graph = self.extractor.extract(input)?;
        info!(
            nodes = graph.nodes().len(),
            edges = graph.edges().len(),
            "service graph extracted"
        );

        let roots = graph.roots();
        info!(?roots, "trace entry points");

        self.synthesizer.synthesize(&roots, graph.edges(), sink);
        Ok(())
    }
}
