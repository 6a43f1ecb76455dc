//! Synthetic trace emission.
//!
//! Walks the discovered graph depth-first from each entry point and emits
//! one span per visited service through the `SpanSink` port. Span nesting
//! mirrors the edge relation: the span for a callee is a child of the span
//! for its caller.

use crate::domain::graph::ServiceEdge;
use crate::ports::{AttrValue, SpanHandle, SpanSink};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

pub struct TraceSynthesizer {
    /// Simulated per-node processing time, so emitted spans have an
    /// observable, non-zero duration.
    delay: Duration,
}

impl TraceSynthesizer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Emit one span tree per root, in the given root order. Edges are
    /// scanned in edge-list order, so output is reproducible; duplicate
    /// edges revisit the callee once per occurrence.
    pub fn synthesize(&self, roots: &[&str], edges: &[ServiceEdge], sink: &mut dyn SpanSink) {
        for root in roots {
            let span = self.open_node_span(root, None, sink);
            sink.add_event(span, &format!("Processing root node: {}", root));
            self.process_node(root);

            let mut path = vec![root.to_string()];
            self.descend(root, span, edges, &mut path, sink);
            sink.close_span(span);
        }
    }

    fn descend(
        &self,
        current: &str,
        parent: SpanHandle,
        edges: &[ServiceEdge],
        path: &mut Vec<String>,
        sink: &mut dyn SpanSink,
    ) {
        for edge in edges.iter().filter(|e| e.caller == current) {
            let target = edge.callee.as_str();

            // A target already on the current path means the input graph is
            // cyclic; descending would never terminate. Stop here instead.
            if path.iter().any(|n| n == target) {
                warn!(caller = current, callee = target, "cycle detected, stopping descent");
                continue;
            }

            let span = self.open_node_span(target, Some(parent), sink);
            sink.add_event(span, &format!("Processing node: {}", target));
            self.process_node(target);

            path.push(target.to_string());
            self.descend(target, span, edges, path, sink);
            path.pop();
            sink.close_span(span);
        }
    }

    fn open_node_span(
        &self,
        node: &str,
        parent: Option<SpanHandle>,
        sink: &mut dyn SpanSink,
    ) -> SpanHandle {
        let span = sink.open_span(node, parent);
        sink.set_attribute(span, "synthetic", AttrValue::Bool(true));
        sink.set_attribute(span, "node", AttrValue::Str(node.to_string()));
        span
    }

    // Stand-in for real work while the span is open.
    fn process_node(&self, node: &str) {
        debug!(node, "processing");
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Sink that records every call for assertion.
    #[derive(Default)]
    struct RecordingSink {
        names: Vec<String>,
        parents: Vec<Option<SpanHandle>>,
        ops: Vec<String>,
    }

    impl SpanSink for RecordingSink {
        fn open_span(&mut self, name: &str, parent: Option<SpanHandle>) -> SpanHandle {
            self.names.push(name.to_string());
            self.parents.push(parent);
            self.ops.push(format!("open {}", name));
            SpanHandle(self.names.len() - 1)
        }

        fn set_attribute(&mut self, span: SpanHandle, key: &str, value: AttrValue) {
            self.ops
                .push(format!("attr {} {}={}", self.names[span.0], key, value));
        }

        fn add_event(&mut self, span: SpanHandle, text: &str) {
            self.ops
                .push(format!("event {} {}", self.names[span.0], text));
        }

        fn close_span(&mut self, span: SpanHandle) {
            self.ops.push(format!("close {}", self.names[span.0]));
        }
    }

    fn edges(pairs: &[(&str, &str)]) -> Vec<ServiceEdge> {
        pairs
            .iter()
            .map(|(a, b)| ServiceEdge {
                caller: a.to_string(),
                callee: b.to_string(),
            })
            .collect()
    }

    fn open_close_sequence(sink: &RecordingSink) -> Vec<&str> {
        sink.ops
            .iter()
            .filter(|op| op.starts_with("open") || op.starts_with("close"))
            .map(|op| op.as_str())
            .collect()
    }

    fn synth() -> TraceSynthesizer {
        TraceSynthesizer::new(Duration::ZERO)
    }

    #[test]
    fn chain_nests_spans_depth_first() {
        let mut sink = RecordingSink::default();
        synth().synthesize(&["A"], &edges(&[("A", "B"), ("B", "C")]), &mut sink);

        assert_eq!(
            open_close_sequence(&sink),
            vec!["open A", "open B", "open C", "close C", "close B", "close A"]
        );
    }

    #[test]
    fn child_span_points_at_caller_span() {
        let mut sink = RecordingSink::default();
        synth().synthesize(&["A"], &edges(&[("A", "B"), ("B", "C")]), &mut sink);

        // names = [A, B, C]; B's parent is A's handle, C's is B's
        assert_eq!(sink.parents[0], None);
        assert_eq!(sink.parents[1], Some(SpanHandle(0)));
        assert_eq!(sink.parents[2], Some(SpanHandle(1)));
    }

    #[test]
    fn each_root_starts_its_own_tree() {
        let mut sink = RecordingSink::default();
        synth().synthesize(&["A", "C"], &edges(&[("A", "B")]), &mut sink);

        assert_eq!(
            open_close_sequence(&sink),
            vec!["open A", "open B", "close B", "close A", "open C", "close C"]
        );
        assert_eq!(sink.parents[2], None);
    }

    #[test]
    fn duplicate_edge_revisits_callee() {
        let mut sink = RecordingSink::default();
        synth().synthesize(&["A"], &edges(&[("A", "B"), ("A", "B")]), &mut sink);

        assert_eq!(
            open_close_sequence(&sink),
            vec!["open A", "open B", "close B", "open B", "close B", "close A"]
        );
    }

    #[test]
    fn cycle_terminates_and_emits_each_node_once() {
        let mut sink = RecordingSink::default();
        synth().synthesize(&["A"], &edges(&[("A", "B"), ("B", "A")]), &mut sink);

        assert_eq!(
            open_close_sequence(&sink),
            vec!["open A", "open B", "close B", "close A"]
        );
    }

    #[test]
    fn diamond_revisits_shared_callee_per_path() {
        // A -> B -> D and A -> C -> D: D is not on its own path twice,
        // so both branches emit it.
        let mut sink = RecordingSink::default();
        synth().synthesize(
            &["A"],
            &edges(&[("A", "B"), ("A", "C"), ("B", "D"), ("C", "D")]),
            &mut sink,
        );

        assert_eq!(
            open_close_sequence(&sink),
            vec![
                "open A", "open B", "open D", "close D", "close B", "open C", "open D",
                "close D", "close C", "close A"
            ]
        );
    }

    #[test]
    fn spans_carry_synthetic_and_node_attributes() {
        let mut sink = RecordingSink::default();
        synth().synthesize(&["A"], &edges(&[("A", "B")]), &mut sink);

        assert!(sink.ops.contains(&"attr A synthetic=true".to_string()));
        assert!(sink.ops.contains(&"attr A node=A".to_string()));
        assert!(sink.ops.contains(&"attr B synthetic=true".to_string()));
        assert!(sink.ops.contains(&"attr B node=B".to_string()));
        assert!(sink
            .ops
            .contains(&"event A Processing root node: A".to_string()));
        assert!(sink.ops.contains(&"event B Processing node: B".to_string()));
    }

    #[test]
    fn no_roots_emits_nothing() {
        let mut sink = RecordingSink::default();
        synth().synthesize(&[], &edges(&[("A", "B")]), &mut sink);
        assert!(sink.ops.is_empty());
    }
}
