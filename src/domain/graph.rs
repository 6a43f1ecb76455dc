// Service graph structures for Traceforge.
// Represents client/server call relationships discovered from telemetry.

use std::collections::HashSet;

/// A directed call from one service to another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEdge {
    pub caller: String,
    pub callee: String,
}

/// The discovered service graph: an insertion-ordered node set plus an edge
/// list. Edges are deliberately not deduplicated; if the input repeats a
/// call pair, the synthesizer revisits the callee once per occurrence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceGraph {
    nodes: Vec<String>,
    edges: Vec<ServiceEdge>,
}

impl ServiceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a service to the node set. Duplicates are ignored, so the set
    /// keeps first-insertion order.
    pub fn add_node(&mut self, name: &str) {
        if !self.nodes.iter().any(|n| n == name) {
            self.nodes.push(name.to_string());
        }
    }

    /// Append a caller -> callee edge. Both endpoints are inserted into the
    /// node set first, so every edge endpoint is always a known node.
    /// Self-calls are dropped.
    pub fn add_edge(&mut self, caller: &str, callee: &str) {
        if caller == callee {
            return;
        }
        self.add_node(caller);
        self.add_node(callee);
        self.edges.push(ServiceEdge {
            caller: caller.to_string(),
            callee: callee.to_string(),
        });
    }

    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    pub fn edges(&self) -> &[ServiceEdge] {
        &self.edges
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Services with no incoming edge, in node insertion order. These are
    /// the trace entry points.
    pub fn roots(&self) -> Vec<&str> {
        let callees: HashSet<&str> = self.edges.iter().map(|e| e.callee.as_str()).collect();
        self.nodes
            .iter()
            .map(|n| n.as_str())
            .filter(|n| !callees.contains(n))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_edge_inserts_both_endpoints() {
        let mut g = ServiceGraph::new();
        g.add_edge("a", "b");

        assert_eq!(g.nodes(), &["a".to_string(), "b".to_string()]);
        assert_eq!(g.edges().len(), 1);
        assert_eq!(g.edges()[0].caller, "a");
        assert_eq!(g.edges()[0].callee, "b");
    }

    #[test]
    fn self_edges_are_dropped() {
        let mut g = ServiceGraph::new();
        g.add_edge("a", "a");

        assert!(g.edges().is_empty());
        // add_edge refused the pair entirely; the node was never touched
        assert!(g.nodes().is_empty());
    }

    #[test]
    fn duplicate_nodes_keep_first_insertion_order() {
        let mut g = ServiceGraph::new();
        g.add_node("a");
        g.add_node("b");
        g.add_node("a");

        assert_eq!(g.nodes(), &["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn duplicate_edges_are_preserved() {
        let mut g = ServiceGraph::new();
        g.add_edge("a", "b");
        g.add_edge("a", "b");

        assert_eq!(g.edges().len(), 2);
    }

    #[test]
    fn roots_excludes_nodes_with_incoming_edges() {
        // nodes {a, b, c}, edges [(a, b)] => roots [a, c]
        let mut g = ServiceGraph::new();
        g.add_node("a");
        g.add_node("b");
        g.add_node("c");
        g.add_edge("a", "b");

        assert_eq!(g.roots(), vec!["a", "c"]);
    }

    #[test]
    fn roots_of_edgeless_graph_is_every_node() {
        let mut g = ServiceGraph::new();
        g.add_node("x");
        g.add_node("y");

        assert_eq!(g.roots(), vec!["x", "y"]);
    }

    #[test]
    fn roots_of_empty_graph_is_empty() {
        let g = ServiceGraph::new();
        assert!(g.roots().is_empty());
    }

    #[test]
    fn roots_of_chain_is_head_only() {
        let mut g = ServiceGraph::new();
        g.add_edge("front", "mid");
        g.add_edge("mid", "back");

        assert_eq!(g.roots(), vec!["front"]);
    }
}
