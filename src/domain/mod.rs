pub mod graph;
pub mod mesh_extract;
pub mod metrics_extract;
pub mod synthesizer;
