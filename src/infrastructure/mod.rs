// Infrastructure implementations for Traceforge.

pub mod console_sink;
pub mod metrics_api;
pub mod otlp_sink;
pub mod tee_sink;

pub use console_sink::ConsoleSink;
pub use metrics_api::MetricsQueryClient;
pub use otlp_sink::OtlpHttpSink;
pub use tee_sink::TeeSink;
