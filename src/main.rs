// Command-line entry point for Traceforge.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::time::Duration;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use traceforge::application::AssembleUsecase;
use traceforge::domain::mesh_extract::MeshTextExtractor;
use traceforge::domain::metrics_extract::MetricsResponseExtractor;
use traceforge::domain::synthesizer::TraceSynthesizer;
use traceforge::infrastructure::{ConsoleSink, MetricsQueryClient, OtlpHttpSink, TeeSink};
use traceforge::ports::{GraphExtractor, SpanSink};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a service-mesh CLI dump; when omitted, the metrics API is
    /// queried instead
    #[arg(short, long)]
    input: Option<String>,

    /// Metrics API organization
    #[arg(long, env = "LS_ORG")]
    org: Option<String>,

    /// Metrics API project
    #[arg(long, env = "LS_PROJ")]
    project: Option<String>,

    /// Bearer token for the metrics API
    #[arg(long, env = "LS_API_TOKEN", hide_env_values = true)]
    api_token: Option<String>,

    /// Access token for the trace ingestion endpoint
    #[arg(long, env = "LS_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// Metrics API base URL
    #[arg(long, default_value = "https://api.lightstep.com/public/v0.2")]
    api_base: String,

    /// Trace ingestion endpoint (OTLP/HTTP)
    #[arg(long, default_value = "https://ingest.lightstep.com/v1/traces")]
    otlp_endpoint: String,

    /// Simulated per-node processing delay in milliseconds
    #[arg(long, default_value_t = 100)]
    delay_ms: u64,

    /// Print spans to the console only, skip remote export
    #[arg(long)]
    no_export: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    // Resolve the input snapshot and the matching extraction strategy.
    let (input, extractor): (String, Box<dyn GraphExtractor>) = match &cli.input {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("cannot read input file {}", path))?;
            (text, Box::new(MeshTextExtractor))
        }
        None => {
            let org = cli.org.as_deref().context("--org (or LS_ORG) is required in metrics mode")?;
            let project = cli
                .project
                .as_deref()
                .context("--project (or LS_PROJ) is required in metrics mode")?;
            let api_token = cli
                .api_token
                .as_deref()
                .context("--api-token (or LS_API_TOKEN) is required in metrics mode")?;

            let client = MetricsQueryClient::new(&cli.api_base, org, project, api_token);
            match client.fetch_service_graph() {
                Some(body) => (body, Box::new(MetricsResponseExtractor)),
                None => {
                    warn!("no graph available, nothing to synthesize");
                    return Ok(());
                }
            }
        }
    };

    // One emission context per run: console always, remote unless opted out.
    let mut sinks: Vec<Box<dyn SpanSink>> = vec![Box::new(ConsoleSink::new())];
    if !cli.no_export {
        let access_token = cli
            .access_token
            .as_deref()
            .context("--access-token (or LS_ACCESS_TOKEN) is required for export; pass --no-export to skip")?;
        sinks.push(Box::new(OtlpHttpSink::new(&cli.otlp_endpoint, access_token)));
    }
    let mut sink = TeeSink::new(sinks);

    let usecase = AssembleUsecase {
        extractor: extractor.as_ref(),
        synthesizer: TraceSynthesizer::new(Duration::from_millis(cli.delay_ms)),
    };
    usecase.run(&input, &mut sink)?;

    sink.shutdown()
}
