//! SkillScope analysis service
//!
//! Serves performance-tier classification and personalized recommendations
//! over HTTP, using a trained model when one is available and fixed
//! thresholds otherwise.

use anyhow::Result;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::PathBuf;
use tracing::info;

use skillscope_service::{build_app, run_server, AppState, ConfigOverrides, ServiceConfig};

#[derive(Parser, Debug)]
#[command(name = "skillscope-service")]
#[command(about = "SkillScope learner analysis service", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "skillscope.yaml")]
    config: PathBuf,

    /// Model artifact path
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Listen address
    #[arg(short = 'l', long)]
    listen: Option<String>,

    /// Listen port
    #[arg(short = 'P', long)]
    port: Option<u16>,

    /// Print the effective configuration as YAML and exit
    #[arg(long)]
    print_config: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let overrides = ConfigOverrides {
        listen: cli.listen.clone(),
        port: cli.port,
        model_path: cli.model.clone(),
    };
    let config = ServiceConfig::load(&cli.config, &overrides)?;

    if cli.print_config {
        print!("{}", config.to_yaml()?);
        return Ok(());
    }

    info!("Starting SkillScope analysis service");
    info!("Model path: {}", config.model_path.display());

    let metrics_handle = if config.metrics_enabled {
        Some(init_metrics()?)
    } else {
        None
    };

    let state = AppState::from_config(&config, metrics_handle);
    let app = build_app(state, &config.cors)?;

    run_server(app, config.socket_addr()?).await
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("skillscope=debug,tower_http=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("skillscope=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Initialize metrics exporter and return handle for rendering
fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(
        "skillscope_requests_total",
        "Total number of analysis requests by endpoint"
    );
    metrics::describe_counter!(
        "skillscope_classifications_total",
        "Total number of classifications by tier and confidence"
    );
    metrics::describe_histogram!(
        "skillscope_analyze_latency_us",
        metrics::Unit::Microseconds,
        "Analysis latency in microseconds"
    );
    metrics::describe_counter!("skillscope_errors_total", "Total number of errors by kind");

    info!("Metrics exporter initialized");
    Ok(handle)
}
