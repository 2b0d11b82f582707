//! SkillScope model trainer
//!
//! Generates synthetic learner data, fits the random forest and writes the
//! JSON model artifact loaded by the analysis service.

use anyhow::{Context, Result};
use clap::Parser;
use skillscope_trainer::{train, TrainingConfig};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "skillscope-train")]
#[command(about = "Train the SkillScope performance classifier", long_about = None)]
struct Cli {
    /// Number of synthetic samples to generate
    #[arg(short = 'n', long, default_value = "1000")]
    samples: usize,

    /// Random seed for generation, splitting and fitting
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Number of trees in the forest
    #[arg(short, long, default_value = "100")]
    trees: usize,

    /// Maximum tree depth (0 for unlimited)
    #[arg(short = 'd', long, default_value = "10")]
    max_depth: usize,

    /// Fraction of samples held out for evaluation
    #[arg(long, default_value = "0.2")]
    test_fraction: f64,

    /// Model artifact output path
    #[arg(short, long, default_value = "./model.json", env = "SKILLSCOPE_MODEL_PATH")]
    output: PathBuf,

    /// Write the training report as JSON to this path
    #[arg(short, long)]
    report: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    info!("SkillScope model training");

    let config = TrainingConfig {
        n_samples: cli.samples,
        test_fraction: cli.test_fraction,
        seed: cli.seed,
        n_estimators: cli.trees,
        max_depth: (cli.max_depth > 0).then_some(cli.max_depth),
    };

    let outcome = train(&config).context("Training failed")?;
    println!("{}", outcome.report.classification);

    outcome
        .save(&cli.output, cli.report.as_deref())
        .with_context(|| format!("Failed to save model to {}", cli.output.display()))?;

    info!(
        "Training complete: accuracy {:.2}%, model saved to {}",
        outcome.report.accuracy * 100.0,
        cli.output.display()
    );
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("skillscope=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("skillscope=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
