//! `forest-track` CLI: train once, print the validation RMSE
//!
//! Logs go to stderr (`RUST_LOG`, default `warn`); stdout carries only the
//! RMSE line.

use anyhow::Context;
use clap::Parser;
use forest_track::trainer::{
    run_train, TrainConfig, DEFAULT_DATA_PATH, DEFAULT_EXPERIMENT, DEFAULT_TRACKING_URI,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "forest-track",
    version,
    about = "Train a random forest regressor and track the run"
)]
struct Cli {
    /// Location where the processed NYC taxi trip data was saved.
    #[arg(long = "data_path", visible_alias = "data-path", default_value = DEFAULT_DATA_PATH)]
    data_path: PathBuf,

    /// Tracking destination (sqlite:///file.db or a path).
    #[arg(long, env = "MLFLOW_TRACKING_URI", default_value = DEFAULT_TRACKING_URI)]
    tracking_uri: String,

    /// Experiment to record the run under.
    #[arg(long, env = "MLFLOW_EXPERIMENT_NAME", default_value = DEFAULT_EXPERIMENT)]
    experiment_name: String,

    /// Skip logging hyperparameters, training metrics and the model artifact.
    #[arg(long)]
    no_autolog: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = TrainConfig {
        data_path: cli.data_path,
        tracking_uri: cli.tracking_uri,
        experiment_name: cli.experiment_name,
        autolog: !cli.no_autolog,
        ..TrainConfig::default()
    };

    if let Err(e) = train(&config) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn train(config: &TrainConfig) -> anyhow::Result<()> {
    let outcome = run_train(config)
        .with_context(|| format!("training on {} failed", config.data_path.display()))?;
    println!("{}", outcome.rmse);
    Ok(())
}
