//! The training command: load splits, fit, evaluate, track
//!
//! ```text
//! <data_path>/train.pkl ─┐
//! <data_path>/val.pkl ───┼─> RandomForestRegressor ─> RMSE ─> stdout
//!                        └─> tracking run: tags, params, metrics, artifacts
//! ```
//!
//! Both splits are loaded before the tracking store is opened, so a missing
//! or corrupt input leaves the store untouched.

use crate::dataset::{Dataset, DatasetPaths};
use crate::forest::{ForestParams, RandomForestRegressor};
use crate::metrics::root_mean_squared_error;
use crate::tracking::{autolog, TrackingClient};
use crate::Result;
use std::path::PathBuf;

/// Default tracking destination
pub const DEFAULT_TRACKING_URI: &str = "sqlite:///mlflow.db";

/// Default experiment name
pub const DEFAULT_EXPERIMENT: &str = "nyc-taxi-experiment";

/// Default data directory
pub const DEFAULT_DATA_PATH: &str = "./output";

/// Training command configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainConfig {
    /// Directory holding `train.pkl` and `val.pkl`
    pub data_path: PathBuf,
    /// Tracking destination (`sqlite:///...` or a path)
    pub tracking_uri: String,
    /// Experiment the run is recorded under
    pub experiment_name: String,
    /// Value of the `developer` tag
    pub developer: String,
    /// Forest depth limit
    pub max_depth: usize,
    /// Forest seed
    pub random_state: u64,
    /// Log every hyperparameter, training metrics and the model artifact
    pub autolog: bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            tracking_uri: DEFAULT_TRACKING_URI.to_string(),
            experiment_name: DEFAULT_EXPERIMENT.to_string(),
            developer: "Santiago".to_string(),
            max_depth: 10,
            random_state: 0,
            autolog: true,
        }
    }
}

impl TrainConfig {
    /// Forest hyperparameters for this configuration
    #[must_use]
    pub fn forest_params(&self) -> ForestParams {
        ForestParams::default()
            .max_depth(Some(self.max_depth))
            .random_state(self.random_state)
    }
}

/// Result of a completed training run
#[derive(Debug, Clone, PartialEq)]
pub struct TrainOutcome {
    /// Tracking run ID
    pub run_id: String,
    /// Experiment the run belongs to
    pub experiment_id: i64,
    /// Validation RMSE
    pub rmse: f64,
}

/// Run the training command once
///
/// # Errors
/// Returns the first failure: dataset IO/decoding/shape, tracking store, or
/// model errors. If a run was started it is closed as `FAILED`.
pub fn run_train(config: &TrainConfig) -> Result<TrainOutcome> {
    let paths = DatasetPaths::in_dir(&config.data_path);
    let (train, val) = paths.load()?;
    tracing::info!(
        train_rows = train.n_samples(),
        val_rows = val.n_samples(),
        features = train.n_features(),
        "loaded dataset splits"
    );

    let client = TrackingClient::new(&config.tracking_uri, &config.experiment_name)?;
    let run = client.start_run()?;

    run.set_tag("developer", &config.developer)?;
    run.set_tag("model", RandomForestRegressor::NAME)?;

    run.log_param("data_path", config.data_path.display())?;
    run.log_param("max_depth", config.max_depth)?;
    run.log_param("random_state", config.random_state)?;

    let mut rf = RandomForestRegressor::new(config.forest_params());
    rf.fit(&train)?;
    if config.autolog {
        autolog::log_forest(&run, &rf, &train)?;
    }

    let rmse = validation_rmse(&rf, &val)?;
    run.log_metric("rmse", rmse)?;
    run.log_artifact(&paths.train)?;

    let record = run.finish()?;
    tracing::info!(run_id = %record.run_id(), rmse, "training run finished");

    Ok(TrainOutcome {
        run_id: record.run_id().to_string(),
        experiment_id: record.experiment_id(),
        rmse,
    })
}

fn validation_rmse(model: &RandomForestRegressor, val: &Dataset) -> Result<f64> {
    let y_pred = model.predict(val.features())?;
    root_mean_squared_error(val.labels(), &y_pred)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_training_contract() {
        let config = TrainConfig::default();
        assert_eq!(config.data_path, PathBuf::from("./output"));
        assert_eq!(config.tracking_uri, "sqlite:///mlflow.db");
        assert_eq!(config.experiment_name, "nyc-taxi-experiment");
        assert_eq!(config.developer, "Santiago");

        let params = config.forest_params();
        assert_eq!(params.max_depth, Some(10));
        assert_eq!(params.random_state, 0);
        assert_eq!(params.n_estimators, 100);
    }

    #[test]
    fn test_missing_data_dir_fails_before_tracking() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("mlflow.db");
        let config = TrainConfig {
            data_path: dir.path().join("absent"),
            tracking_uri: format!("sqlite:///{}", db.display()),
            ..TrainConfig::default()
        };
        assert!(run_train(&config).is_err());
        assert!(!db.exists());
    }
}
