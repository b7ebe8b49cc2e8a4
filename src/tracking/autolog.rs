//! Explicit estimator logging
//!
//! Records what an automatic-logging hook would capture around a forest fit,
//! but as a plain function call: every hyperparameter, two estimator tags,
//! the training-set metrics, and the serialized model.

use super::ActiveRun;
use crate::dataset::Dataset;
use crate::forest::RandomForestRegressor;
use crate::metrics::RegressionReport;
use crate::Result;

/// Artifact path of the serialized model
pub const MODEL_ARTIFACT_PATH: &str = "model/model.json";

/// Log a fitted forest and its training-set metrics to `run`
///
/// Params: `bootstrap`, `max_depth`, `max_features`, `min_samples_leaf`,
/// `min_samples_split`, `n_estimators`, `random_state`.
/// Metrics: `training_mean_squared_error`, `training_root_mean_squared_error`,
/// `training_mean_absolute_error`, `training_r2_score`, `training_score`.
///
/// # Errors
/// Returns `Error::NotFitted` for an unfitted model, `Error::ParamConflict`
/// if the run already holds a different value for a hyperparameter, or a
/// store error
pub fn log_forest(
    run: &ActiveRun<'_>,
    model: &RandomForestRegressor,
    train: &Dataset,
) -> Result<RegressionReport> {
    let y_pred = model.predict(train.features())?;
    let report = RegressionReport::compute(train.labels(), &y_pred)?;

    for (key, value) in model.params().as_param_pairs() {
        run.log_param(key, value)?;
    }

    run.set_tag("estimator_name", RandomForestRegressor::NAME)?;
    run.set_tag(
        "estimator_class",
        std::any::type_name::<RandomForestRegressor>(),
    )?;

    run.log_metric("training_mean_squared_error", report.mse)?;
    run.log_metric("training_root_mean_squared_error", report.rmse)?;
    run.log_metric("training_mean_absolute_error", report.mae)?;
    run.log_metric("training_r2_score", report.r2)?;
    run.log_metric("training_score", report.r2)?;

    let model_json = serde_json::to_vec(model)?;
    run.log_artifact_bytes(MODEL_ARTIFACT_PATH, &model_json)?;

    tracing::info!(
        run_id = %run.run_id(),
        training_rmse = report.rmse,
        training_r2 = report.r2,
        "autologged forest"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiment::{TrackingStore, TrackingUri};
    use crate::forest::ForestParams;
    use crate::tracking::TrackingClient;
    use crate::Error;

    fn setup() -> (tempfile::TempDir, TrackingClient, Dataset) {
        let dir = tempfile::tempdir().unwrap();
        let store = TrackingStore::open(&TrackingUri::from_path(dir.path().join("t.db"))).unwrap();
        let client = TrackingClient::with_store(store, "autolog").unwrap();
        let train = Dataset::new(
            (0..30).map(|i| vec![f64::from(i)]).collect(),
            (0..30).map(|i| f64::from(i % 5)).collect(),
        )
        .unwrap();
        (dir, client, train)
    }

    #[test]
    fn test_logs_params_tags_metrics_and_model() {
        let (_dir, client, train) = setup();
        let mut rf = RandomForestRegressor::new(ForestParams::default().n_estimators(5).max_depth(Some(3)));
        rf.fit(&train).unwrap();

        let run = client.start_run().unwrap();
        let run_id = run.run_id().to_string();
        log_forest(&run, &rf, &train).unwrap();
        run.finish().unwrap();

        let store = client.store();
        let params = store.get_params(&run_id).unwrap();
        assert_eq!(params.len(), 7);
        assert!(params.iter().any(|p| p.key() == "max_depth" && p.value() == "3"));
        assert!(params.iter().any(|p| p.key() == "n_estimators" && p.value() == "5"));

        let tags = store.get_tags(&run_id).unwrap();
        assert!(tags
            .iter()
            .any(|t| t.key() == "estimator_name" && t.value() == "RandomForestRegressor"));

        let metrics = store.latest_metrics(&run_id).unwrap();
        assert_eq!(metrics.len(), 5);
        assert!(metrics.iter().any(|m| m.key() == "training_root_mean_squared_error"));

        let artifacts = store.list_artifacts(&run_id).unwrap();
        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].path(), MODEL_ARTIFACT_PATH);
    }

    #[test]
    fn test_model_artifact_deserializes() {
        let (_dir, client, train) = setup();
        let mut rf = RandomForestRegressor::new(ForestParams::default().n_estimators(3));
        rf.fit(&train).unwrap();

        let run = client.start_run().unwrap();
        log_forest(&run, &rf, &train).unwrap();
        let path = std::path::Path::new(run.record().artifact_uri()).join(MODEL_ARTIFACT_PATH);
        run.finish().unwrap();

        let restored: RandomForestRegressor =
            serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap();
        let before = rf.predict(train.features()).unwrap();
        let after = restored.predict(train.features()).unwrap();
        assert!(before.iter().zip(&after).all(|(a, b)| (a - b).abs() < 1e-9));
    }

    #[test]
    fn test_unfitted_model_rejected() {
        let (_dir, client, train) = setup();
        let rf = RandomForestRegressor::new(ForestParams::default());
        let run = client.start_run().unwrap();
        assert!(matches!(log_forest(&run, &rf, &train), Err(Error::NotFitted)));
    }
}
