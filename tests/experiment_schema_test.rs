//! Experiment schema and store tests
//!
//! Records are exercised on their own first, then through a real SQLite
//! store in a temp directory.

use chrono::{TimeZone, Utc};
use forest_track::experiment::{
    sha256_hash, ArtifactRecord, ExperimentRecord, LifecycleStage, MetricRecord, RunRecord,
    RunStatus, TrackingStore, TrackingUri, DEFAULT_EXPERIMENT_NAME,
};
use forest_track::Error;

fn temp_store() -> (tempfile::TempDir, TrackingStore) {
    let dir = tempfile::tempdir().expect("tempdir");
    let uri = TrackingUri::parse(&format!("sqlite:///{}", dir.path().join("mlflow.db").display()))
        .expect("uri");
    let store = TrackingStore::open(&uri).expect("open store");
    (dir, store)
}

// =============================================================================
// ExperimentRecord Tests
// =============================================================================

#[test]
fn test_experiment_record_creation() {
    let record = ExperimentRecord::new(3, "nyc-taxi-experiment", "mlruns/3");

    assert_eq!(record.experiment_id(), 3);
    assert_eq!(record.name(), "nyc-taxi-experiment");
    assert_eq!(record.lifecycle_stage(), LifecycleStage::Active);
    assert!(record.created_at().timestamp() > 0);
}

#[test]
fn test_experiment_record_serialization() {
    let record = ExperimentRecord::new(1, "Serialization Test", "mlruns/1");

    let json = serde_json::to_string(&record).expect("serialization failed");
    let deserialized: ExperimentRecord =
        serde_json::from_str(&json).expect("deserialization failed");

    assert_eq!(record, deserialized);
}

// =============================================================================
// RunRecord Tests
// =============================================================================

#[test]
fn test_run_record_creation() {
    let run = RunRecord::new("a1b2c3d4e5f6", 1, "mlruns/1/a1b2c3d4e5f6/artifacts");

    assert_eq!(run.run_id(), "a1b2c3d4e5f6");
    assert_eq!(run.experiment_id(), 1);
    assert_eq!(run.status(), RunStatus::Running);
    assert!(run.ended_at().is_none());
}

#[test]
fn test_run_record_complete_failed() {
    let mut run = RunRecord::new("run-004", 1, "a");
    run.complete(RunStatus::Failed, Utc::now());

    assert_eq!(run.status(), RunStatus::Failed);
    assert!(run.ended_at().unwrap() >= run.started_at());
}

#[test]
fn test_run_status_display() {
    assert_eq!(RunStatus::Running.to_string(), "RUNNING");
    assert_eq!(RunStatus::Finished.to_string(), "FINISHED");
    assert_eq!(RunStatus::Failed.to_string(), "FAILED");
    assert_eq!(RunStatus::Killed.to_string(), "KILLED");
    assert!(!RunStatus::Running.is_terminal());
}

// =============================================================================
// MetricRecord / ArtifactRecord Tests
// =============================================================================

#[test]
fn test_metric_record_with_explicit_timestamp() {
    let ts = Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap();

    let metric = MetricRecord::new("run-001", "rmse", 0, 5.2).with_timestamp(ts);

    assert_eq!(metric.timestamp(), ts);
}

#[test]
fn test_artifact_record_hashes_content() {
    let artifact = ArtifactRecord::from_bytes("run-001", "train.pkl", b"abc");

    assert_eq!(
        artifact.cas_hash(),
        "sha256:ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
    assert_eq!(artifact.cas_hash(), sha256_hash(b"abc"));
    assert_eq!(artifact.size_bytes(), 3);
}

// =============================================================================
// TrackingStore Tests
// =============================================================================

#[test]
fn test_store_reopen_keeps_data() {
    let dir = tempfile::tempdir().unwrap();
    let uri = TrackingUri::from_path(dir.path().join("mlflow.db"));

    let run_id = {
        let store = TrackingStore::open(&uri).unwrap();
        let exp = store.set_experiment("persisted").unwrap();
        let run = store.create_run(exp.experiment_id(), None).unwrap();
        store.log_param(run.run_id(), "max_depth", "10").unwrap();
        store.end_run(run.run_id(), RunStatus::Finished).unwrap();
        run.run_id().to_string()
    };

    let store = TrackingStore::open(&uri).unwrap();
    let exp = store.get_experiment_by_name("persisted").unwrap().unwrap();
    let runs = store.list_runs(exp.experiment_id()).unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].run_id(), run_id);
    assert_eq!(runs[0].status(), RunStatus::Finished);
    assert_eq!(store.get_params(&run_id).unwrap()[0].value(), "10");
}

#[test]
fn test_store_experiment_ids_are_sequential() {
    let (_dir, store) = temp_store();
    let names: Vec<String> = store
        .list_experiments()
        .unwrap()
        .iter()
        .map(|e| e.name().to_string())
        .collect();
    assert_eq!(names, vec![DEFAULT_EXPERIMENT_NAME.to_string()]);

    assert_eq!(store.set_experiment("a").unwrap().experiment_id(), 1);
    assert_eq!(store.set_experiment("b").unwrap().experiment_id(), 2);
    assert_eq!(store.set_experiment("a").unwrap().experiment_id(), 1);
}

#[test]
fn test_store_artifact_location_layout() {
    let (dir, store) = temp_store();
    let exp = store.set_experiment("layout").unwrap();
    let run = store.create_run(exp.experiment_id(), None).unwrap();

    let expected = dir
        .path()
        .join("mlruns")
        .join(exp.experiment_id().to_string())
        .join(run.run_id())
        .join("artifacts");
    assert_eq!(std::path::Path::new(run.artifact_uri()), expected);
}

#[test]
fn test_store_runs_are_scoped_to_experiment() {
    let (_dir, store) = temp_store();
    let a = store.set_experiment("a").unwrap();
    let b = store.set_experiment("b").unwrap();
    store.create_run(a.experiment_id(), None).unwrap();
    store.create_run(a.experiment_id(), None).unwrap();
    store.create_run(b.experiment_id(), None).unwrap();

    assert_eq!(store.list_runs(a.experiment_id()).unwrap().len(), 2);
    assert_eq!(store.list_runs(b.experiment_id()).unwrap().len(), 1);
}

#[test]
fn test_store_rejects_unknown_experiment() {
    let (_dir, store) = temp_store();
    assert!(matches!(store.create_run(42, None), Err(Error::InvalidInput(_))));
}

#[test]
fn test_store_param_conflict_message() {
    let (_dir, store) = temp_store();
    let run = store.create_run(0, None).unwrap();
    store.log_param(run.run_id(), "random_state", "0").unwrap();

    let err = store.log_param(run.run_id(), "random_state", "1").unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("random_state"));
    assert!(msg.contains("'0'"));
    assert!(msg.contains("'1'"));
}
