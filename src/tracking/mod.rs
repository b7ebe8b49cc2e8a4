//! Tracking client and scoped runs
//!
//! [`TrackingClient`] is the explicit tracking context: one store plus the
//! experiment new runs belong to. There is no process-wide "current run";
//! every logging call goes through an [`ActiveRun`] borrowed from the client.
//!
//! An [`ActiveRun`] is closed exactly once. [`ActiveRun::finish`] marks it
//! `FINISHED`; dropping it unfinished (early `?` return, panic unwind) marks
//! it `FAILED`.
//!
//! ```rust
//! use forest_track::tracking::TrackingClient;
//!
//! let dir = tempfile::tempdir()?;
//! let uri = format!("sqlite:///{}", dir.path().join("mlflow.db").display());
//! let client = TrackingClient::new(&uri, "demo")?;
//!
//! let run = client.start_run()?;
//! run.set_tag("developer", "me")?;
//! run.log_metric("rmse", 4.2)?;
//! let record = run.finish()?;
//! assert!(record.status().is_terminal());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod autolog;

use crate::experiment::{
    ArtifactRecord, ExperimentRecord, MetricRecord, RunRecord, RunStatus, TrackingStore,
    TrackingUri,
};
use crate::Result;
use std::path::Path;

/// Tracking destination plus the selected experiment
#[derive(Debug)]
pub struct TrackingClient {
    store: TrackingStore,
    experiment: ExperimentRecord,
}

impl TrackingClient {
    /// Open the store at `tracking_uri` and select (or create) `experiment_name`
    ///
    /// # Errors
    /// Returns error if the URI is invalid, the store cannot be opened, or the
    /// experiment is deleted
    pub fn new(tracking_uri: &str, experiment_name: &str) -> Result<Self> {
        let uri = TrackingUri::parse(tracking_uri)?;
        let store = TrackingStore::open(&uri)?;
        Self::with_store(store, experiment_name)
    }

    /// Select (or create) `experiment_name` in an already-open store
    ///
    /// # Errors
    /// Returns error if the experiment is deleted or the store fails
    pub fn with_store(store: TrackingStore, experiment_name: &str) -> Result<Self> {
        let experiment = store.set_experiment(experiment_name)?;
        tracing::info!(
            experiment_id = experiment.experiment_id(),
            experiment = experiment.name(),
            artifact_location = experiment.artifact_location(),
            "using experiment"
        );
        Ok(Self { store, experiment })
    }

    /// Underlying store (for queries)
    #[must_use]
    pub const fn store(&self) -> &TrackingStore {
        &self.store
    }

    /// Selected experiment
    #[must_use]
    pub const fn experiment(&self) -> &ExperimentRecord {
        &self.experiment
    }

    /// Start a run in the selected experiment
    ///
    /// # Errors
    /// Returns error if the run cannot be created
    pub fn start_run(&self) -> Result<ActiveRun<'_>> {
        self.start_named_run(None)
    }

    /// Start a run with an explicit display name
    ///
    /// # Errors
    /// Returns error if the run cannot be created
    pub fn start_named_run(&self, run_name: Option<&str>) -> Result<ActiveRun<'_>> {
        let run = self
            .store
            .create_run(self.experiment.experiment_id(), run_name)?;
        Ok(ActiveRun {
            client: self,
            run,
            closed: false,
        })
    }
}

/// An open run; closed on `finish`/`end`, or as `FAILED` on drop
#[derive(Debug)]
#[must_use = "dropping an ActiveRun immediately ends it as FAILED"]
pub struct ActiveRun<'a> {
    client: &'a TrackingClient,
    run: RunRecord,
    closed: bool,
}

impl ActiveRun<'_> {
    /// Run ID
    #[must_use]
    pub fn run_id(&self) -> &str {
        self.run.run_id()
    }

    /// Run record as of `start_run`
    #[must_use]
    pub const fn record(&self) -> &RunRecord {
        &self.run
    }

    /// Set a tag
    ///
    /// # Errors
    /// Returns a store error
    pub fn set_tag(&self, key: &str, value: &str) -> Result<()> {
        self.client.store.set_tag(self.run_id(), key, value)
    }

    /// Log a param; any `Display` value is stored as its string form
    ///
    /// # Errors
    /// Returns `Error::ParamConflict` if the key already holds another value
    pub fn log_param(&self, key: &str, value: impl std::fmt::Display) -> Result<()> {
        self.client
            .store
            .log_param(self.run_id(), key, &value.to_string())
    }

    /// Log a metric at step 0
    ///
    /// # Errors
    /// Returns a store error
    pub fn log_metric(&self, key: &str, value: f64) -> Result<MetricRecord> {
        self.log_metric_at(key, value, 0)
    }

    /// Log a metric at `step`
    ///
    /// # Errors
    /// Returns a store error
    pub fn log_metric_at(&self, key: &str, value: f64, step: i64) -> Result<MetricRecord> {
        self.client.store.log_metric(self.run_id(), key, value, step)
    }

    /// Copy a local file into the run's artifacts
    ///
    /// # Errors
    /// Returns an IO or store error
    pub fn log_artifact(&self, local_path: &Path) -> Result<ArtifactRecord> {
        self.client.store.log_artifact(self.run_id(), local_path)
    }

    /// Store bytes as an artifact at `artifact_path`
    ///
    /// # Errors
    /// Returns an IO or store error
    pub fn log_artifact_bytes(&self, artifact_path: &str, content: &[u8]) -> Result<ArtifactRecord> {
        self.client
            .store
            .log_artifact_bytes(self.run_id(), artifact_path, content)
    }

    /// Close the run as `FINISHED`
    ///
    /// # Errors
    /// Returns a store error; the run is then closed as `FAILED` on drop
    pub fn finish(self) -> Result<RunRecord> {
        self.end(RunStatus::Finished)
    }

    /// Close the run with an explicit terminal status
    ///
    /// # Errors
    /// Returns a store error; the run is then closed as `FAILED` on drop
    pub fn end(mut self, status: RunStatus) -> Result<RunRecord> {
        let record = self.client.store.end_run(self.run.run_id(), status)?;
        self.closed = true;
        Ok(record)
    }
}

impl Drop for ActiveRun<'_> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        tracing::warn!(
            run_id = %self.run.run_id(),
            panicking = std::thread::panicking(),
            "run dropped before finish, marking FAILED"
        );
        if let Err(e) = self.client.store.end_run(self.run.run_id(), RunStatus::Failed) {
            tracing::warn!(run_id = %self.run.run_id(), error = %e, "failed to close run");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn temp_client() -> (tempfile::TempDir, TrackingClient) {
        let dir = tempfile::tempdir().unwrap();
        let uri = TrackingUri::from_path(dir.path().join("mlflow.db"));
        let client = TrackingClient::with_store(TrackingStore::open(&uri).unwrap(), "exp").unwrap();
        (dir, client)
    }

    #[test]
    fn test_finish_marks_finished() {
        let (_dir, client) = temp_client();
        let run = client.start_run().unwrap();
        let run_id = run.run_id().to_string();
        run.log_param("max_depth", 10).unwrap();
        let record = run.finish().unwrap();
        assert_eq!(record.status(), RunStatus::Finished);
        assert_eq!(client.store().get_run(&run_id).unwrap().status(), RunStatus::Finished);
    }

    #[test]
    fn test_drop_marks_failed() {
        let (_dir, client) = temp_client();
        let run_id = {
            let run = client.start_run().unwrap();
            run.run_id().to_string()
        };
        let stored = client.store().get_run(&run_id).unwrap();
        assert_eq!(stored.status(), RunStatus::Failed);
        assert!(stored.ended_at().is_some());
    }

    #[test]
    fn test_error_path_marks_failed() {
        let (_dir, client) = temp_client();

        let attempt = |client: &TrackingClient| -> Result<()> {
            let run = client.start_run()?;
            run.log_param("seed", 0)?;
            run.log_param("seed", 1)?;
            run.finish()?;
            Ok(())
        };
        assert!(matches!(attempt(&client), Err(Error::ParamConflict { .. })));

        let runs = client.store().list_runs(client.experiment().experiment_id()).unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].status(), RunStatus::Failed);
    }

    #[test]
    fn test_nan_metric_does_not_fail_run() {
        let (_dir, client) = temp_client();
        let run = client.start_run().unwrap();
        let run_id = run.run_id().to_string();
        run.log_metric("rmse", f64::NAN).unwrap();
        assert_eq!(run.finish().unwrap().status(), RunStatus::Finished);

        let latest = client.store().latest_metrics(&run_id).unwrap();
        assert!(latest[0].value().is_nan());
    }

    #[test]
    fn test_end_with_killed() {
        let (_dir, client) = temp_client();
        let run = client.start_named_run(Some("manual")).unwrap();
        assert_eq!(run.record().run_name(), "manual");
        let record = run.end(RunStatus::Killed).unwrap();
        assert_eq!(record.status(), RunStatus::Killed);
    }

    #[test]
    fn test_invalid_uri() {
        assert!(matches!(
            TrackingClient::new("http://tracking:5000", "exp"),
            Err(Error::InvalidTrackingUri(_))
        ));
    }
}
