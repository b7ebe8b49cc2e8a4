//! Run Record - execution instance of an experiment

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// Run is currently executing.
    Running,
    /// Run completed successfully.
    Finished,
    /// Run failed with an error.
    Failed,
    /// Run was cancelled by user or system.
    Killed,
}

impl RunStatus {
    /// Stored string form (`RUNNING`, `FINISHED`, ...)
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Running => "RUNNING",
            Self::Finished => "FINISHED",
            Self::Failed => "FAILED",
            Self::Killed => "KILLED",
        }
    }

    /// Whether the run is closed
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Running)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RUNNING" => Ok(Self::Running),
            "FINISHED" => Ok(Self::Finished),
            "FAILED" => Ok(Self::Failed),
            "KILLED" => Ok(Self::Killed),
            other => Err(Error::InvalidInput(format!("unknown run status '{other}'"))),
        }
    }
}

/// Run Record represents a single execution of an experiment.
///
/// A run is created `Running` and closed exactly once with a terminal status.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunRecord {
    run_id: String,
    experiment_id: i64,
    run_name: String,
    status: RunStatus,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    artifact_uri: String,
}

impl RunRecord {
    /// Create a new run record in Running status, started now.
    ///
    /// # Arguments
    ///
    /// * `run_id` - Unique identifier for the run
    /// * `experiment_id` - ID of the parent experiment
    /// * `artifact_uri` - Directory that receives this run's artifacts
    #[must_use]
    pub fn new(
        run_id: impl Into<String>,
        experiment_id: i64,
        artifact_uri: impl Into<String>,
    ) -> Self {
        Self::builder(run_id, experiment_id, artifact_uri).build()
    }

    /// Create a builder for constructing a run record with optional fields.
    #[must_use]
    pub fn builder(
        run_id: impl Into<String>,
        experiment_id: i64,
        artifact_uri: impl Into<String>,
    ) -> RunRecordBuilder {
        RunRecordBuilder::new(run_id, experiment_id, artifact_uri)
    }

    /// Get the run ID.
    #[must_use]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Get the parent experiment ID.
    #[must_use]
    pub const fn experiment_id(&self) -> i64 {
        self.experiment_id
    }

    /// Get the display name.
    #[must_use]
    pub fn run_name(&self) -> &str {
        &self.run_name
    }

    /// Get the current run status.
    #[must_use]
    pub const fn status(&self) -> RunStatus {
        self.status
    }

    /// Get the start timestamp.
    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Get the end timestamp, if the run has completed.
    #[must_use]
    pub const fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    /// Get the artifact directory.
    #[must_use]
    pub fn artifact_uri(&self) -> &str {
        &self.artifact_uri
    }

    /// Complete the run with the given final status, stamping `ended_at`.
    ///
    /// # Arguments
    ///
    /// * `status` - Final status (Finished, Failed, or Killed)
    /// * `ended_at` - Completion time
    pub fn complete(&mut self, status: RunStatus, ended_at: DateTime<Utc>) {
        self.status = status;
        self.ended_at = Some(ended_at);
    }
}

/// Builder for `RunRecord`.
#[derive(Debug)]
#[allow(clippy::struct_field_names)]
pub struct RunRecordBuilder {
    run_id: String,
    experiment_id: i64,
    run_name: Option<String>,
    status: RunStatus,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    artifact_uri: String,
}

impl RunRecordBuilder {
    /// Create a new builder with required fields.
    #[must_use]
    pub fn new(
        run_id: impl Into<String>,
        experiment_id: i64,
        artifact_uri: impl Into<String>,
    ) -> Self {
        Self {
            run_id: run_id.into(),
            experiment_id,
            run_name: None,
            status: RunStatus::Running,
            started_at: Utc::now(),
            ended_at: None,
            artifact_uri: artifact_uri.into(),
        }
    }

    /// Set the display name (defaults to the first 8 characters of the ID).
    #[must_use]
    pub fn run_name(mut self, name: impl Into<String>) -> Self {
        self.run_name = Some(name.into());
        self
    }

    /// Set the status.
    #[must_use]
    pub const fn status(mut self, status: RunStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the start timestamp.
    #[must_use]
    pub const fn started_at(mut self, started_at: DateTime<Utc>) -> Self {
        self.started_at = started_at;
        self
    }

    /// Set the end timestamp.
    #[must_use]
    pub const fn ended_at(mut self, ended_at: Option<DateTime<Utc>>) -> Self {
        self.ended_at = ended_at;
        self
    }

    /// Build the `RunRecord`.
    #[must_use]
    pub fn build(self) -> RunRecord {
        let run_name = self
            .run_name
            .unwrap_or_else(|| self.run_id.chars().take(8).collect());
        RunRecord {
            run_id: self.run_id,
            experiment_id: self.experiment_id,
            run_name,
            status: self.status,
            started_at: self.started_at,
            ended_at: self.ended_at,
            artifact_uri: self.artifact_uri,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_starts_running() {
        let run = RunRecord::new("0123456789abcdef", 1, "mlruns/1/0123456789abcdef/artifacts");
        assert_eq!(run.status(), RunStatus::Running);
        assert_eq!(run.run_name(), "01234567");
        assert!(run.ended_at().is_none());
    }

    #[test]
    fn test_run_lifecycle() {
        let mut run = RunRecord::new("run-1", 1, "a");
        let end = Utc::now();
        run.complete(RunStatus::Finished, end);
        assert_eq!(run.status(), RunStatus::Finished);
        assert_eq!(run.ended_at(), Some(end));
        assert!(run.status().is_terminal());
    }

    #[test]
    fn test_status_strings() {
        for status in [
            RunStatus::Running,
            RunStatus::Finished,
            RunStatus::Failed,
            RunStatus::Killed,
        ] {
            assert_eq!(status.as_str().parse::<RunStatus>().unwrap(), status);
        }
        assert!("DONE".parse::<RunStatus>().is_err());
    }
}
