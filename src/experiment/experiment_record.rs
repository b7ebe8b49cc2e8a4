//! Experiment Record - named grouping of runs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Soft-delete state shared by experiments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleStage {
    /// Visible and accepting runs
    Active,
    /// Soft-deleted
    Deleted,
}

impl LifecycleStage {
    /// Stored string form
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Deleted => "deleted",
        }
    }
}

impl fmt::Display for LifecycleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LifecycleStage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "deleted" => Ok(Self::Deleted),
            other => Err(Error::InvalidInput(format!("unknown lifecycle stage '{other}'"))),
        }
    }
}

/// Experiment Record represents a tracked experiment.
///
/// This is the root entity in the tracking schema. Each experiment owns an
/// artifact location under which every run gets its own directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExperimentRecord {
    experiment_id: i64,
    name: String,
    artifact_location: String,
    lifecycle_stage: LifecycleStage,
    created_at: DateTime<Utc>,
}

impl ExperimentRecord {
    /// Create a new active experiment record.
    ///
    /// # Arguments
    ///
    /// * `experiment_id` - Store-assigned identifier
    /// * `name` - Unique human-readable name
    /// * `artifact_location` - Directory holding this experiment's run artifacts
    #[must_use]
    pub fn new(
        experiment_id: i64,
        name: impl Into<String>,
        artifact_location: impl Into<String>,
    ) -> Self {
        Self::builder(experiment_id, name, artifact_location).build()
    }

    /// Create a builder for constructing an experiment record with optional fields.
    #[must_use]
    pub fn builder(
        experiment_id: i64,
        name: impl Into<String>,
        artifact_location: impl Into<String>,
    ) -> ExperimentRecordBuilder {
        ExperimentRecordBuilder::new(experiment_id, name, artifact_location)
    }

    /// Get the experiment ID.
    #[must_use]
    pub const fn experiment_id(&self) -> i64 {
        self.experiment_id
    }

    /// Get the experiment name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the artifact location.
    #[must_use]
    pub fn artifact_location(&self) -> &str {
        &self.artifact_location
    }

    /// Get the lifecycle stage.
    #[must_use]
    pub const fn lifecycle_stage(&self) -> LifecycleStage {
        self.lifecycle_stage
    }

    /// Get the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Builder for `ExperimentRecord`.
#[derive(Debug)]
pub struct ExperimentRecordBuilder {
    experiment_id: i64,
    name: String,
    artifact_location: String,
    lifecycle_stage: LifecycleStage,
    created_at: DateTime<Utc>,
}

impl ExperimentRecordBuilder {
    /// Create a new builder with required fields.
    #[must_use]
    pub fn new(
        experiment_id: i64,
        name: impl Into<String>,
        artifact_location: impl Into<String>,
    ) -> Self {
        Self {
            experiment_id,
            name: name.into(),
            artifact_location: artifact_location.into(),
            lifecycle_stage: LifecycleStage::Active,
            created_at: Utc::now(),
        }
    }

    /// Set the lifecycle stage.
    #[must_use]
    pub const fn lifecycle_stage(mut self, stage: LifecycleStage) -> Self {
        self.lifecycle_stage = stage;
        self
    }

    /// Set a custom creation timestamp (used when loading from the store).
    #[must_use]
    pub const fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Build the `ExperimentRecord`.
    #[must_use]
    pub fn build(self) -> ExperimentRecord {
        ExperimentRecord {
            experiment_id: self.experiment_id,
            name: self.name,
            artifact_location: self.artifact_location,
            lifecycle_stage: self.lifecycle_stage,
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_experiment_record_new() {
        let record = ExperimentRecord::new(1, "nyc-taxi-experiment", "mlruns/1");
        assert_eq!(record.experiment_id(), 1);
        assert_eq!(record.name(), "nyc-taxi-experiment");
        assert_eq!(record.artifact_location(), "mlruns/1");
        assert_eq!(record.lifecycle_stage(), LifecycleStage::Active);
    }

    #[test]
    fn test_lifecycle_stage_round_trip() {
        for stage in [LifecycleStage::Active, LifecycleStage::Deleted] {
            assert_eq!(stage.as_str().parse::<LifecycleStage>().unwrap(), stage);
        }
        assert!("archived".parse::<LifecycleStage>().is_err());
    }
}
