//! Metric Record - one point of a run's metric series

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A single logged metric value.
///
/// A key may be logged many times per run; points are ordered by `step`,
/// with `timestamp` breaking ties (see [`MetricRecord::series_order`]).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricRecord {
    run_id: String,
    key: String,
    step: i64,
    value: f64,
    timestamp: DateTime<Utc>,
}

impl MetricRecord {
    /// Metric point stamped with the current time.
    ///
    /// `step` is 0 for one-shot metrics such as the validation `rmse`.
    #[must_use]
    pub fn new(run_id: impl Into<String>, key: impl Into<String>, step: i64, value: f64) -> Self {
        Self {
            run_id: run_id.into(),
            key: key.into(),
            step,
            value,
            timestamp: Utc::now(),
        }
    }

    /// Replace the timestamp (used when loading from the store)
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Owning run
    #[must_use]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Metric name, e.g. `rmse` or `training_r2_score`
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Training step
    #[must_use]
    pub const fn step(&self) -> i64 {
        self.step
    }

    /// Logged value
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.value
    }

    /// When the point was logged
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Position within a key's series: by step, then by timestamp
    #[must_use]
    pub fn series_order(&self, other: &Self) -> Ordering {
        self.step
            .cmp(&other.step)
            .then_with(|| self.timestamp.cmp(&other.timestamp))
    }
}
