//! Experiment tracking schema and SQLite store
//!
//! ## Schema Overview
//!
//! ```text
//! ExperimentRecord (1) ──< RunRecord (N)
//!                              │
//!                              ├──< TagRecord (N)
//!                              ├──< ParamRecord (N)    [immutable]
//!                              ├──< MetricRecord (N)   [time-series]
//!                              └──< ArtifactRecord (N) [sha256]
//! ```
//!
//! [`TrackingStore`] persists all of it; most callers go through
//! [`crate::tracking::TrackingClient`] instead of using the store directly.

mod artifact_record;
mod experiment_record;
mod metric_record;
mod param_record;
mod run_record;
mod store;
mod uri;

pub use artifact_record::{sha256_hash, ArtifactRecord};
pub use experiment_record::{ExperimentRecord, ExperimentRecordBuilder, LifecycleStage};
pub use metric_record::MetricRecord;
pub use param_record::{ParamRecord, TagRecord};
pub use run_record::{RunRecord, RunRecordBuilder, RunStatus};
pub use store::{TrackingStore, DEFAULT_EXPERIMENT_NAME};
pub use uri::TrackingUri;
