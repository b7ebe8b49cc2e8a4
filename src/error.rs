//! Error types for forest-track
//!
//! Every failure is fatal for the training command; the messages carry enough
//! context to fix the input without a debugger.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// forest-track error types
#[derive(Error, Debug)]
pub enum Error {
    /// IO error (missing dataset file, unwritable artifact directory)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Dataset file is not a decodable `(X, y)` pickle
    #[error("Pickle decode error: {0}\nExpected a pickled tuple of (list of float lists, list of floats)")]
    Pickle(#[from] serde_pickle::Error),

    /// Tracking database error
    #[error("Tracking store error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Model artifact serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Feature matrix / label vector shapes do not line up
    #[error("Dataset shape error: {0}")]
    DatasetShape(String),

    /// Invalid argument (hyperparameter, metric input)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Tracking URI is neither `sqlite:///...` nor a plain path
    #[error("Invalid tracking URI: {0}\nUse sqlite:///relative.db, sqlite:////absolute.db or a file path")]
    InvalidTrackingUri(String),

    /// Experiment exists but was soft-deleted
    #[error("Experiment '{0}' is deleted; restore it or choose another name")]
    ExperimentDeleted(String),

    /// No run with this id
    #[error("Run not found: {0}")]
    RunNotFound(String),

    /// Run is already in a terminal state
    #[error("Run {0} has already ended")]
    RunAlreadyEnded(String),

    /// Params are immutable once logged
    #[error("Param '{key}' already logged with value '{old}', refusing to overwrite with '{new}'")]
    ParamConflict {
        /// Param key
        key: String,
        /// Value already stored
        old: String,
        /// Rejected value
        new: String,
    },

    /// `predict` called before `fit`
    #[error("Model is not fitted; call fit() first")]
    NotFitted,
}
