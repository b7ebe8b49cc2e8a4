//! Tracking destination parsing

use crate::{Error, Result};
use std::fmt;
use std::path::{Path, PathBuf};

const SQLITE_SCHEME: &str = "sqlite:///";

/// Location of the tracking database file.
///
/// Accepted forms:
/// - `sqlite:///mlflow.db` (relative to the working directory)
/// - `sqlite:////var/lib/tracking/mlflow.db` (absolute)
/// - a plain filesystem path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingUri {
    db_path: PathBuf,
}

impl TrackingUri {
    /// Parse a tracking URI
    ///
    /// # Errors
    /// Returns `Error::InvalidTrackingUri` for empty input, non-sqlite schemes,
    /// or a sqlite URI without a database path
    pub fn parse(uri: &str) -> Result<Self> {
        let uri = uri.trim();
        if uri.is_empty() {
            return Err(Error::InvalidTrackingUri("empty URI".to_string()));
        }

        if let Some(rest) = uri.strip_prefix(SQLITE_SCHEME) {
            if rest.is_empty() {
                return Err(Error::InvalidTrackingUri(format!("{uri} has no database path")));
            }
            return Ok(Self::from_path(rest));
        }

        if uri.contains("://") {
            return Err(Error::InvalidTrackingUri(uri.to_string()));
        }

        Ok(Self::from_path(uri))
    }

    /// Use a database file path directly
    #[must_use]
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            db_path: path.as_ref().to_path_buf(),
        }
    }

    /// Database file path
    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Default artifact root: `mlruns` beside the database file
    #[must_use]
    pub fn default_artifact_root(&self) -> PathBuf {
        self.db_path
            .parent()
            .map_or_else(|| PathBuf::from("mlruns"), |dir| dir.join("mlruns"))
    }
}

impl fmt::Display for TrackingUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SQLITE_SCHEME}{}", self.db_path.display())
    }
}
