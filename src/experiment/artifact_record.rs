//! Artifact Record - files attached to a run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Artifact Record represents a file stored under a run's artifact directory.
///
/// `path` is relative to the run's artifact URI. The content is identified by
/// `cas_hash` in the format `algorithm:hex_digest`, e.g.
/// `sha256:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArtifactRecord {
    run_id: String,
    path: String,
    cas_hash: String,
    size_bytes: u64,
    created_at: DateTime<Utc>,
}

impl ArtifactRecord {
    /// Create a new artifact record.
    ///
    /// # Arguments
    ///
    /// * `run_id` - ID of the parent run
    /// * `path` - Path relative to the run's artifact directory (e.g., "train.pkl")
    /// * `cas_hash` - Content hash (e.g., "sha256:abc123")
    /// * `size_bytes` - Size of the artifact in bytes
    #[must_use]
    pub fn new(
        run_id: impl Into<String>,
        path: impl Into<String>,
        cas_hash: impl Into<String>,
        size_bytes: u64,
    ) -> Self {
        Self {
            run_id: run_id.into(),
            path: path.into(),
            cas_hash: cas_hash.into(),
            size_bytes,
            created_at: Utc::now(),
        }
    }

    /// Create a record for `content`, hashing it with SHA-256.
    #[must_use]
    pub fn from_bytes(run_id: impl Into<String>, path: impl Into<String>, content: &[u8]) -> Self {
        Self::new(run_id, path, sha256_hash(content), content.len() as u64)
    }

    /// Override the creation timestamp (used when loading from the store).
    #[must_use]
    pub const fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Get the run ID.
    #[must_use]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Get the artifact path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Get the content hash.
    #[must_use]
    pub fn cas_hash(&self) -> &str {
        &self.cas_hash
    }

    /// Get the artifact size in bytes.
    #[must_use]
    pub const fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Get the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// `sha256:<hex>` digest of `content`
#[must_use]
pub fn sha256_hash(content: &[u8]) -> String {
    format!("sha256:{:x}", Sha256::digest(content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_record_new() {
        let artifact = ArtifactRecord::new("run-1", "train.pkl", "sha256:abc123", 1000);
        assert_eq!(artifact.run_id(), "run-1");
        assert_eq!(artifact.path(), "train.pkl");
        assert_eq!(artifact.cas_hash(), "sha256:abc123");
        assert_eq!(artifact.size_bytes(), 1000);
    }

    #[test]
    fn test_empty_content_hash() {
        let artifact = ArtifactRecord::from_bytes("run-1", "empty.bin", b"");
        assert_eq!(
            artifact.cas_hash(),
            "sha256:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(artifact.size_bytes(), 0);
    }
}
